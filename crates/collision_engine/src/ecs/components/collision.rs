//! Collision components

use crate::ecs::entity::EntityId;
use crate::ecs::components::PositionComponent;
use crate::foundation::math::Vec2;
use crate::physics::collision::CollisionShape;
use crate::physics::collision_layers::{is_valid_layer, CollisionLayers};
use crate::physics::CollisionError;

/// Marks an entity as collision-eligible and describes its shape
///
/// The anchor is the rotation pivot in the shape's local frame (origin at the
/// entity position). Layers are a set of single-bit layers; two colliders are
/// tested when their sets intersect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderComponent {
    /// Geometry in local space
    pub shape: CollisionShape,
    /// Rotation pivot in local space
    pub anchor: Vec2,
    /// Layers this collider is on
    pub layers: CollisionLayers,
}

impl ColliderComponent {
    /// Create a collider on the default layer with the shape's default anchor
    pub fn new(shape: CollisionShape) -> Self {
        Self {
            shape,
            anchor: shape.default_anchor(),
            layers: CollisionLayers::DEFAULT,
        }
    }

    /// Rectangle collider
    pub fn rect(width: f32, height: f32) -> Self {
        Self::new(CollisionShape::Rect { width, height })
    }

    /// Circle collider; the circle's center is `(radius, radius)` from the position
    pub fn circle(radius: f32) -> Self {
        Self::new(CollisionShape::Circle { radius })
    }

    /// Upright capsule collider; `height` includes both end caps
    pub fn capsule(radius: f32, height: f32) -> Self {
        Self::new(CollisionShape::Capsule { radius, height })
    }

    /// Triangle collider with vertices `(0, 0)`, `b` and `c`
    pub fn triangle(b: Vec2, c: Vec2) -> Self {
        Self::new(CollisionShape::Triangle { b, c })
    }

    /// Set rotation anchor
    pub const fn with_anchor(mut self, anchor: Vec2) -> Self {
        self.anchor = anchor;
        self
    }

    /// Replace the whole layer set
    pub const fn with_layers(mut self, layers: CollisionLayers) -> Self {
        self.layers = layers;
        self
    }

    /// Enable or disable a single layer
    ///
    /// Composite or empty values are rejected.
    pub fn try_set_layer(&mut self, layer: CollisionLayers, enabled: bool) -> Result<(), CollisionError> {
        if !is_valid_layer(layer.bits()) {
            return Err(CollisionError::InvalidLayer(layer.bits()));
        }
        self.layers.set(layer, enabled);
        Ok(())
    }

    /// Enable or disable a single layer, logging and ignoring invalid values
    pub fn set_layer(&mut self, layer: CollisionLayers, enabled: bool) {
        if let Err(err) = self.try_set_layer(layer, enabled) {
            log::warn!("Ignoring layer assignment: {err}");
        }
    }

    /// Whether a single layer is enabled
    pub fn is_layer_enabled(&self, layer: CollisionLayers) -> bool {
        self.layers.contains(layer)
    }

    /// Remove the collider from every layer; it will collide with nothing
    pub fn clear_layers(&mut self) {
        self.layers = CollisionLayers::empty();
    }

    /// Check shape parameters and anchor
    pub fn validate(&self) -> Result<(), CollisionError> {
        self.shape.validate()?;
        if !self.anchor.x.is_finite() || !self.anchor.y.is_finite() {
            return Err(CollisionError::InvalidShape(format!(
                "anchor must be finite, got ({}, {})",
                self.anchor.x, self.anchor.y
            )));
        }
        Ok(())
    }
}

/// One row of the per-tick snapshot handed to the collision world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEntity {
    /// Entity handle
    pub id: EntityId,
    /// Position, map and type
    pub position: PositionComponent,
    /// Shape, anchor and layers
    pub collider: ColliderComponent,
}

impl CollisionEntity {
    /// Bundle a snapshot row
    pub const fn new(id: EntityId, position: PositionComponent, collider: ColliderComponent) -> Self {
        Self { id, position, collider }
    }
}
