//! Position component

use crate::ecs::entity::{EntityType, MapId};
use crate::foundation::math::Vec2;

/// Where an entity is and what it is
///
/// `(x, y)` is the origin of the shape's local frame, which is its top-left
/// corner for every shape. Rotation is in degrees, clockwise from "up"; world
/// space is y-down.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionComponent {
    /// World x of the local origin
    pub x: f32,
    /// World y of the local origin
    pub y: f32,
    /// Clockwise rotation in degrees
    pub rotation: f32,
    /// Map the entity lives on
    pub map: MapId,
    /// Type tag used for handler lookup
    pub entity_type: EntityType,
}

impl PositionComponent {
    /// Create an unrotated position on map 0
    pub const fn new(x: f32, y: f32, entity_type: EntityType) -> Self {
        Self {
            x,
            y,
            rotation: 0.0,
            map: MapId(0),
            entity_type,
        }
    }

    /// Set rotation in degrees
    pub const fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set map
    pub const fn with_map(mut self, map: MapId) -> Self {
        self.map = map;
        self
    }

    /// Origin as a vector
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Whether the rotated path is needed; whole turns count as unrotated
    pub fn is_rotated(&self) -> bool {
        self.rotation.rem_euclid(360.0) != 0.0
    }
}
