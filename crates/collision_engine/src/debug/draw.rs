//! Debug drawing primitives and system
//!
//! Shapes are plain data in world space (y-down); an overlay renderer walks
//! [`DebugDrawSystem::get_shapes`] each frame and draws them however it likes.

use std::collections::HashMap;

use crate::foundation::math::{Rect, Vec2, Vec4};
use crate::physics::collision::Quad;

/// Unique identifier for persistent debug shapes
pub type DebugShapeId = String;

/// Debug shape primitives that can be rendered for visualization
#[derive(Clone, Debug, PartialEq)]
pub enum DebugShape {
    /// Line segment from start to end
    Line {
        /// Start point
        start: Vec2,
        /// End point
        end: Vec2,
        /// RGBA color
        color: Vec4,
        /// Remaining lifetime in seconds
        duration: f32,
    },

    /// Axis-aligned rectangle
    Rect {
        /// Rectangle in world space
        rect: Rect,
        /// RGBA color
        color: Vec4,
        /// Remaining lifetime in seconds
        duration: f32,
        /// Outline only
        wireframe: bool,
    },

    /// Circle at center with radius
    Circle {
        /// Center in world space
        center: Vec2,
        /// Radius
        radius: f32,
        /// RGBA color
        color: Vec4,
        /// Remaining lifetime in seconds
        duration: f32,
        /// Outline only
        wireframe: bool,
    },

    /// Convex quad, corners in winding order
    Polygon {
        /// Corners in world space
        points: Quad,
        /// RGBA color
        color: Vec4,
        /// Remaining lifetime in seconds
        duration: f32,
    },

    /// Point at position
    Point {
        /// Position in world space
        position: Vec2,
        /// RGBA color
        color: Vec4,
        /// Size in pixels
        size: f32,
        /// Remaining lifetime in seconds
        duration: f32,
    },
}

impl DebugShape {
    fn duration_mut(&mut self) -> &mut f32 {
        match self {
            DebugShape::Line { duration, .. }
            | DebugShape::Rect { duration, .. }
            | DebugShape::Circle { duration, .. }
            | DebugShape::Polygon { duration, .. }
            | DebugShape::Point { duration, .. } => duration,
        }
    }

    /// Get remaining duration
    pub fn duration(&self) -> f32 {
        match self {
            DebugShape::Line { duration, .. }
            | DebugShape::Rect { duration, .. }
            | DebugShape::Circle { duration, .. }
            | DebugShape::Polygon { duration, .. }
            | DebugShape::Point { duration, .. } => *duration,
        }
    }

    /// Color of the shape
    pub fn color(&self) -> Vec4 {
        match self {
            DebugShape::Line { color, .. }
            | DebugShape::Rect { color, .. }
            | DebugShape::Circle { color, .. }
            | DebugShape::Polygon { color, .. }
            | DebugShape::Point { color, .. } => *color,
        }
    }

    /// Set duration (returns modified shape)
    #[must_use]
    pub fn with_duration(mut self, new_duration: f32) -> Self {
        *self.duration_mut() = new_duration;
        self
    }

    /// Decrease duration by delta_time, returns true if expired
    pub fn tick(&mut self, delta_time: f32) -> bool {
        let duration = self.duration_mut();
        *duration -= delta_time;
        *duration <= 0.0
    }
}

/// Collects temporary and persistent debug shapes
///
/// Temporary shapes expire after their duration; a duration of zero means
/// "this frame only". Persistent shapes stay until removed by id.
pub struct DebugDrawSystem {
    temporary_shapes: Vec<DebugShape>,
    persistent_shapes: HashMap<DebugShapeId, DebugShape>,

    /// Master enable/disable flag
    pub enabled: bool,
}

impl DebugDrawSystem {
    /// Create a new debug draw system
    pub fn new() -> Self {
        Self {
            temporary_shapes: Vec::new(),
            persistent_shapes: HashMap::new(),
            enabled: true,
        }
    }

    /// Queue any temporary shape
    pub fn draw(&mut self, shape: DebugShape) {
        if self.enabled {
            self.temporary_shapes.push(shape);
        }
    }

    /// Draw a line segment (temporary)
    pub fn draw_line(&mut self, start: Vec2, end: Vec2, color: Vec4, duration: f32) {
        self.draw(DebugShape::Line { start, end, color, duration });
    }

    /// Draw a rectangle outline (temporary)
    pub fn draw_rect(&mut self, rect: Rect, color: Vec4, duration: f32) {
        self.draw(DebugShape::Rect { rect, color, duration, wireframe: true });
    }

    /// Draw a circle outline (temporary)
    pub fn draw_circle(&mut self, center: Vec2, radius: f32, color: Vec4, duration: f32) {
        self.draw(DebugShape::Circle { center, radius, color, duration, wireframe: true });
    }

    /// Draw a quad outline (temporary)
    pub fn draw_polygon(&mut self, points: Quad, color: Vec4, duration: f32) {
        self.draw(DebugShape::Polygon { points, color, duration });
    }

    /// Draw a point (temporary)
    pub fn draw_point(&mut self, position: Vec2, color: Vec4, size: f32, duration: f32) {
        self.draw(DebugShape::Point { position, color, size, duration });
    }

    /// Draw a persistent shape that remains until explicitly removed
    pub fn draw_persistent(&mut self, id: impl Into<String>, shape: DebugShape) {
        if !self.enabled {
            return;
        }

        self.persistent_shapes.insert(id.into(), shape);
    }

    /// Remove a persistent shape
    pub fn clear_persistent(&mut self, id: &str) {
        self.persistent_shapes.remove(id);
    }

    /// Clear all persistent shapes
    pub fn clear_all_persistent(&mut self) {
        self.persistent_shapes.clear();
    }

    /// Update shape lifetimes and remove expired temporary shapes
    pub fn update(&mut self, delta_time: f32) {
        if !self.enabled {
            return;
        }

        self.temporary_shapes.retain_mut(|shape| !shape.tick(delta_time));
    }

    /// Get all shapes for rendering (both temporary and persistent)
    pub fn get_shapes(&self) -> Vec<&DebugShape> {
        if !self.enabled {
            return Vec::new();
        }

        self.temporary_shapes.iter().chain(self.persistent_shapes.values()).collect()
    }

    /// Get the number of active shapes
    pub fn shape_count(&self) -> usize {
        self.temporary_shapes.len() + self.persistent_shapes.len()
    }

    /// Clear all shapes (temporary and persistent)
    pub fn clear(&mut self) {
        self.temporary_shapes.clear();
        self.persistent_shapes.clear();
    }
}

impl Default for DebugDrawSystem {
    fn default() -> Self {
        Self::new()
    }
}
