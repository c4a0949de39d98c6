//! Math utilities and types
//!
//! Provides the 2D math types used by the collision pipeline.

pub use nalgebra::{Vector2, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 4D vector type, used for RGBA debug colors
pub type Vec4 = Vector4<f32>;

/// Degrees to radians conversion factor
pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;

/// Axis-aligned rectangle described by its top-left corner and extent
///
/// World space is y-down, so `(x, y)` is the minimum corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Extent along x
    pub width: f32,
    /// Extent along y
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Build the smallest rectangle containing both corners
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Bounding rectangle of a set of points
    pub fn from_points(points: &[Vec2]) -> Self {
        let mut min = Vec2::new(f32::INFINITY, f32::INFINITY);
        let mut max = Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Self::from_min_max(min, max)
    }

    /// Minimum corner
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Maximum corner
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Self) -> Self {
        let min = Vec2::new(self.x.min(other.x), self.y.min(other.y));
        let max = self.max();
        let other_max = other.max();
        Self::from_min_max(min, Vec2::new(max.x.max(other_max.x), max.y.max(other_max.y)))
    }

    /// Strict overlap test; rectangles that only share an edge do not overlap
    pub fn overlaps(&self, other: &Self) -> bool {
        !(self.x >= other.x + other.width
            || self.x + self.width <= other.x
            || self.y >= other.y + other.height
            || self.y + self.height <= other.y)
    }

    /// Four corners in clockwise screen order starting at the top-left
    pub fn corners(&self) -> [Vec2; 4] {
        let max = self.max();
        [
            Vec2::new(self.x, self.y),
            Vec2::new(max.x, self.y),
            max,
            Vec2::new(self.x, max.y),
        ]
    }
}
