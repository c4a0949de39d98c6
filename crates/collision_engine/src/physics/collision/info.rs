//! Penetration data produced by narrow-phase tests

use crate::foundation::math::Vec2;

/// Resolution hint for a confirmed overlap
///
/// The normal is a unit vector pointing from B to A, the direction A has to
/// move to separate. A zero depth means "no collision"; [`CollisionInfo::default`]
/// is that sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInfo {
    /// How far the shapes overlap along the normal
    pub penetration_depth: f32,
    /// Separation direction for A, pointing from B to A
    pub normal: Vec2,
    /// World-space contact estimate
    pub collision_point: Vec2,
}

impl Default for CollisionInfo {
    fn default() -> Self {
        Self {
            penetration_depth: 0.0,
            normal: Vec2::zeros(),
            collision_point: Vec2::zeros(),
        }
    }
}

impl CollisionInfo {
    /// Create collision info
    pub const fn new(penetration_depth: f32, normal: Vec2, collision_point: Vec2) -> Self {
        Self { penetration_depth, normal, collision_point }
    }

    /// The "no collision" sentinel
    pub fn none() -> Self {
        Self::default()
    }

    /// True when the test confirmed an overlap
    #[inline]
    pub fn is_colliding(&self) -> bool {
        self.penetration_depth != 0.0
    }

    /// Same contact seen from the other shape
    #[inline]
    #[must_use]
    pub fn flipped(mut self) -> Self {
        self.normal = -self.normal;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_is_not_colliding() {
        assert!(!CollisionInfo::default().is_colliding());
        assert!(!CollisionInfo::none().is_colliding());
    }

    #[test]
    fn test_flipped_negates_normal_only() {
        let info = CollisionInfo::new(2.0, Vec2::new(1.0, 0.0), Vec2::new(3.0, 4.0));
        let flipped = info.flipped();
        assert_relative_eq!(flipped.normal, Vec2::new(-1.0, 0.0));
        assert_relative_eq!(flipped.penetration_depth, 2.0);
        assert_relative_eq!(flipped.collision_point, info.collision_point);
    }
}
