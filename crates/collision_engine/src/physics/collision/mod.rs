//! Narrow-phase collision detection
//!
//! # Module Organization
//!
//! - [`primitives`] - Closed-form tests between circles, rectangles and quads
//! - [`sat`] - Separating Axis Theorem and the shared rotation routine
//! - [`shape`] - Model-space shapes and their world-space resolution
//! - [`info`] - Penetration data returned by every `_info` test
//! - [`numeric`] - Scalar and lane-wise numeric kernels
//!
//! # Conventions
//!
//! World space is y-down. Positions are the top-left of a shape's local frame,
//! rotations are degrees clockwise about the collider's anchor, and every
//! normal points from the second shape to the first.

pub mod info;
pub mod numeric;
pub mod primitives;
pub mod sat;
pub mod shape;

pub use info::CollisionInfo;
pub use primitives::{Circle, Quad};
pub use shape::{capsule_to_shape_info, Capsule, CapsuleBody, CollisionShape, WorldSpaceShape};

use crate::ecs::CollisionEntity;
use crate::foundation::math::{Rect, Vec2};

/// Whether an entity's collider overlaps a world-space rectangle
pub fn check_collision_entity_rect(entity: &CollisionEntity, rect: &Rect) -> bool {
    WorldSpaceShape::from_components(&entity.position, &entity.collider)
        .overlaps(&WorldSpaceShape::Aabb(*rect))
}

/// Whether two convex quads (or padded triangles) overlap
pub fn check_collision_quadrilaterals(a: &Quad, b: &Quad) -> bool {
    sat::sat(a, b)
}

/// Whether a circle overlaps a convex quad
pub fn check_collision_circle_to_quadrilateral(center: Vec2, radius: f32, quad: &Quad) -> bool {
    primitives::circle_to_quad(&Circle::new(center, radius), quad)
}
