//! Separating Axis Theorem for convex quads and the shared rotation routine
//!
//! Rotation convention: angles are degrees, clockwise from "up" in y-down
//! screen space, applied about an anchor given in the shape's local frame.

use crate::foundation::math::{Vec2, DEG_TO_RAD};
use super::info::CollisionInfo;
use super::numeric;
use super::primitives::{quad_bounds, Quad};

/// Precomputed sine and cosine of a rotation
#[derive(Debug, Clone, Copy)]
pub struct Rotation {
    sin: f32,
    cos: f32,
}

impl Rotation {
    /// Rotation by `degrees` clockwise on screen
    pub fn from_degrees(degrees: f32) -> Self {
        let (sin, cos) = (degrees * DEG_TO_RAD).sin_cos();
        Self { sin, cos }
    }

    /// Rotate a local point about `anchor` and translate by `origin`
    #[inline]
    pub fn apply(&self, local: Vec2, anchor: Vec2, origin: Vec2) -> Vec2 {
        let p = local - anchor;
        Vec2::new(
            p.x * self.cos - p.y * self.sin,
            p.x * self.sin + p.y * self.cos,
        ) + anchor + origin
    }
}

/// Rotate four local points about `anchor` and move them to world position `(x, y)`
pub fn rotate_points4(x: f32, y: f32, points: &mut Quad, rotation: f32, anchor: Vec2) {
    let rotation = Rotation::from_degrees(rotation);
    let origin = Vec2::new(x, y);
    for p in points.iter_mut() {
        *p = rotation.apply(*p, anchor, origin);
    }
}

/// Move four local points to world position `(x, y)` without rotating
pub fn translate_points4(x: f32, y: f32, points: &mut Quad) {
    let origin = Vec2::new(x, y);
    for p in points.iter_mut() {
        *p += origin;
    }
}

fn edge_axis(quad: &Quad, i: usize) -> Option<Vec2> {
    let edge = quad[(i + 1) % 4] - quad[i];
    if edge.norm_squared() <= f32::EPSILON {
        return None;
    }
    Some(Vec2::new(-edge.y, edge.x))
}

/// Overlap test for two convex quads (triangles padded to four points)
pub fn sat(a: &Quad, b: &Quad) -> bool {
    if !quad_bounds(a).overlaps(&quad_bounds(b)) {
        return false;
    }

    for quad in [a, b] {
        for i in 0..4 {
            let Some(axis) = edge_axis(quad, i) else { continue };
            let (min_a, max_a) = numeric::project4(a, &axis);
            let (min_b, max_b) = numeric::project4(b, &axis);
            if max_a <= min_b || max_b <= min_a {
                return false;
            }
        }
    }
    true
}

/// Overlap test with penetration along the axis of least overlap
///
/// The contact point is the center of the overlap of both bounding boxes.
pub fn sat_info(a: &Quad, b: &Quad) -> CollisionInfo {
    let bounds_a = quad_bounds(a);
    let bounds_b = quad_bounds(b);
    if !bounds_a.overlaps(&bounds_b) {
        return CollisionInfo::none();
    }

    let mut best_depth = f32::INFINITY;
    let mut best_normal = Vec2::zeros();
    for quad in [a, b] {
        for i in 0..4 {
            let Some(axis) = edge_axis(quad, i) else { continue };
            let axis = axis / numeric::sqrt(axis.norm_squared());
            let (min_a, max_a) = numeric::project4(a, &axis);
            let (min_b, max_b) = numeric::project4(b, &axis);
            if max_a <= min_b || max_b <= min_a {
                return CollisionInfo::none();
            }

            // Moving A along -axis by `negative` or along +axis by `positive` separates
            let negative = max_a - min_b;
            let positive = max_b - min_a;
            let (depth, normal) = if negative < positive { (negative, -axis) } else { (positive, axis) };
            if depth < best_depth {
                best_depth = depth;
                best_normal = normal;
            }
        }
    }

    if !best_depth.is_finite() {
        return CollisionInfo::none();
    }

    let (a_max, b_max) = (bounds_a.max(), bounds_b.max());
    let overlap_min = Vec2::new(bounds_a.x.max(bounds_b.x), bounds_a.y.max(bounds_b.y));
    let overlap_max = Vec2::new(a_max.x.min(b_max.x), a_max.y.min(b_max.y));
    CollisionInfo::new(best_depth, best_normal, (overlap_min + overlap_max) * 0.5)
}
