//! Closed-form overlap tests between world-space primitives
//!
//! Every test has a `bool` form for pure overlap queries and an `_info` form
//! that also reports penetration. All `_info` forms follow the same
//! convention: the normal points from the second argument to the first.
//! Touching shapes (zero overlap) do not collide.

use crate::foundation::math::{Rect, Vec2};
use super::info::CollisionInfo;
use super::numeric;

/// Four world-space points; a triangle repeats its first vertex as the fourth
pub type Quad = [Vec2; 4];

/// Normal used when two centers coincide and no direction can be derived
#[inline]
fn fallback_normal() -> Vec2 {
    Vec2::new(0.0, -1.0)
}

/// A circle in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Center point
    pub center: Vec2,
    /// Radius
    pub radius: f32,
}

impl Circle {
    /// Creates a circle
    pub const fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Bounding rectangle
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.radius * 2.0,
            self.radius * 2.0,
        )
    }
}

/// Axis-aligned rectangle overlap
#[inline]
pub fn rect_to_rect(a: &Rect, b: &Rect) -> bool {
    a.overlaps(b)
}

/// Axis-aligned rectangle overlap resolved along the axis of least penetration
pub fn rect_to_rect_info(a: &Rect, b: &Rect) -> CollisionInfo {
    if !a.overlaps(b) {
        return CollisionInfo::none();
    }

    let (a_min, a_max) = (a.min(), a.max());
    let (b_min, b_max) = (b.min(), b.max());
    let overlap_min = Vec2::new(a_min.x.max(b_min.x), a_min.y.max(b_min.y));
    let overlap_max = Vec2::new(a_max.x.min(b_max.x), a_max.y.min(b_max.y));
    let overlap = overlap_max - overlap_min;
    let point = (overlap_min + overlap_max) * 0.5;

    let (a_center, b_center) = (a.center(), b.center());
    if overlap.x < overlap.y {
        let sign = if a_center.x < b_center.x { -1.0 } else { 1.0 };
        CollisionInfo::new(overlap.x, Vec2::new(sign, 0.0), point)
    } else {
        let sign = if a_center.y < b_center.y { -1.0 } else { 1.0 };
        CollisionInfo::new(overlap.y, Vec2::new(0.0, sign), point)
    }
}

/// Circle overlap using squared distances only
#[inline]
pub fn circle_to_circle(a: &Circle, b: &Circle) -> bool {
    let radius_sum = a.radius + b.radius;
    (a.center - b.center).norm_squared() < radius_sum * radius_sum
}

/// Circle overlap with penetration; coincident centers separate along `(0, -1)`
pub fn circle_to_circle_info(a: &Circle, b: &Circle) -> CollisionInfo {
    let delta = a.center - b.center;
    let distance_sq = delta.norm_squared();
    let radius_sum = a.radius + b.radius;
    if distance_sq >= radius_sum * radius_sum {
        return CollisionInfo::none();
    }

    let distance = numeric::sqrt(distance_sq);
    let normal = if distance > f32::EPSILON { delta / distance } else { fallback_normal() };
    CollisionInfo::new(radius_sum - distance, normal, b.center + normal * b.radius)
}

fn closest_point_on_rect(point: Vec2, rect: &Rect) -> Vec2 {
    let max = rect.max();
    Vec2::new(point.x.clamp(rect.x, max.x), point.y.clamp(rect.y, max.y))
}

/// Circle against an axis-aligned rectangle
#[inline]
pub fn circle_to_rect(circle: &Circle, rect: &Rect) -> bool {
    let closest = closest_point_on_rect(circle.center, rect);
    (circle.center - closest).norm_squared() < circle.radius * circle.radius
}

/// Rectangle against a circle
#[inline]
pub fn rect_to_circle(rect: &Rect, circle: &Circle) -> bool {
    circle_to_rect(circle, rect)
}

/// Circle against an axis-aligned rectangle with penetration
///
/// A center inside the rectangle is pushed out through the nearest face.
pub fn circle_to_rect_info(circle: &Circle, rect: &Rect) -> CollisionInfo {
    let center = circle.center;
    let closest = closest_point_on_rect(center, rect);
    let delta = center - closest;
    let distance_sq = delta.norm_squared();
    if distance_sq >= circle.radius * circle.radius {
        return CollisionInfo::none();
    }

    if distance_sq > 0.0 {
        let distance = numeric::sqrt(distance_sq);
        return CollisionInfo::new(circle.radius - distance, delta / distance, closest);
    }

    let max = rect.max();
    let faces = [
        (center.x - rect.x, Vec2::new(-1.0, 0.0), Vec2::new(rect.x, center.y)),
        (max.x - center.x, Vec2::new(1.0, 0.0), Vec2::new(max.x, center.y)),
        (center.y - rect.y, Vec2::new(0.0, -1.0), Vec2::new(center.x, rect.y)),
        (max.y - center.y, Vec2::new(0.0, 1.0), Vec2::new(center.x, max.y)),
    ];
    let mut nearest = faces[0];
    for face in &faces[1..] {
        if face.0 < nearest.0 {
            nearest = *face;
        }
    }
    let (face_distance, normal, point) = nearest;
    CollisionInfo::new(circle.radius + face_distance, normal, point)
}

/// Rectangle against a circle with penetration, normal pointing toward the rectangle
#[inline]
pub fn rect_to_circle_info(rect: &Rect, circle: &Circle) -> CollisionInfo {
    circle_to_rect_info(circle, rect).flipped()
}

/// Closest point to `p` on the segment `a`-`b`
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let length_sq = ab.norm_squared();
    if length_sq <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(&ab) / length_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Whether `p` lies inside or on a convex quad of either winding
pub fn point_in_quad(p: Vec2, quad: &Quad) -> bool {
    let mut has_positive = false;
    let mut has_negative = false;
    for i in 0..4 {
        let a = quad[i];
        let b = quad[(i + 1) % 4];
        let edge = b - a;
        if edge.norm_squared() <= f32::EPSILON {
            continue;
        }
        let cross = edge.x * (p.y - a.y) - edge.y * (p.x - a.x);
        has_positive |= cross > 0.0;
        has_negative |= cross < 0.0;
    }
    !(has_positive && has_negative)
}

/// Arithmetic mean of the quad's points; always inside a convex quad
pub fn quad_centroid(quad: &Quad) -> Vec2 {
    (quad[0] + quad[1] + quad[2] + quad[3]) * 0.25
}

/// Bounding rectangle of a quad
pub fn quad_bounds(quad: &Quad) -> Rect {
    Rect::from_points(quad)
}

struct EdgeHit {
    point: Vec2,
    distance_sq: f32,
    edge: usize,
}

fn closest_edge(center: Vec2, quad: &Quad) -> EdgeHit {
    let mut best = EdgeHit { point: quad[0], distance_sq: f32::INFINITY, edge: 0 };
    for i in 0..4 {
        let point = closest_point_on_segment(center, quad[i], quad[(i + 1) % 4]);
        let distance_sq = (center - point).norm_squared();
        if distance_sq < best.distance_sq {
            best = EdgeHit { point, distance_sq, edge: i };
        }
    }
    best
}

fn outward_edge_normal(quad: &Quad, edge: usize) -> Vec2 {
    let a = quad[edge];
    let d = quad[(edge + 1) % 4] - a;
    let length = numeric::sqrt(d.norm_squared());
    if length <= f32::EPSILON {
        return fallback_normal();
    }
    let normal = Vec2::new(-d.y, d.x) / length;
    if normal.dot(&(a - quad_centroid(quad))) < 0.0 {
        -normal
    } else {
        normal
    }
}

/// Circle against a convex quad or padded triangle
pub fn circle_to_quad(circle: &Circle, quad: &Quad) -> bool {
    if point_in_quad(circle.center, quad) {
        return true;
    }
    closest_edge(circle.center, quad).distance_sq < circle.radius * circle.radius
}

/// Circle against a convex quad with penetration
///
/// A center inside the quad is pushed out through the nearest edge.
pub fn circle_to_quad_info(circle: &Circle, quad: &Quad) -> CollisionInfo {
    let hit = closest_edge(circle.center, quad);
    let radius_sq = circle.radius * circle.radius;

    if point_in_quad(circle.center, quad) {
        let distance = numeric::sqrt(hit.distance_sq);
        let normal = outward_edge_normal(quad, hit.edge);
        return CollisionInfo::new(circle.radius + distance, normal, hit.point);
    }

    if hit.distance_sq >= radius_sq {
        return CollisionInfo::none();
    }

    let distance = numeric::sqrt(hit.distance_sq);
    let normal = if distance > f32::EPSILON {
        (circle.center - hit.point) / distance
    } else {
        outward_edge_normal(quad, hit.edge)
    };
    CollisionInfo::new(circle.radius - distance, normal, hit.point)
}

/// Quad against a circle with penetration, normal pointing toward the quad
#[inline]
pub fn quad_to_circle_info(quad: &Quad, circle: &Circle) -> CollisionInfo {
    circle_to_quad_info(circle, quad).flipped()
}
