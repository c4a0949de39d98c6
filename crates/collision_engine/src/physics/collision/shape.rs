//! Model-space collision shapes and their world-space resolution
//!
//! Shapes are stored in local space relative to the entity position (the
//! top-left of the shape) and resolved into a [`WorldSpaceShape`] once per
//! tick. Unrotated rectangles and capsule bodies stay axis-aligned so they
//! take the cheap interval tests; everything rotated goes through SAT.

use crate::ecs::{ColliderComponent, PositionComponent};
use crate::foundation::math::{Rect, Vec2};
use crate::physics::CollisionError;
use super::info::CollisionInfo;
use super::primitives::{
    circle_to_circle_info, circle_to_quad_info, circle_to_rect_info, quad_bounds,
    quad_to_circle_info, rect_to_circle_info, rect_to_rect_info, Circle, Quad,
};
use super::sat::{rotate_points4, sat_info, translate_points4, Rotation};

/// Collision shape in MODEL SPACE
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionShape {
    /// Rectangle spanning `(0, 0)..(width, height)`
    Rect {
        /// Extent along x
        width: f32,
        /// Extent along y
        height: f32,
    },
    /// Circle centered at `(radius, radius)`
    Circle {
        /// Radius
        radius: f32,
    },
    /// Upright capsule spanning `(0, 0)..(2 * radius, height)`
    Capsule {
        /// Radius of both end caps
        radius: f32,
        /// Total height including the caps
        height: f32,
    },
    /// Triangle with vertices `(0, 0)`, `b` and `c`
    Triangle {
        /// Second vertex
        b: Vec2,
        /// Third vertex
        c: Vec2,
    },
}

impl CollisionShape {
    /// Anchor a collider gets unless one is set: the center for circles, the origin otherwise
    pub fn default_anchor(&self) -> Vec2 {
        match self {
            Self::Circle { radius } => Vec2::new(*radius, *radius),
            Self::Rect { .. } | Self::Capsule { .. } | Self::Triangle { .. } => Vec2::zeros(),
        }
    }

    /// Reject negative, non-finite or self-contradicting parameters
    ///
    /// Zero sizes are allowed; such shapes never collide.
    pub fn validate(&self) -> Result<(), CollisionError> {
        let finite_non_negative = |name: &str, value: f32| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(CollisionError::InvalidShape(format!("{name} must be finite and >= 0, got {value}")))
            }
        };

        match *self {
            Self::Rect { width, height } => {
                finite_non_negative("rect width", width)?;
                finite_non_negative("rect height", height)
            }
            Self::Circle { radius } => finite_non_negative("circle radius", radius),
            Self::Capsule { radius, height } => {
                finite_non_negative("capsule radius", radius)?;
                finite_non_negative("capsule height", height)?;
                if height < radius * 2.0 {
                    return Err(CollisionError::InvalidShape(format!(
                        "capsule height {height} is smaller than its diameter {}",
                        radius * 2.0
                    )));
                }
                Ok(())
            }
            Self::Triangle { b, c } => {
                if b.iter().chain(c.iter()).all(|v| v.is_finite()) {
                    Ok(())
                } else {
                    Err(CollisionError::InvalidShape("triangle vertices must be finite".to_string()))
                }
            }
        }
    }

    /// Transform this shape into world space
    pub fn to_world_space(&self, position: &PositionComponent, anchor: Vec2) -> WorldSpaceShape {
        let origin = position.origin();
        let rotation = position.is_rotated().then(|| Rotation::from_degrees(position.rotation));

        match *self {
            Self::Rect { width, height } => match rotation {
                None => WorldSpaceShape::Aabb(Rect::new(position.x, position.y, width, height)),
                Some(_) => {
                    let mut points = Rect::new(0.0, 0.0, width, height).corners();
                    rotate_points4(position.x, position.y, &mut points, position.rotation, anchor);
                    WorldSpaceShape::Polygon(points)
                }
            },
            Self::Circle { radius } => {
                let local = Vec2::new(radius, radius);
                let center = rotation.map_or(local + origin, |r| r.apply(local, anchor, origin));
                WorldSpaceShape::Circle(Circle::new(center, radius))
            }
            Self::Triangle { b, c } => {
                let mut points = [Vec2::zeros(), b, c, Vec2::zeros()];
                if rotation.is_some() {
                    rotate_points4(position.x, position.y, &mut points, position.rotation, anchor);
                } else {
                    translate_points4(position.x, position.y, &mut points);
                }
                WorldSpaceShape::Polygon(points)
            }
            Self::Capsule { radius, height } => {
                let top = Vec2::new(radius, radius);
                let bottom = Vec2::new(radius, height - radius);
                let body = Rect::new(0.0, radius, radius * 2.0, height - radius * 2.0);
                let capsule = match rotation {
                    None => Capsule {
                        top: top + origin,
                        bottom: bottom + origin,
                        radius,
                        body: CapsuleBody::Aabb(Rect::new(body.x + origin.x, body.y + origin.y, body.width, body.height)),
                    },
                    Some(r) => {
                        let mut points = body.corners();
                        rotate_points4(position.x, position.y, &mut points, position.rotation, anchor);
                        Capsule {
                            top: r.apply(top, anchor, origin),
                            bottom: r.apply(bottom, anchor, origin),
                            radius,
                            body: CapsuleBody::Polygon(points),
                        }
                    }
                };
                WorldSpaceShape::Capsule(capsule)
            }
        }
    }
}

/// Straight section of a capsule between its end caps
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CapsuleBody {
    /// Unrotated body
    Aabb(Rect),
    /// Rotated body
    Polygon(Quad),
}

/// A capsule in world space: two end circles joined by a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    /// Center of the top cap
    pub top: Vec2,
    /// Center of the bottom cap
    pub bottom: Vec2,
    /// Cap radius; also the body's half-width
    pub radius: f32,
    /// Body between the caps
    pub body: CapsuleBody,
}

impl Capsule {
    /// End caps and body as plain shapes, in test order
    pub fn parts(&self) -> [WorldSpaceShape; 3] {
        let body = match self.body {
            CapsuleBody::Aabb(rect) => WorldSpaceShape::Aabb(rect),
            CapsuleBody::Polygon(quad) => WorldSpaceShape::Polygon(quad),
        };
        [
            WorldSpaceShape::Circle(Circle::new(self.top, self.radius)),
            WorldSpaceShape::Circle(Circle::new(self.bottom, self.radius)),
            body,
        ]
    }

    /// Bounding rectangle of both caps
    pub fn bounds(&self) -> Rect {
        Circle::new(self.top, self.radius)
            .bounds()
            .union(&Circle::new(self.bottom, self.radius).bounds())
    }
}

/// Temporary world-space shape used for collision testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldSpaceShape {
    /// Axis-aligned rectangle
    Aabb(Rect),
    /// Circle
    Circle(Circle),
    /// Rotated rectangle or triangle
    Polygon(Quad),
    /// Capsule, tested piecewise
    Capsule(Capsule),
}

impl WorldSpaceShape {
    /// Resolve an entity's collider at its position
    pub fn from_components(position: &PositionComponent, collider: &ColliderComponent) -> Self {
        collider.shape.to_world_space(position, collider.anchor)
    }

    /// World-space bounding rectangle, used for grid insertion
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Aabb(rect) => *rect,
            Self::Circle(circle) => circle.bounds(),
            Self::Polygon(quad) => quad_bounds(quad),
            Self::Capsule(capsule) => capsule.bounds(),
        }
    }

    /// Zero-area shapes are inert and never collide
    pub fn is_degenerate(&self) -> bool {
        match self {
            Self::Aabb(rect) => rect.width <= 0.0 || rect.height <= 0.0,
            Self::Circle(circle) => circle.radius <= 0.0,
            Self::Polygon(quad) => twice_area(quad).abs() <= f32::EPSILON,
            Self::Capsule(capsule) => capsule.radius <= 0.0,
        }
    }

    /// Narrow-phase test between two resolved shapes
    ///
    /// The returned normal points from `other` to `self`.
    pub fn intersect(&self, other: &Self) -> CollisionInfo {
        if self.is_degenerate() || other.is_degenerate() {
            return CollisionInfo::none();
        }
        intersect_resolved(self, other)
    }

    /// Overlap test without penetration data
    pub fn overlaps(&self, other: &Self) -> bool {
        self.intersect(other).is_colliding()
    }
}

/// Twice the signed area of the polygon
///
/// Edges are taken relative to the first vertex so the result keeps its
/// precision far from the origin.
fn twice_area(quad: &Quad) -> f32 {
    let origin = quad[0];
    (1..3)
        .map(|i| {
            let (p, q) = (quad[i] - origin, quad[i + 1] - origin);
            p.x * q.y - q.x * p.y
        })
        .sum()
}

fn intersect_resolved(a: &WorldSpaceShape, b: &WorldSpaceShape) -> CollisionInfo {
    use WorldSpaceShape::{Aabb, Capsule, Circle, Polygon};

    match (a, b) {
        (Aabb(a), Aabb(b)) => rect_to_rect_info(a, b),
        (Aabb(rect), Circle(circle)) => rect_to_circle_info(rect, circle),
        (Circle(circle), Aabb(rect)) => circle_to_rect_info(circle, rect),
        (Circle(a), Circle(b)) => circle_to_circle_info(a, b),
        (Aabb(rect), Polygon(quad)) => sat_info(&rect.corners(), quad),
        (Polygon(quad), Aabb(rect)) => sat_info(quad, &rect.corners()),
        (Polygon(a), Polygon(b)) => sat_info(a, b),
        (Circle(circle), Polygon(quad)) => circle_to_quad_info(circle, quad),
        (Polygon(quad), Circle(circle)) => quad_to_circle_info(quad, circle),
        (Capsule(capsule), other) => capsule_to_shape_info(capsule, other),
        (other, Capsule(capsule)) => capsule_to_shape_info(capsule, other).flipped(),
    }
}

/// Capsule against any shape: caps first, then the body; first hit wins
///
/// The normal points from `other` to the capsule.
pub fn capsule_to_shape_info(capsule: &Capsule, other: &WorldSpaceShape) -> CollisionInfo {
    if !capsule.bounds().overlaps(&other.bounds()) {
        return CollisionInfo::none();
    }
    for part in capsule.parts() {
        if part.is_degenerate() {
            continue;
        }
        let info = intersect_resolved(&part, other);
        if info.is_colliding() {
            return info;
        }
    }
    CollisionInfo::none()
}
