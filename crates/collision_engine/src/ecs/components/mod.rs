//! Components read by the collision pipeline

mod collision;
mod position;

pub use collision::{ColliderComponent, CollisionEntity};
pub use position::PositionComponent;
