//! Entity-facing types consumed by the collision pipeline
//!
//! Entity storage lives outside this crate. Each tick the engine hands the
//! collision world a snapshot of [`CollisionEntity`] rows built from its own
//! components.

pub mod entity;
pub mod components;

pub use entity::{EntityId, EntityType, MapId};
pub use components::{ColliderComponent, CollisionEntity, PositionComponent};
