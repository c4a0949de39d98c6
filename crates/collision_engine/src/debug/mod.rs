//! Debug visualization for the collision pipeline
//!
//! Produces plain 2D shapes for an overlay renderer; nothing here draws.

pub mod collision_debug;
pub mod draw;

pub use collision_debug::{CollisionDebugColors, CollisionDebugVisualizer};
pub use draw::{DebugDrawSystem, DebugShape, DebugShapeId};
