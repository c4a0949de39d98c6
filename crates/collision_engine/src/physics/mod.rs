//! Physics module for 2D collision detection
//!
//! # Module Organization
//!
//! - [`collision`] - Shapes and narrow-phase tests
//! - [`collision_layers`] - Layer bitmask filtering
//! - [`broad_phase`] - Parallel grid scan producing confirmed pairs
//! - [`pair_dispatch`] - Pair deduplication and per-type handlers
//! - [`collision_system`] - [`CollisionWorld`], which runs one tick end to end

pub mod broad_phase;
pub mod collision;
pub mod collision_layers;
pub mod collision_system;
pub mod error;
pub mod pair_dispatch;

pub use broad_phase::CollisionPair;
pub use collision::{CollisionInfo, CollisionShape, WorldSpaceShape};
pub use collision_layers::CollisionLayers;
pub use collision_system::{CollisionWorld, TickStats};
pub use error::CollisionError;
pub use pair_dispatch::{CollisionHandler, CollisionHandlers};
