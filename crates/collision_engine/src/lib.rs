//! # Collision Engine
//!
//! A 2D collision detection engine for worlds with tens of thousands of moving
//! entities.
//!
//! ## Features
//!
//! - **Spatial Hash Grid**: Fixed-size blocks chained per cell, rebuilt every tick
//! - **Parallel Broad Phase**: Chunked scan on a fixed worker pool plus the caller
//! - **Narrow Phase**: Rectangles, circles, capsules and triangles, rotated or not
//! - **Penetration Info**: Depth, normal and contact point for every pair
//! - **Layer Filtering**: Bitmask layers and per-map partitioning
//! - **Typed Handlers**: One callback per entity type, invoked for both sides of a pair
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use collision_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     collision_engine::foundation::logging::init();
//!
//!     let mut world = CollisionWorld::new(CollisionConfig::default())?;
//!
//!     let mut handlers = CollisionHandlers::new();
//!     handlers.register(EntityType(0), |this: EntityId, other: EntityId, info: &CollisionInfo| {
//!         log::info!("{this} hit {other}, depth {}", info.penetration_depth);
//!     });
//!
//!     let entities = [
//!         CollisionEntity::new(
//!             EntityId::new(1),
//!             PositionComponent::new(0.0, 0.0, EntityType(0)),
//!             ColliderComponent::rect(10.0, 10.0),
//!         ),
//!         CollisionEntity::new(
//!             EntityId::new(2),
//!             PositionComponent::new(5.0, 5.0, EntityType(0)),
//!             ColliderComponent::circle(4.0),
//!         ),
//!     ];
//!
//!     let stats = world.tick(&entities, &mut handlers);
//!     log::info!("{} pairs in {:?}", stats.unique_pairs, stats.total_time());
//!     Ok(())
//! }
//! ```

// Core configuration
pub mod config;
pub mod core;

pub mod debug;
pub mod ecs;
pub mod foundation;
pub mod physics;
pub mod spatial;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::Config,
        core::config::{CollisionConfig, GridConfig, OverflowPolicy, SchedulerConfig},
        ecs::{ColliderComponent, CollisionEntity, EntityId, EntityType, MapId, PositionComponent},
        foundation::{
            math::{Rect, Vec2},
            time::Stopwatch,
        },
        physics::{
            CollisionError, CollisionHandler, CollisionHandlers, CollisionInfo, CollisionLayers, CollisionPair,
            CollisionShape, CollisionWorld, TickStats, WorldSpaceShape,
        },
        spatial::HashGrid,
    };
}
