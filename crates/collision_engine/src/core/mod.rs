//! Core collision configuration

pub mod config;

pub use config::{CollisionConfig, GridConfig, OverflowPolicy, SchedulerConfig};
