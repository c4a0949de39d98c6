//! Collision error types

use crate::config::ConfigError;

/// Errors raised while configuring the collision pipeline
///
/// The per-tick pass itself has no recoverable errors.
#[derive(thiserror::Error, Debug)]
pub enum CollisionError {
    /// Layer value with zero or several bits set
    #[error("Invalid collision layer {0:#x}: exactly one bit must be set")]
    InvalidLayer(u32),

    /// Negative, non-finite or inconsistent shape parameters
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Worker pool could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// Configuration file could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
