//! # Collision Configuration
//!
//! Tunables for the spatial hash grid and the broad-phase scheduler. Every
//! struct has sensible defaults, `with_*` builders and a `validate()` pass,
//! and the root [`CollisionConfig`] loads from TOML or RON through [`Config`].
//!
//! ```toml
//! [grid]
//! cell_size = 64.0
//! overflow_policy = "Chain"
//! reserve_cells = 4096
//!
//! [scheduler]
//! worker_threads = 7
//! small_n_threshold = 500
//! ```

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};

/// What a grid cell does once its data block is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Link another block from the shared pool. Never loses entries.
    #[default]
    Chain,
    /// Keep one block per cell and count insertions past its capacity.
    ///
    /// Bounds memory per cell at the cost of missed pairs in extremely dense cells.
    Drop,
}

/// # Grid Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Edge length of one square cell in world units. Powers of two work best.
    pub cell_size: f32,
    /// Overflow behavior for full cells
    pub overflow_policy: OverflowPolicy,
    /// Number of cells to pre-allocate map and block storage for
    pub reserve_cells: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: 64.0,
            overflow_policy: OverflowPolicy::Chain,
            reserve_cells: 1024,
        }
    }
}

impl GridConfig {
    /// Set cell size
    pub const fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Set overflow policy
    pub const fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// Set the number of cells to reserve up front
    pub const fn with_reserve_cells(mut self, cells: usize) -> Self {
        self.reserve_cells = cells;
        self
    }

    /// Validate grid settings
    pub fn validate(&self) -> Result<(), String> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(format!("cell_size must be finite and positive, got {}", self.cell_size));
        }
        Ok(())
    }
}

/// # Scheduler Configuration
///
/// The broad phase splits work into `worker_threads + 1` chunks; the calling
/// thread always runs the last one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Size of the fixed worker pool. Zero disables threading.
    pub worker_threads: usize,
    /// Worlds with fewer active entities run on the calling thread only
    pub small_n_threshold: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        let cores = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        Self {
            worker_threads: cores.saturating_sub(1),
            small_n_threshold: 500,
        }
    }
}

impl SchedulerConfig {
    /// Set worker thread count
    pub const fn with_worker_threads(mut self, workers: usize) -> Self {
        self.worker_threads = workers;
        self
    }

    /// Set the single-threaded fallback threshold
    pub const fn with_small_n_threshold(mut self, threshold: usize) -> Self {
        self.small_n_threshold = threshold;
        self
    }

    /// Number of work chunks per tick
    pub const fn parts(&self) -> usize {
        self.worker_threads + 1
    }

    /// Validate scheduler settings
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_threads > 256 {
            return Err(format!("worker_threads must be at most 256, got {}", self.worker_threads));
        }
        Ok(())
    }
}

/// # Collision Configuration
///
/// Root configuration handed to [`crate::physics::CollisionWorld::new`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Spatial hash grid settings
    pub grid: GridConfig,
    /// Broad-phase scheduler settings
    pub scheduler: SchedulerConfig,
}

impl CollisionConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set grid configuration
    pub const fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    /// Set scheduler configuration
    pub const fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Validate the whole configuration
    pub fn validate(&self) -> Result<(), String> {
        self.grid.validate()?;
        self.scheduler.validate()?;
        Ok(())
    }
}

impl Config for CollisionConfig {}
