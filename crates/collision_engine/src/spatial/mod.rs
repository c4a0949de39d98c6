//! Spatial partitioning data structures
//!
//! Provides the uniform hash grid used to prune pair tests in the broad phase.

mod data_block;
mod hash_grid;
mod spatial_query;

pub use data_block::{DataBlock, DEFAULT_BLOCK_CAPACITY, NO_NEXT_BLOCK};
pub use hash_grid::{cell_coords, cell_id, CellId, CellOccupancy, HashGrid};
pub use spatial_query::SpatialQuery;
