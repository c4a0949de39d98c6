//! Abstract spatial index interface for the broad phase
//!
//! The broad phase only needs rectangle inserts and rectangle queries, so any
//! index that can answer those (grid, quadtree, BVH) can stand in for the
//! hash grid.

use crate::foundation::math::Rect;

/// Rectangle-keyed spatial index
///
/// Queries may return false positives and duplicates but never miss a value
/// whose inserted rectangle overlaps the query rectangle.
pub trait SpatialQuery<V>: Send + Sync {
    /// Insert a value covering `bounds`
    fn insert(&mut self, value: V, bounds: &Rect);

    /// Append candidate values near `bounds` to `out`
    fn query(&self, bounds: &Rect, out: &mut Vec<V>);

    /// Remove everything
    fn clear(&mut self);

    /// Stored entries
    fn entry_count(&self) -> usize;
}
