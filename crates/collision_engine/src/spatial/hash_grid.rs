//! Uniform spatial hash grid with block-chained buckets
//!
//! Cells are square with side `cell_size`. Each occupied cell maps to a chain
//! of fixed-capacity [`DataBlock`]s stored in one shared arena, linked by
//! index. Clearing drops the cell map and the arena contents in time
//! proportional to the occupied cells; allocated capacity is kept.
//!
//! Cell coordinates use true floor division, so `-0.5` and `0.5` land in
//! different cells.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::core::config::{GridConfig, OverflowPolicy};
use crate::foundation::math::Rect;
use super::data_block::{DataBlock, DEFAULT_BLOCK_CAPACITY};
use super::spatial_query::SpatialQuery;

/// Packed cell coordinates: `(cell_x << 32) | cell_y`
pub type CellId = i64;

/// Pack two signed cell coordinates into one key
#[inline]
pub fn cell_id(cell_x: i32, cell_y: i32) -> CellId {
    (i64::from(cell_x) << 32) | i64::from(cell_y as u32)
}

/// Recover the cell coordinates from a packed key
#[inline]
pub const fn cell_coords(id: CellId) -> (i32, i32) {
    ((id >> 32) as i32, id as i32)
}

#[derive(Debug, Clone, Copy)]
struct CellChain {
    head: u32,
    tail: u32,
}

/// Read-only view of one occupied cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellOccupancy {
    /// Cell column
    pub cell_x: i32,
    /// Cell row
    pub cell_y: i32,
    /// Stored entries across the chain
    pub entries: usize,
    /// Blocks in the chain
    pub blocks: usize,
}

/// Spatial hash grid mapping cells to chains of value blocks
pub struct HashGrid<V, const N: usize = DEFAULT_BLOCK_CAPACITY> {
    cell_size: f32,
    overflow_policy: OverflowPolicy,
    cells: HashMap<CellId, CellChain>,
    blocks: Vec<DataBlock<V, N>>,
    entries: usize,
    dropped: usize,
}

impl<V: Copy + Default, const N: usize> HashGrid<V, N> {
    /// Create an empty grid with the chaining overflow policy
    ///
    /// `cell_size` must be positive; [`GridConfig::validate`] checks this for configured grids.
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            overflow_policy: OverflowPolicy::Chain,
            cells: HashMap::new(),
            blocks: Vec::new(),
            entries: 0,
            dropped: 0,
        }
    }

    /// Create a grid from configuration, reserving the requested cells
    pub fn from_config(config: &GridConfig) -> Self {
        let mut grid = Self::new(config.cell_size).with_overflow_policy(config.overflow_policy);
        grid.reserve(config.reserve_cells);
        grid
    }

    /// Set the overflow policy
    #[must_use]
    pub const fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// Cell edge length
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Active overflow policy
    pub const fn overflow_policy(&self) -> OverflowPolicy {
        self.overflow_policy
    }

    /// Values stored per block
    pub const fn block_capacity(&self) -> usize {
        N
    }

    /// Cell coordinate of a world coordinate
    #[inline]
    pub fn cell_of(&self, coord: f32) -> i32 {
        (coord / self.cell_size).floor() as i32
    }

    /// Inclusive cell range `(x1, y1, x2, y2)` touched by a rectangle
    #[inline]
    fn cell_range(&self, x: f32, y: f32, width: f32, height: f32) -> (i32, i32, i32, i32) {
        (
            self.cell_of(x),
            self.cell_of(y),
            self.cell_of(x + width),
            self.cell_of(y + height),
        )
    }

    /// Pre-allocate storage for `cells` occupied cells
    pub fn reserve(&mut self, cells: usize) {
        self.cells.reserve(cells);
        self.blocks.reserve(cells);
    }

    /// Insert `value` into every cell its bounding box touches
    pub fn insert(&mut self, value: V, x: f32, y: f32, width: f32, height: f32) {
        let (x1, y1, x2, y2) = self.cell_range(x, y, width, height);

        if x1 == x2 && y1 == y2 {
            self.insert_into_cell(cell_id(x1, y1), value);
            return;
        }

        if i64::from(x2) - i64::from(x1) <= 1 && i64::from(y2) - i64::from(y1) <= 1 {
            self.insert_into_cell(cell_id(x1, y1), value);
            if x2 != x1 {
                self.insert_into_cell(cell_id(x2, y1), value);
            }
            if y2 != y1 {
                self.insert_into_cell(cell_id(x1, y2), value);
                if x2 != x1 {
                    self.insert_into_cell(cell_id(x2, y2), value);
                }
            }
            return;
        }

        for cx in x1..=x2 {
            for cy in y1..=y2 {
                self.insert_into_cell(cell_id(cx, cy), value);
            }
        }
    }

    /// Insert using a bounding rectangle
    #[inline]
    pub fn insert_rect(&mut self, value: V, bounds: &Rect) {
        self.insert(value, bounds.x, bounds.y, bounds.width, bounds.height);
    }

    fn insert_into_cell(&mut self, id: CellId, value: V) {
        let Self { cells, blocks, overflow_policy, entries, dropped, .. } = self;

        let chain = match cells.entry(id) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => {
                let index = blocks.len() as u32;
                blocks.push(DataBlock::with_value(value));
                slot.insert(CellChain { head: index, tail: index });
                *entries += 1;
                return;
            }
        };

        if blocks[chain.tail as usize].push(value) {
            *entries += 1;
            return;
        }

        match overflow_policy {
            OverflowPolicy::Chain => {
                let index = blocks.len() as u32;
                blocks.push(DataBlock::with_value(value));
                blocks[chain.tail as usize].set_next(Some(index));
                chain.tail = index;
                *entries += 1;
            }
            OverflowPolicy::Drop => *dropped += 1,
        }
    }

    fn chain_blocks(&self, head: u32) -> impl Iterator<Item = &DataBlock<V, N>> + '_ {
        let mut next = Some(head);
        std::iter::from_fn(move || {
            let block = &self.blocks[next? as usize];
            next = block.next();
            Some(block)
        })
    }

    /// Append the members of every cell touching the rectangle to `out`
    ///
    /// A value spanning several queried cells is appended once per cell;
    /// collect into a set or dedup afterwards when that matters.
    pub fn query<C: Extend<V>>(&self, out: &mut C, x: f32, y: f32, width: f32, height: f32) {
        let (x1, y1, x2, y2) = self.cell_range(x, y, width, height);
        for cx in x1..=x2 {
            for cy in y1..=y2 {
                if let Some(chain) = self.cells.get(&cell_id(cx, cy)) {
                    for block in self.chain_blocks(chain.head) {
                        out.extend(block.as_slice().iter().copied());
                    }
                }
            }
        }
    }

    /// Query using a bounding rectangle
    #[inline]
    pub fn query_rect<C: Extend<V>>(&self, out: &mut C, bounds: &Rect) {
        self.query(out, bounds.x, bounds.y, bounds.width, bounds.height);
    }

    /// Members of a single cell
    pub fn cell_members(&self, cell_x: i32, cell_y: i32) -> Vec<V> {
        let mut out = Vec::new();
        if let Some(chain) = self.cells.get(&cell_id(cell_x, cell_y)) {
            for block in self.chain_blocks(chain.head) {
                out.extend_from_slice(block.as_slice());
            }
        }
        out
    }

    /// Empty every cell, keeping allocated capacity
    pub fn clear(&mut self) {
        self.cells.clear();
        self.blocks.clear();
        self.entries = 0;
        self.dropped = 0;
    }

    /// Occupied cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Blocks in use across all chains
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Stored entries; a value spanning k cells counts k times
    pub const fn len(&self) -> usize {
        self.entries
    }

    /// Whether nothing is stored
    pub const fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Insertions discarded by [`OverflowPolicy::Drop`] since the last clear
    pub const fn dropped_insertions(&self) -> usize {
        self.dropped
    }

    /// Enumerate occupied cells for debug overlays
    pub fn occupancy(&self) -> impl Iterator<Item = CellOccupancy> + '_ {
        self.cells.iter().map(move |(&id, chain)| {
            let (cell_x, cell_y) = cell_coords(id);
            let (entries, blocks) = self
                .chain_blocks(chain.head)
                .fold((0, 0), |(entries, blocks), block| (entries + block.len(), blocks + 1));
            CellOccupancy { cell_x, cell_y, entries, blocks }
        })
    }
}

impl<V: Copy + Default + PartialEq, const N: usize> HashGrid<V, N> {
    /// Remove every copy of `value` without compacting chains
    ///
    /// Leaves partially filled blocks in the middle of chains; call
    /// [`HashGrid::patch_holes`] once a batch of removals is done.
    pub fn remove_with_holes(&mut self, value: V) {
        let heads: Vec<u32> = self.cells.values().map(|chain| chain.head).collect();
        for head in heads {
            let mut next = Some(head);
            while let Some(index) = next {
                let block = &mut self.blocks[index as usize];
                self.entries -= block.remove(value);
                next = block.next();
            }
        }
    }

    /// Compact every chain so only its last block may be partially filled
    ///
    /// Cells left without entries are dropped. Blocks unlinked here stay in the
    /// arena until the next [`HashGrid::clear`].
    pub fn patch_holes(&mut self) {
        let Self { cells, blocks, .. } = self;

        for chain in cells.values_mut() {
            let mut current = chain.head;
            while let Some(next) = blocks[current as usize].next() {
                let source = blocks[next as usize];
                let moved = blocks[current as usize].fill_from(&source);
                blocks[next as usize].remove_front(moved);

                if blocks[next as usize].is_empty() {
                    // Skip the emptied block and retry filling from its successor
                    let after = blocks[next as usize].next();
                    blocks[current as usize].set_next(after);
                } else {
                    current = next;
                }
            }
            chain.tail = current;
        }

        cells.retain(|_, chain| !blocks[chain.head as usize].is_empty());
    }
}

impl<V: Copy + Default + Send + Sync, const N: usize> SpatialQuery<V> for HashGrid<V, N> {
    fn insert(&mut self, value: V, bounds: &Rect) {
        self.insert_rect(value, bounds);
    }

    fn query(&self, bounds: &Rect, out: &mut Vec<V>) {
        self.query_rect(out, bounds);
    }

    fn clear(&mut self) {
        Self::clear(self);
    }

    fn entry_count(&self) -> usize {
        self.len()
    }
}
