//! Fixed-capacity storage blocks chained per grid cell

/// Index value marking the last block of a chain
pub const NO_NEXT_BLOCK: u32 = u32::MAX;

/// Default block capacity; 14 `u32` handles plus count and next fill one 64-byte line
pub const DEFAULT_BLOCK_CAPACITY: usize = 14;

/// A fixed-size run of values linked to the next block by arena index
///
/// Invariants: `count <= N`, and `next == NO_NEXT_BLOCK` iff this is the last
/// block of its chain.
#[derive(Debug, Clone, Copy)]
#[repr(C, align(64))]
pub struct DataBlock<V, const N: usize> {
    values: [V; N],
    count: u32,
    next: u32,
}

impl<V: Copy + Default, const N: usize> Default for DataBlock<V, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Copy + Default, const N: usize> DataBlock<V, N> {
    /// Empty block with no successor
    pub fn new() -> Self {
        Self {
            values: [V::default(); N],
            count: 0,
            next: NO_NEXT_BLOCK,
        }
    }

    /// Block holding a single value
    pub fn with_value(value: V) -> Self {
        let mut block = Self::new();
        block.values[0] = value;
        block.count = 1;
        block
    }

    /// Append a value; returns `false` when the block is full
    #[inline]
    pub fn push(&mut self, value: V) -> bool {
        let count = self.count as usize;
        if count >= N {
            return false;
        }
        self.values[count] = value;
        self.count += 1;
        true
    }

    /// Stored values
    #[inline]
    pub fn as_slice(&self) -> &[V] {
        &self.values[..self.count as usize]
    }

    /// Number of stored values
    #[inline]
    pub const fn len(&self) -> usize {
        self.count as usize
    }

    /// Whether no values are stored
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether another push would fail
    #[inline]
    pub const fn is_full(&self) -> bool {
        self.count as usize >= N
    }

    /// Arena index of the next block in the chain
    #[inline]
    pub const fn next(&self) -> Option<u32> {
        if self.next == NO_NEXT_BLOCK {
            None
        } else {
            Some(self.next)
        }
    }

    /// Link this block to a successor or terminate the chain
    #[inline]
    pub fn set_next(&mut self, next: Option<u32>) {
        self.next = next.unwrap_or(NO_NEXT_BLOCK);
    }

    /// Drop the first `n` values, shifting the rest to the front
    pub fn remove_front(&mut self, n: usize) {
        let count = self.count as usize;
        let n = n.min(count);
        self.values.copy_within(n..count, 0);
        self.count = (count - n) as u32;
    }

    /// Move values from the front of `other` into the free slots of `self`
    ///
    /// Returns how many values moved.
    pub fn fill_from(&mut self, other: &Self) -> usize {
        let count = self.count as usize;
        let moved = (N - count).min(other.len());
        self.values[count..count + moved].copy_from_slice(&other.as_slice()[..moved]);
        self.count += moved as u32;
        moved
    }
}

impl<V: Copy + Default + PartialEq, const N: usize> DataBlock<V, N> {
    /// Remove every copy of `value`, keeping the order of the rest
    ///
    /// Returns how many values were removed.
    pub fn remove(&mut self, value: V) -> usize {
        let count = self.count as usize;
        let mut kept = 0;
        for i in 0..count {
            if self.values[i] != value {
                self.values[kept] = self.values[i];
                kept += 1;
            }
        }
        self.count = kept as u32;
        count - kept
    }
}
