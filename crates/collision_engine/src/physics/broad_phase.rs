//! Parallel broad phase over the spatial index
//!
//! The snapshot is split into `worker_threads + 1` contiguous chunks. Each
//! chunk queries the index around its entities, filters candidates by handle
//! order, map and layers, runs the narrow phase and appends hits to its own
//! scratch. The calling thread runs the last chunk itself and the scope join is
//! the only synchronization point.

use std::ops::Range;

use crossbeam::utils::CachePadded;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::core::config::SchedulerConfig;
use crate::ecs::{EntityId, EntityType, MapId};
use crate::foundation::math::Rect;
use crate::physics::collision::{CollisionInfo, WorldSpaceShape};
use crate::physics::collision_layers::CollisionLayers;
use crate::physics::CollisionError;
use crate::spatial::SpatialQuery;

/// An entity resolved into world space for this tick
#[derive(Debug, Clone, Copy)]
pub struct ResolvedEntity {
    /// Entity handle
    pub id: EntityId,
    /// Type tag for handler lookup
    pub entity_type: EntityType,
    /// Map the entity lives on
    pub map: MapId,
    /// Layers the entity is on
    pub layers: CollisionLayers,
    /// World-space shape
    pub shape: WorldSpaceShape,
    /// Bounding rectangle of `shape`
    pub bounds: Rect,
    /// Degenerate shape or empty layer set; never collides
    pub inert: bool,
}

impl ResolvedEntity {
    /// Whether the pair passes the cheap filters ahead of the narrow phase
    #[inline]
    pub fn can_collide_with(&self, other: &Self) -> bool {
        !self.inert && !other.inert && self.map == other.map && self.layers.should_collide(other.layers)
    }
}

/// A confirmed overlap; `entity_a < entity_b` always holds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionPair {
    /// Lower handle
    pub entity_a: EntityId,
    /// Type of `entity_a`
    pub type_a: EntityType,
    /// Higher handle
    pub entity_b: EntityId,
    /// Type of `entity_b`
    pub type_b: EntityType,
    /// Penetration with the normal pointing from B to A
    pub info: CollisionInfo,
}

impl CollisionPair {
    /// Build a pair from two entities in canonical order
    pub(crate) fn new(a: &ResolvedEntity, b: &ResolvedEntity, info: CollisionInfo) -> Self {
        debug_assert!(a.id < b.id, "pairs are stored lower handle first");
        Self {
            entity_a: a.id,
            type_a: a.entity_type,
            entity_b: b.id,
            type_b: b.entity_type,
            info,
        }
    }

    /// Canonical 64-bit key, lower handle in the high half
    #[inline]
    pub fn key(&self) -> u64 {
        (u64::from(self.entity_a.id()) << 32) | u64::from(self.entity_b.id())
    }
}

/// Scratch owned by exactly one chunk during the parallel phase
#[derive(Debug, Default)]
pub struct ChunkScratch {
    pub(crate) collector: Vec<u32>,
    pub(crate) pairs: Vec<CollisionPair>,
}

impl ChunkScratch {
    /// Pairs found by this chunk during the current tick
    pub fn pairs(&self) -> &[CollisionPair] {
        &self.pairs
    }
}

/// Split `len` items into `parts` contiguous ranges; the last absorbs the remainder
pub fn partition(len: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.max(1);
    let size = len / parts;
    (0..parts)
        .map(|i| {
            let start = i * size;
            let end = if i + 1 == parts { len } else { start + size };
            start..end
        })
        .collect()
}

/// Scan one chunk of the snapshot against the index
pub fn scan_chunk<S: SpatialQuery<u32>>(
    index: &S,
    entities: &[ResolvedEntity],
    range: Range<usize>,
    scratch: &mut ChunkScratch,
) {
    let ChunkScratch { collector, pairs } = scratch;

    for entity in &entities[range] {
        if entity.inert {
            continue;
        }

        collector.clear();
        index.query(&entity.bounds, collector);
        collector.sort_unstable();
        collector.dedup();

        for &candidate in collector.iter() {
            let other = &entities[candidate as usize];
            if other.id <= entity.id || !entity.can_collide_with(other) {
                continue;
            }
            let info = entity.shape.intersect(&other.shape);
            if info.is_colliding() {
                pairs.push(CollisionPair::new(entity, other, info));
            }
        }
    }
}

/// Fixed worker pool plus per-chunk scratch
pub struct BroadPhase {
    pool: Option<ThreadPool>,
    chunks: Vec<CachePadded<ChunkScratch>>,
    small_n_threshold: usize,
}

impl BroadPhase {
    /// Create the worker pool described by `config`
    pub fn new(config: &SchedulerConfig) -> Result<Self, CollisionError> {
        let pool = if config.worker_threads > 0 {
            let pool = ThreadPoolBuilder::new()
                .num_threads(config.worker_threads)
                .thread_name(|i| format!("collision-worker-{i}"))
                .build()
                .map_err(|e| CollisionError::ThreadPool(e.to_string()))?;
            Some(pool)
        } else {
            None
        };

        let chunks = (0..config.parts()).map(|_| CachePadded::new(ChunkScratch::default())).collect();

        Ok(Self {
            pool,
            chunks,
            small_n_threshold: config.small_n_threshold,
        })
    }

    /// Number of chunks the snapshot is split into
    pub fn parts(&self) -> usize {
        self.chunks.len()
    }

    /// Whether a snapshot of `len` entities would be scanned in parallel
    pub fn runs_parallel(&self, len: usize) -> bool {
        self.pool.is_some() && len >= self.small_n_threshold
    }

    /// Scan the whole snapshot; returns whether the worker pool was used
    ///
    /// Pairs left over from an earlier run that was never dispatched are
    /// discarded first. A panic inside any chunk propagates to the caller
    /// after the join.
    pub fn run<S: SpatialQuery<u32>>(&mut self, index: &S, entities: &[ResolvedEntity]) -> bool {
        for chunk in &mut self.chunks {
            chunk.pairs.clear();
        }

        let parallel = self.runs_parallel(entities.len());
        let Some((last, rest)) = self.chunks.split_last_mut() else {
            return false;
        };

        match &self.pool {
            Some(pool) if parallel => {
                let ranges = partition(entities.len(), rest.len() + 1);
                pool.in_place_scope(|scope| {
                    for (scratch, range) in rest.iter_mut().zip(ranges.iter().cloned()) {
                        scope.spawn(move |_| scan_chunk(index, entities, range, scratch));
                    }
                    if let Some(range) = ranges.last() {
                        scan_chunk(index, entities, range.clone(), last);
                    }
                });
            }
            _ => scan_chunk(index, entities, 0..entities.len(), last),
        }
        parallel
    }

    /// Per-chunk scratch, handed to the dispatcher after [`BroadPhase::run`]
    pub fn chunks_mut(&mut self) -> &mut [CachePadded<ChunkScratch>] {
        &mut self.chunks
    }

    /// Pairs currently held across all chunks, duplicates included
    pub fn pending_pairs(&self) -> usize {
        self.chunks.iter().map(|chunk| chunk.pairs.len()).sum()
    }
}
