//! Pair deduplication and handler dispatch
//!
//! Runs single-threaded after the broad-phase join. Every unique pair produces
//! exactly two callbacks, one per participant, back to back.

use std::collections::HashSet;

use crossbeam::utils::CachePadded;

use crate::ecs::{EntityId, EntityType};
use crate::physics::broad_phase::{ChunkScratch, CollisionPair};
use crate::physics::collision::CollisionInfo;

/// Receives collisions for one entity type
///
/// `info.normal` points from `other` towards `this`.
pub trait CollisionHandler {
    /// Called once per tick for every entity of this type that overlaps another
    fn on_dynamic_collision(&mut self, this: EntityId, other: EntityId, info: &CollisionInfo);
}

impl<F> CollisionHandler for F
where
    F: FnMut(EntityId, EntityId, &CollisionInfo),
{
    fn on_dynamic_collision(&mut self, this: EntityId, other: EntityId, info: &CollisionInfo) {
        self(this, other, info);
    }
}

/// Dense handler table indexed by [`EntityType`]
#[derive(Default)]
pub struct CollisionHandlers {
    handlers: Vec<Option<Box<dyn CollisionHandler>>>,
}

impl CollisionHandlers {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the handler for `entity_type`, returning the one it replaces
    pub fn register<H>(&mut self, entity_type: EntityType, handler: H) -> Option<Box<dyn CollisionHandler>>
    where
        H: CollisionHandler + 'static,
    {
        let index = entity_type.index();
        if index >= self.handlers.len() {
            self.handlers.resize_with(index + 1, || None);
        }
        self.handlers[index].replace(Box::new(handler))
    }

    /// Remove the handler for `entity_type`
    pub fn unregister(&mut self, entity_type: EntityType) -> Option<Box<dyn CollisionHandler>> {
        self.handlers.get_mut(entity_type.index()).and_then(Option::take)
    }

    /// Whether `entity_type` has a handler
    pub fn has_handler(&self, entity_type: EntityType) -> bool {
        matches!(self.handlers.get(entity_type.index()), Some(Some(_)))
    }

    /// Number of installed handlers
    pub fn len(&self) -> usize {
        self.handlers.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether no handler is installed
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke the handler for `entity_type`; returns false when there is none
    pub fn notify(&mut self, entity_type: EntityType, this: EntityId, other: EntityId, info: &CollisionInfo) -> bool {
        match self.handlers.get_mut(entity_type.index()) {
            Some(Some(handler)) => {
                handler.on_dynamic_collision(this, other, info);
                true
            }
            _ => {
                log::trace!("No collision handler for type {}, skipping {this}", entity_type.0);
                false
            }
        }
    }
}

impl std::fmt::Debug for CollisionHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionHandlers").field("registered", &self.len()).finish()
    }
}

/// Counts from one dispatch pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Pairs delivered to handlers
    pub unique_pairs: usize,
    /// Pairs dropped because their key was already seen this tick
    pub duplicate_pairs: usize,
}

/// Merges per-chunk pair lists into a set of unique pairs
#[derive(Debug, Default)]
pub struct PairDispatcher {
    seen: HashSet<u64>,
}

impl PairDispatcher {
    /// Create a dispatcher with an empty key set
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget keys left behind by a pass that did not finish
    pub fn reset(&mut self) {
        self.seen.clear();
    }

    /// Visit each unique pair in chunk order, then clear the set and all chunks
    pub fn for_each_unique<F>(&mut self, chunks: &mut [CachePadded<ChunkScratch>], mut visit: F) -> DispatchStats
    where
        F: FnMut(&CollisionPair),
    {
        let mut stats = DispatchStats::default();
        for chunk in chunks.iter() {
            for pair in &chunk.pairs {
                if self.seen.insert(pair.key()) {
                    visit(pair);
                    stats.unique_pairs += 1;
                } else {
                    stats.duplicate_pairs += 1;
                }
            }
        }

        self.seen.clear();
        for chunk in chunks.iter_mut() {
            chunk.pairs.clear();
        }
        stats
    }

    /// Deliver every unique pair to both participants' handlers
    pub fn dispatch(&mut self, chunks: &mut [CachePadded<ChunkScratch>], handlers: &mut CollisionHandlers) -> DispatchStats {
        self.for_each_unique(chunks, |pair| {
            handlers.notify(pair.type_a, pair.entity_a, pair.entity_b, &pair.info);
            handlers.notify(pair.type_b, pair.entity_b, pair.entity_a, &pair.info.flipped());
        })
    }
}
