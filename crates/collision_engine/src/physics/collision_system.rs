//! Collision world: one tick of build, broad phase, narrow phase and dispatch
//!
//! The world owns every buffer the pipeline needs, so steady-state ticks do not
//! allocate. Each tick:
//!
//! 1. Clears the grid and resolves every entity into world space
//! 2. Inserts non-inert entities into the grid (single-threaded)
//! 3. Scans chunks of the snapshot in parallel against the grid
//! 4. Deduplicates the confirmed pairs and calls both handlers per pair
//!
//! The grid stays populated between ticks so overlays and [`CollisionWorld::query_rect`]
//! can read the last state.

use std::path::Path;
use std::time::Duration;

use crate::config::Config;
use crate::core::config::CollisionConfig;
use crate::ecs::{CollisionEntity, EntityId};
use crate::foundation::math::Rect;
use crate::foundation::time::Stopwatch;
use crate::physics::broad_phase::{BroadPhase, CollisionPair, ResolvedEntity};
use crate::physics::collision::WorldSpaceShape;
use crate::physics::pair_dispatch::{CollisionHandlers, PairDispatcher};
use crate::physics::CollisionError;
use crate::spatial::HashGrid;

/// Counters and phase timings for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickStats {
    /// Entities in the snapshot
    pub entities: usize,
    /// Entities skipped because they are degenerate or have no layers
    pub inert_entities: usize,
    /// Occupied grid cells
    pub occupied_cells: usize,
    /// Grid blocks in use
    pub blocks: usize,
    /// Grid entries; an entity spanning k cells counts k times
    pub grid_entries: usize,
    /// Insertions discarded under the drop overflow policy
    pub dropped_insertions: usize,
    /// Confirmed pairs found by the broad phase before deduplication
    pub candidate_pairs: usize,
    /// Unique pairs delivered
    pub unique_pairs: usize,
    /// Whether the worker pool was used
    pub parallel: bool,
    /// Time spent resolving shapes and filling the grid
    pub build_time: Duration,
    /// Time spent in the broad and narrow phase
    pub broad_phase_time: Duration,
    /// Time spent deduplicating and calling handlers
    pub dispatch_time: Duration,
}

impl TickStats {
    /// Total time across all phases
    pub fn total_time(&self) -> Duration {
        self.build_time + self.broad_phase_time + self.dispatch_time
    }
}

/// Owns the grid, the worker pool and all per-tick scratch
pub struct CollisionWorld {
    config: CollisionConfig,
    grid: HashGrid<u32>,
    resolved: Vec<ResolvedEntity>,
    broad_phase: BroadPhase,
    dispatcher: PairDispatcher,
    tick_count: u64,
}

impl CollisionWorld {
    /// Validate `config` and spin up the worker pool
    pub fn new(config: CollisionConfig) -> Result<Self, CollisionError> {
        config.validate().map_err(CollisionError::InvalidConfig)?;

        let broad_phase = BroadPhase::new(&config.scheduler)?;
        let grid = HashGrid::from_config(&config.grid);

        log::info!(
            "Collision world ready: cell size {}, {:?} overflow, {} worker threads, small-N threshold {}",
            config.grid.cell_size,
            config.grid.overflow_policy,
            config.scheduler.worker_threads,
            config.scheduler.small_n_threshold
        );

        Ok(Self {
            config,
            grid,
            resolved: Vec::new(),
            broad_phase,
            dispatcher: PairDispatcher::new(),
            tick_count: 0,
        })
    }

    /// Load a TOML or RON configuration file and build a world from it
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, CollisionError> {
        let config = CollisionConfig::load_from_file(path)?;
        Self::new(config)
    }

    /// Active configuration
    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Grid as built by the last tick
    pub fn grid(&self) -> &HashGrid<u32> {
        &self.grid
    }

    /// World-space snapshot from the last tick, in input order
    pub fn resolved(&self) -> &[ResolvedEntity] {
        &self.resolved
    }

    /// Ticks run so far
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Run one full collision pass and call handlers for every overlapping pair
    ///
    /// Each unique pair `(A, B)` calls A's type handler with `(A, B, info)` and
    /// then B's type handler with `(B, A, info.flipped())`.
    pub fn tick(&mut self, entities: &[CollisionEntity], handlers: &mut CollisionHandlers) -> TickStats {
        let mut stopwatch = Stopwatch::start_new();
        let mut stats = self.detect(entities, &mut stopwatch);

        let dispatch = self.dispatcher.dispatch(self.broad_phase.chunks_mut(), handlers);
        stats.unique_pairs = dispatch.unique_pairs;
        stats.dispatch_time = stopwatch.lap();

        self.report(&stats);
        stats
    }

    /// Run the same pass but return the unique pairs instead of dispatching them
    pub fn detect_pairs(&mut self, entities: &[CollisionEntity]) -> Vec<CollisionPair> {
        let mut stopwatch = Stopwatch::start_new();
        let mut stats = self.detect(entities, &mut stopwatch);

        let mut pairs = Vec::with_capacity(stats.candidate_pairs);
        let dispatch = self.dispatcher.for_each_unique(self.broad_phase.chunks_mut(), |pair| pairs.push(*pair));
        stats.unique_pairs = dispatch.unique_pairs;
        stats.dispatch_time = stopwatch.lap();

        self.report(&stats);
        pairs
    }

    /// Handles whose shape overlaps `rect`, from the grid of the last tick
    pub fn query_rect(&self, rect: &Rect, out: &mut Vec<EntityId>) {
        let mut candidates: Vec<u32> = Vec::new();
        self.grid.query_rect(&mut candidates, rect);
        candidates.sort_unstable();
        candidates.dedup();

        let area = WorldSpaceShape::Aabb(*rect);
        out.extend(
            candidates
                .into_iter()
                .map(|index| &self.resolved[index as usize])
                .filter(|entity| entity.shape.overlaps(&area))
                .map(|entity| entity.id),
        );
    }

    /// Drop the last snapshot and grid contents, keeping capacity
    pub fn clear(&mut self) {
        self.grid.clear();
        self.resolved.clear();
    }

    fn detect(&mut self, entities: &[CollisionEntity], stopwatch: &mut Stopwatch) -> TickStats {
        // A handler that panicked mid-dispatch leaves keys behind
        self.dispatcher.reset();

        let inert_entities = self.build(entities);
        let build_time = stopwatch.lap();

        let parallel = self.broad_phase.run(&self.grid, &self.resolved);
        let candidate_pairs = self.broad_phase.pending_pairs();
        let broad_phase_time = stopwatch.lap();

        TickStats {
            entities: entities.len(),
            inert_entities,
            occupied_cells: self.grid.cell_count(),
            blocks: self.grid.block_count(),
            grid_entries: self.grid.len(),
            dropped_insertions: self.grid.dropped_insertions(),
            candidate_pairs,
            parallel,
            build_time,
            broad_phase_time,
            ..TickStats::default()
        }
    }

    /// Resolve the snapshot and fill the grid; returns the inert count
    fn build(&mut self, entities: &[CollisionEntity]) -> usize {
        debug_assert!(u32::try_from(entities.len()).is_ok(), "snapshot exceeds u32 indices");

        self.grid.clear();
        self.resolved.clear();
        self.resolved.reserve(entities.len());

        let mut inert_count = 0;
        for entity in entities {
            if cfg!(debug_assertions) {
                if let Err(err) = entity.collider.validate() {
                    log::error!("Invalid collider on {}: {err}", entity.id);
                    panic!("invalid collider on {}: {err}", entity.id);
                }
            }

            let shape = WorldSpaceShape::from_components(&entity.position, &entity.collider);
            let bounds = shape.bounds();
            let inert = entity.collider.layers.is_empty() || shape.is_degenerate();
            let index = self.resolved.len() as u32;

            if inert {
                inert_count += 1;
            } else {
                self.grid.insert_rect(index, &bounds);
            }

            self.resolved.push(ResolvedEntity {
                id: entity.id,
                entity_type: entity.position.entity_type,
                map: entity.position.map,
                layers: entity.collider.layers,
                shape,
                bounds,
                inert,
            });
        }
        inert_count
    }

    fn report(&mut self, stats: &TickStats) {
        self.tick_count += 1;

        if stats.dropped_insertions > 0 {
            log::warn!(
                "Tick {}: {} grid insertions dropped by full cells",
                self.tick_count,
                stats.dropped_insertions
            );
        }

        log::debug!(
            "Tick {}: {} entities, {} cells, {} blocks, {} pairs ({} candidates), {} | build {:.3}ms, broad {:.3}ms, dispatch {:.3}ms",
            self.tick_count,
            stats.entities,
            stats.occupied_cells,
            stats.blocks,
            stats.unique_pairs,
            stats.candidate_pairs,
            if stats.parallel { "parallel" } else { "serial" },
            stats.build_time.as_secs_f64() * 1000.0,
            stats.broad_phase_time.as_secs_f64() * 1000.0,
            stats.dispatch_time.as_secs_f64() * 1000.0,
        );
    }
}

impl std::fmt::Debug for CollisionWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionWorld")
            .field("config", &self.config)
            .field("entities", &self.resolved.len())
            .field("tick_count", &self.tick_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{GridConfig, OverflowPolicy, SchedulerConfig};
    use crate::ecs::{ColliderComponent, EntityType, MapId, PositionComponent};
    use crate::foundation::math::Vec2;
    use crate::physics::collision::CollisionInfo;
    use crate::physics::collision_layers::CollisionLayers;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn serial_world() -> CollisionWorld {
        let config = CollisionConfig::new().with_scheduler(SchedulerConfig::default().with_worker_threads(0));
        CollisionWorld::new(config).unwrap()
    }

    fn entity(id: u32, x: f32, y: f32, collider: ColliderComponent) -> CollisionEntity {
        CollisionEntity::new(EntityId::new(id), PositionComponent::new(x, y, EntityType(0)), collider)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CollisionConfig::new().with_grid(GridConfig::default().with_cell_size(0.0));
        assert!(matches!(CollisionWorld::new(config), Err(CollisionError::InvalidConfig(_))));
    }

    #[test]
    fn test_overlapping_rects_depth() {
        let mut world = serial_world();
        let pairs = world.detect_pairs(&[
            entity(1, 0.0, 0.0, ColliderComponent::rect(10.0, 10.0)),
            entity(2, 5.0, 5.0, ColliderComponent::rect(10.0, 10.0)),
        ]);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].entity_a, EntityId::new(1));
        assert_eq!(pairs[0].entity_b, EntityId::new(2));
        assert_relative_eq!(pairs[0].info.penetration_depth, 5.0);
    }

    #[test]
    fn test_separated_circles() {
        let mut world = serial_world();
        let pairs = world.detect_pairs(&[
            entity(1, 0.0, 0.0, ColliderComponent::circle(5.0)),
            entity(2, 12.0, 0.0, ColliderComponent::circle(5.0)),
        ]);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_map_and_layer_filters() {
        let mut world = serial_world();
        let mut on_other_map = entity(2, 2.0, 2.0, ColliderComponent::rect(10.0, 10.0));
        on_other_map.position = on_other_map.position.with_map(MapId(3));

        let pairs = world.detect_pairs(&[
            entity(1, 0.0, 0.0, ColliderComponent::rect(10.0, 10.0).with_layers(CollisionLayers::PLAYER)),
            on_other_map,
            entity(3, 2.0, 2.0, ColliderComponent::rect(10.0, 10.0).with_layers(CollisionLayers::ENEMY)),
            entity(4, 2.0, 2.0, ColliderComponent::rect(10.0, 10.0).with_layers(CollisionLayers::PLAYER | CollisionLayers::ENEMY)),
        ]);
        let mut keys: Vec<(u32, u32)> = pairs.iter().map(|p| (p.entity_a.id(), p.entity_b.id())).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec![(1, 4), (3, 4)]);
    }

    #[test]
    fn test_degenerate_entities_are_inert() {
        let mut world = serial_world();
        let mut handlers = CollisionHandlers::new();
        let stats = world.tick(
            &[
                entity(1, 0.0, 0.0, ColliderComponent::rect(10.0, 10.0)),
                entity(2, 0.0, 0.0, ColliderComponent::rect(0.0, 10.0)),
                entity(3, 0.0, 0.0, ColliderComponent::circle(0.0)),
            ],
            &mut handlers,
        );
        assert_eq!(stats.inert_entities, 2);
        assert_eq!(stats.unique_pairs, 0);
    }

    #[test]
    fn test_tick_calls_both_handlers() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut handlers = CollisionHandlers::new();
        for entity_type in [EntityType(0), EntityType(1)] {
            let calls = Rc::clone(&calls);
            handlers.register(entity_type, move |this: EntityId, other: EntityId, info: &CollisionInfo| {
                calls.borrow_mut().push((entity_type, this, other, info.normal));
            });
        }

        let player = CollisionEntity::new(
            EntityId::new(7),
            PositionComponent::new(0.0, 0.0, EntityType(1)),
            ColliderComponent::circle(5.0),
        );
        let rock = entity(3, 8.0, 0.0, ColliderComponent::rect(10.0, 10.0));

        let mut world = serial_world();
        let stats = world.tick(&[player, rock], &mut handlers);
        assert_eq!(stats.unique_pairs, 1);

        let calls = calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!((calls[0].0, calls[0].1, calls[0].2), (EntityType(0), EntityId::new(3), EntityId::new(7)));
        assert_eq!((calls[1].0, calls[1].1, calls[1].2), (EntityType(1), EntityId::new(7), EntityId::new(3)));
        assert_relative_eq!(calls[0].3.x, -calls[1].3.x);
        assert_relative_eq!(calls[0].3.y, -calls[1].3.y);
        // The rock sits to the right of the circle
        assert!(calls[0].3.x > 0.0);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let entities: Vec<CollisionEntity> = (0..1200u32)
            .map(|i| {
                let x = (i % 40) as f32 * 9.0;
                let y = (i / 40) as f32 * 9.0;
                let collider = match i % 3 {
                    0 => ColliderComponent::circle(5.0),
                    1 => ColliderComponent::rect(10.0, 6.0),
                    _ => ColliderComponent::capsule(3.0, 12.0),
                };
                let mut e = entity(i * 7 % 1201, x, y, collider);
                e.position = e.position.with_rotation((i % 8) as f32 * 15.0);
                e
            })
            .collect();

        let mut serial = serial_world();
        let mut expected: Vec<u64> = serial.detect_pairs(&entities).iter().map(CollisionPair::key).collect();
        expected.sort_unstable();
        assert!(!expected.is_empty());

        let config = CollisionConfig::new().with_scheduler(
            SchedulerConfig::default().with_worker_threads(3).with_small_n_threshold(100),
        );
        let mut parallel = CollisionWorld::new(config).unwrap();
        let mut actual: Vec<u64> = parallel.detect_pairs(&entities).iter().map(CollisionPair::key).collect();
        actual.sort_unstable();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_drop_policy_reports_dropped() {
        let config = CollisionConfig::new()
            .with_grid(GridConfig::default().with_cell_size(100.0).with_overflow_policy(OverflowPolicy::Drop))
            .with_scheduler(SchedulerConfig::default().with_worker_threads(0));
        let mut world = CollisionWorld::new(config).unwrap();

        let entities: Vec<CollisionEntity> =
            (0..20).map(|i| entity(i, 10.0 + i as f32, 10.0, ColliderComponent::rect(2.0, 2.0))).collect();
        let stats = world.tick(&entities, &mut CollisionHandlers::new());
        assert_eq!(stats.grid_entries, 14);
        assert_eq!(stats.dropped_insertions, 6);
        assert_eq!(stats.occupied_cells, 1);
        assert_eq!(stats.blocks, 1);
    }

    #[test]
    fn test_grid_persists_until_next_tick() {
        let mut world = serial_world();
        let entities = [
            entity(1, 0.0, 0.0, ColliderComponent::circle(5.0)),
            entity(2, 200.0, 200.0, ColliderComponent::rect(10.0, 10.0)),
        ];
        world.tick(&entities, &mut CollisionHandlers::new());
        assert_eq!(world.grid().len(), 2);
        assert_eq!(world.tick_count(), 1);

        let mut found = Vec::new();
        world.query_rect(&Rect::new(195.0, 195.0, 10.0, 10.0), &mut found);
        assert_eq!(found, vec![EntityId::new(2)]);

        // Inside the circle's bounding box but outside the circle
        found.clear();
        world.query_rect(&Rect::new(9.0, 9.0, 2.0, 2.0), &mut found);
        assert!(found.is_empty());

        world.clear();
        assert!(world.grid().is_empty());
    }

    #[test]
    fn test_far_from_origin_triangle_hits_rect() {
        let mut world = serial_world();
        for base in [50_000.0, -100_000.0] {
            let pairs = world.detect_pairs(&[
                entity(1, base, base, ColliderComponent::rect(10.0, 10.0)),
                entity(2, base + 9.0, base + 9.0, ColliderComponent::triangle(Vec2::new(6.0, 0.0), Vec2::new(2.0, 5.0))),
            ]);
            assert_eq!(pairs.len(), 1, "base {base}");
        }
    }

    #[test]
    fn test_cleared_layers_make_entity_inert() {
        let mut collider = ColliderComponent::rect(10.0, 10.0).with_layers(CollisionLayers::PLAYER | CollisionLayers::ENEMY);
        collider.clear_layers();
        assert!(collider.layers.is_empty());

        let mut world = serial_world();
        let stats = world.tick(
            &[entity(1, 0.0, 0.0, ColliderComponent::rect(10.0, 10.0)), entity(2, 2.0, 2.0, collider)],
            &mut CollisionHandlers::new(),
        );
        assert_eq!(stats.inert_entities, 1);
        assert_eq!(stats.unique_pairs, 0);
        assert_eq!(world.grid().len(), 1);
    }

    #[test]
    fn test_panicking_handler_does_not_leak_into_next_tick() {
        let mut handlers = CollisionHandlers::new();
        handlers.register(EntityType(0), |_this: EntityId, _other: EntityId, _info: &CollisionInfo| {
            panic!("handler failure");
        });

        let mut world = serial_world();
        let first = [
            entity(1, 0.0, 0.0, ColliderComponent::rect(10.0, 10.0)),
            entity(2, 5.0, 5.0, ColliderComponent::rect(10.0, 10.0)),
            entity(5, 8.0, 8.0, ColliderComponent::rect(10.0, 10.0)),
        ];
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| world.tick(&first, &mut handlers)));
        assert!(result.is_err());

        let pairs = world.detect_pairs(&first[..2]);
        assert_eq!(pairs.len(), 1);
        assert_eq!((pairs[0].entity_a, pairs[0].entity_b), (EntityId::new(1), EntityId::new(2)));
        assert!(pairs.iter().all(|p| p.entity_a != EntityId::new(5) && p.entity_b != EntityId::new(5)));
    }

    #[test]
    fn test_world_from_config_file() {
        let config = CollisionConfig::new()
            .with_grid(GridConfig::default().with_cell_size(48.0))
            .with_scheduler(SchedulerConfig::default().with_worker_threads(0));
        let path = std::env::temp_dir().join("collision_world_from_file.toml");
        config.save_to_file(&path).unwrap();

        let world = CollisionWorld::from_config_file(&path).unwrap();
        assert_relative_eq!(world.config().grid.cell_size, 48.0);
        assert_eq!(world.config().scheduler.worker_threads, 0);
        let _ = std::fs::remove_file(&path);

        let missing = std::env::temp_dir().join("collision_world_missing.toml");
        assert!(CollisionWorld::from_config_file(missing).is_err());
    }

    #[test]
    fn test_ticks_reuse_buffers() {
        let mut world = serial_world();
        let entities = [
            entity(1, 0.0, 0.0, ColliderComponent::rect(10.0, 10.0)),
            entity(2, 5.0, 5.0, ColliderComponent::rect(10.0, 10.0)),
        ];
        let mut handlers = CollisionHandlers::new();
        for _ in 0..3 {
            let stats = world.tick(&entities, &mut handlers);
            assert_eq!(stats.unique_pairs, 1);
            assert_eq!(stats.entities, 2);
        }
        assert_eq!(world.tick_count(), 3);
    }
}
