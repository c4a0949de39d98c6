//! Whole-pipeline checks against independent reference searches

use std::collections::BTreeSet;

use collision_engine::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const PLAYER_ID: u32 = 1_000_000;

fn random_collider(rng: &mut StdRng) -> ColliderComponent {
    let collider = match rng.gen_range(0..4) {
        0 => ColliderComponent::rect(rng.gen_range(2.0..14.0), rng.gen_range(2.0..14.0)),
        1 => ColliderComponent::circle(rng.gen_range(1.0..8.0)),
        2 => {
            let radius = rng.gen_range(1.0..5.0);
            ColliderComponent::capsule(radius, radius * 2.0 + rng.gen_range(0.0..10.0))
        }
        _ => ColliderComponent::triangle(
            Vec2::new(rng.gen_range(3.0..12.0), rng.gen_range(-2.0..2.0)),
            Vec2::new(rng.gen_range(-2.0..6.0), rng.gen_range(3.0..12.0)),
        ),
    };

    let layers = match rng.gen_range(0..5) {
        0 => CollisionLayers::ENEMY,
        1 => CollisionLayers::PROJECTILE,
        2 => CollisionLayers::DEFAULT | CollisionLayers::ENEMY,
        _ => CollisionLayers::DEFAULT,
    };
    collider.with_layers(layers)
}

fn random_world(seed: u64, count: u32, extent: f32) -> Vec<CollisionEntity> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut entities: Vec<CollisionEntity> = (0..count)
        .map(|i| {
            let mut position =
                PositionComponent::new(rng.gen_range(0.0..extent), rng.gen_range(0.0..extent), EntityType(rng.gen_range(0..3)));
            if rng.gen_bool(0.3) {
                position = position.with_rotation(rng.gen_range(0.0..360.0));
            }
            if rng.gen_bool(0.1) {
                position = position.with_map(MapId(1));
            }
            // Handles are unrelated to snapshot order
            CollisionEntity::new(EntityId::new(count * 3 - i * 3), position, random_collider(&mut rng))
        })
        .collect();

    let center = extent / 2.0;
    entities.push(CollisionEntity::new(
        EntityId::new(PLAYER_ID),
        PositionComponent::new(center - 40.0, center - 40.0, EntityType(3)),
        ColliderComponent::circle(40.0).with_layers(CollisionLayers::PLAYER | CollisionLayers::DEFAULT | CollisionLayers::ENEMY),
    ));
    entities
}

struct Resolved {
    id: EntityId,
    map: MapId,
    layers: CollisionLayers,
    shape: WorldSpaceShape,
    bounds: Rect,
}

fn resolve(entities: &[CollisionEntity]) -> Vec<Resolved> {
    entities
        .iter()
        .map(|e| {
            let shape = WorldSpaceShape::from_components(&e.position, &e.collider);
            Resolved { id: e.id, map: e.position.map, layers: e.collider.layers, shape, bounds: shape.bounds() }
        })
        .filter(|r| !r.shape.is_degenerate() && !r.layers.is_empty())
        .collect()
}

fn confirmed_key(a: &Resolved, b: &Resolved) -> Option<u64> {
    if a.map != b.map || !a.layers.should_collide(b.layers) {
        return None;
    }
    let (lo, hi) = if a.id < b.id { (a, b) } else { (b, a) };
    lo.shape
        .intersect(&hi.shape)
        .is_colliding()
        .then(|| (u64::from(lo.id.id()) << 32) | u64::from(hi.id.id()))
}

/// Sort by left edge and sweep along x
fn sort_and_sweep(entities: &[CollisionEntity]) -> BTreeSet<u64> {
    let mut resolved = resolve(entities);
    resolved.sort_by(|a, b| a.bounds.x.total_cmp(&b.bounds.x));

    let mut keys = BTreeSet::new();
    for (i, a) in resolved.iter().enumerate() {
        let right = a.bounds.x + a.bounds.width;
        for b in resolved[i + 1..].iter().take_while(|b| b.bounds.x <= right) {
            if let Some(key) = confirmed_key(a, b) {
                keys.insert(key);
            }
        }
    }
    keys
}

fn brute_force(entities: &[CollisionEntity]) -> BTreeSet<u64> {
    let resolved = resolve(entities);
    let mut keys = BTreeSet::new();
    for (i, a) in resolved.iter().enumerate() {
        for b in &resolved[i + 1..] {
            if let Some(key) = confirmed_key(a, b) {
                keys.insert(key);
            }
        }
    }
    keys
}

fn world(workers: usize) -> CollisionWorld {
    let config = CollisionConfig::new()
        .with_grid(GridConfig::default().with_cell_size(32.0))
        .with_scheduler(SchedulerConfig::default().with_worker_threads(workers).with_small_n_threshold(500));
    CollisionWorld::new(config).unwrap()
}

fn detected_keys(world: &mut CollisionWorld, entities: &[CollisionEntity]) -> BTreeSet<u64> {
    let pairs = world.detect_pairs(entities);
    let keys: BTreeSet<u64> = pairs.iter().map(CollisionPair::key).collect();
    assert_eq!(keys.len(), pairs.len(), "duplicate pair delivered");
    for pair in &pairs {
        assert!(pair.entity_a < pair.entity_b, "pair not in canonical order");
    }
    keys
}

#[test]
fn fifty_thousand_entities_match_sort_and_sweep() {
    let entities = random_world(7, 50_000, 4000.0);
    let expected = sort_and_sweep(&entities);
    assert!(expected.len() > 100, "world too sparse to be meaningful");

    let mut world = world(3);
    let actual = detected_keys(&mut world, &entities);
    assert_eq!(actual.len(), expected.len());
    assert_eq!(actual, expected);

    // Everything the player overlaps must be reported
    let player_hits = expected.iter().filter(|&&key| key & 0xFFFF_FFFF == u64::from(PLAYER_ID)).count();
    let reported = actual.iter().filter(|&&key| key & 0xFFFF_FFFF == u64::from(PLAYER_ID)).count();
    assert_eq!(player_hits, reported);
}

#[test]
fn dense_world_matches_brute_force() {
    let entities = random_world(11, 2_000, 600.0);
    let expected = brute_force(&entities);
    assert!(!expected.is_empty());

    let mut serial = world(0);
    assert_eq!(detected_keys(&mut serial, &entities), expected);

    let mut parallel = world(4);
    assert_eq!(detected_keys(&mut parallel, &entities), expected);
}

#[test]
fn results_do_not_depend_on_worker_count() {
    let entities = random_world(23, 5_000, 1200.0);

    let mut baseline = world(0).detect_pairs(&entities);
    baseline.sort_by_key(CollisionPair::key);

    for workers in [1, 2, 5, 8] {
        let mut pairs = world(workers).detect_pairs(&entities);
        pairs.sort_by_key(CollisionPair::key);
        assert_eq!(pairs, baseline, "{workers} workers diverged");
    }
}

#[test]
fn handlers_receive_every_pair_from_both_sides() {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    let entities = random_world(5, 3_000, 800.0);
    let expected = brute_force(&entities);

    let seen: Rc<RefCell<HashMap<(u32, u32), usize>>> = Rc::default();
    let mut handlers = CollisionHandlers::new();
    for entity_type in 0..4 {
        let seen = Rc::clone(&seen);
        handlers.register(EntityType(entity_type), move |this: EntityId, other: EntityId, _: &CollisionInfo| {
            assert_ne!(this, other);
            *seen.borrow_mut().entry((this.id(), other.id())).or_default() += 1;
        });
    }

    let mut world = world(2);
    let stats = world.tick(&entities, &mut handlers);
    assert_eq!(stats.unique_pairs, expected.len());
    assert_eq!(stats.entities, entities.len());

    let seen = seen.borrow();
    assert_eq!(seen.len(), expected.len() * 2);
    for key in &expected {
        let a = (key >> 32) as u32;
        let b = (key & 0xFFFF_FFFF) as u32;
        assert_eq!(seen.get(&(a, b)), Some(&1));
        assert_eq!(seen.get(&(b, a)), Some(&1));
    }
}

#[test]
fn moving_world_stays_consistent_across_ticks() {
    let mut entities = random_world(3, 4_000, 1000.0);
    let mut rng = StdRng::seed_from_u64(99);
    let mut world = world(3);

    for _ in 0..5 {
        for entity in &mut entities {
            entity.position.x += rng.gen_range(-6.0..6.0);
            entity.position.y += rng.gen_range(-6.0..6.0);
        }
        assert_eq!(detected_keys(&mut world, &entities), sort_and_sweep(&entities));
    }
}

fn shifted(entities: &[CollisionEntity], dx: f32, dy: f32) -> Vec<CollisionEntity> {
    entities
        .iter()
        .map(|e| {
            let mut e = *e;
            e.position.x += dx;
            e.position.y += dy;
            e
        })
        .collect()
}

#[test]
fn shifted_world_matches_brute_force() {
    let entities = random_world(17, 2_000, 600.0);

    for (dx, dy) in [(-50_000.0, -50_000.0), (100_000.0, -100_000.0)] {
        let moved = shifted(&entities, dx, dy);
        let expected = brute_force(&moved);
        assert!(expected.len() > 50, "world at ({dx}, {dy}) too sparse");

        let mut serial = world(0);
        assert_eq!(detected_keys(&mut serial, &moved), expected, "serial at ({dx}, {dy})");

        let mut parallel = world(3);
        assert_eq!(detected_keys(&mut parallel, &moved), expected, "parallel at ({dx}, {dy})");
    }
}

/// Grid wrapper whose queries fail past a given x
struct FailingIndex {
    grid: collision_engine::spatial::HashGrid<u32>,
    fail_past: f32,
}

impl collision_engine::spatial::SpatialQuery<u32> for FailingIndex {
    fn insert(&mut self, value: u32, bounds: &Rect) {
        self.grid.insert_rect(value, bounds);
    }

    fn query(&self, bounds: &Rect, out: &mut Vec<u32>) {
        assert!(bounds.x < self.fail_past, "query failed at x = {}", bounds.x);
        self.grid.query_rect(out, bounds);
    }

    fn clear(&mut self) {
        self.grid.clear();
    }

    fn entry_count(&self) -> usize {
        self.grid.len()
    }
}

#[test]
#[should_panic(expected = "query failed")]
fn panic_in_worker_chunk_reaches_caller() {
    use collision_engine::physics::broad_phase::{BroadPhase, ResolvedEntity};
    use collision_engine::spatial::SpatialQuery;

    // Sorted by x so only the first worker's chunk reaches the failing region
    let mut entities: Vec<ResolvedEntity> = (0..400u32)
        .map(|i| {
            let position = PositionComponent::new(i as f32 * 5.0, 0.0, EntityType(0));
            let collider = ColliderComponent::rect(8.0, 8.0);
            let shape = WorldSpaceShape::from_components(&position, &collider);
            ResolvedEntity {
                id: EntityId::new(i),
                entity_type: position.entity_type,
                map: position.map,
                layers: collider.layers,
                shape,
                bounds: shape.bounds(),
                inert: false,
            }
        })
        .collect();
    entities.reverse();

    let mut index = FailingIndex { grid: collision_engine::spatial::HashGrid::new(32.0), fail_past: 1900.0 };
    for (i, entity) in entities.iter().enumerate() {
        index.insert(i as u32, &entity.bounds);
    }

    let config = SchedulerConfig::default().with_worker_threads(3).with_small_n_threshold(0);
    let mut broad = BroadPhase::new(&config).unwrap();
    broad.run(&index, &entities);
}

#[test]
#[should_panic(expected = "handler failure")]
fn panic_in_handler_reaches_tick_caller() {
    let entities = random_world(29, 1_000, 300.0);
    let mut handlers = CollisionHandlers::new();
    for entity_type in 0..4 {
        handlers.register(EntityType(entity_type), |_: EntityId, _: EntityId, _: &CollisionInfo| {
            panic!("handler failure");
        });
    }
    world(2).tick(&entities, &mut handlers);
}
