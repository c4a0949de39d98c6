//! Collision stress application
//!
//! Builds a 50k-entity world, moves everything a little every tick and logs
//! how long each phase of the collision pass takes.
//!
//! Usage: `collision_stress [config.toml|config.ron] [ticks]`

use std::cell::RefCell;
use std::rc::Rc;

use collision_engine::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const WORLD_SIZE: f32 = 4000.0;
const ENTITY_COUNT: u32 = 50_000;
const DEFAULT_TICKS: u32 = 300;
const REPORT_INTERVAL: u32 = 30;

const ASTEROID: EntityType = EntityType(0);
const BULLET: EntityType = EntityType(1);
const DEBRIS: EntityType = EntityType(2);
const PLAYER: EntityType = EntityType(3);
const TYPE_NAMES: [&str; 4] = ["asteroid", "bullet", "debris", "player"];

pub struct StressApp {
    world: CollisionWorld,
    entities: Vec<CollisionEntity>,
    velocities: Vec<Vec2>,
    handlers: CollisionHandlers,
    hits: Rc<RefCell<[u64; 4]>>,
    rng: StdRng,
}

impl StressApp {
    pub fn new(world: CollisionWorld) -> Self {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let (entities, velocities) = Self::spawn(&mut rng);
        log::info!("Spawned {} entities over {WORLD_SIZE}x{WORLD_SIZE}", entities.len());

        let hits = Rc::new(RefCell::new([0u64; 4]));
        let mut handlers = CollisionHandlers::new();
        for entity_type in [ASTEROID, BULLET, DEBRIS, PLAYER] {
            let hits = Rc::clone(&hits);
            handlers.register(entity_type, move |_this: EntityId, _other: EntityId, _info: &CollisionInfo| {
                hits.borrow_mut()[entity_type.index()] += 1;
            });
        }

        Self { world, entities, velocities, handlers, hits, rng }
    }

    fn spawn(rng: &mut StdRng) -> (Vec<CollisionEntity>, Vec<Vec2>) {
        let mut entities = Vec::with_capacity(ENTITY_COUNT as usize + 1);
        let mut velocities = Vec::with_capacity(ENTITY_COUNT as usize + 1);

        for id in 0..ENTITY_COUNT {
            let x = rng.gen_range(0.0..WORLD_SIZE);
            let y = rng.gen_range(0.0..WORLD_SIZE);

            let (entity_type, collider, speed) = match rng.gen_range(0..10) {
                0..=4 => {
                    let collider = if rng.gen_bool(0.5) {
                        ColliderComponent::circle(rng.gen_range(4.0..12.0))
                    } else {
                        ColliderComponent::rect(rng.gen_range(6.0..20.0), rng.gen_range(6.0..20.0))
                    };
                    (ASTEROID, collider.with_layers(CollisionLayers::ENEMY | CollisionLayers::DEFAULT), 1.0)
                }
                5..=7 => (
                    BULLET,
                    ColliderComponent::capsule(1.5, 6.0).with_layers(CollisionLayers::PROJECTILE | CollisionLayers::ENEMY),
                    6.0,
                ),
                _ => (
                    DEBRIS,
                    ColliderComponent::triangle(Vec2::new(6.0, 0.0), Vec2::new(2.0, 5.0))
                        .with_layers(CollisionLayers::DEBRIS | CollisionLayers::DEFAULT),
                    0.5,
                ),
            };

            let rotation = if entity_type == ASTEROID { 0.0 } else { rng.gen_range(0.0..360.0) };
            let position = PositionComponent::new(x, y, entity_type).with_rotation(rotation);
            entities.push(CollisionEntity::new(EntityId::new(id), position, collider));

            let angle: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
            velocities.push(Vec2::new(angle.cos(), angle.sin()) * speed);
        }

        let center = WORLD_SIZE / 2.0;
        entities.push(CollisionEntity::new(
            EntityId::new(ENTITY_COUNT),
            PositionComponent::new(center - 16.0, center - 16.0, PLAYER),
            ColliderComponent::circle(16.0).with_layers(CollisionLayers::PLAYER | CollisionLayers::ENEMY),
        ));
        velocities.push(Vec2::zeros());

        (entities, velocities)
    }

    fn advance(&mut self) {
        for (entity, velocity) in self.entities.iter_mut().zip(&self.velocities) {
            entity.position.x = (entity.position.x + velocity.x).rem_euclid(WORLD_SIZE);
            entity.position.y = (entity.position.y + velocity.y).rem_euclid(WORLD_SIZE);
            if entity.position.entity_type != ASTEROID {
                entity.position.rotation = (entity.position.rotation + self.rng.gen_range(-3.0..3.0)).rem_euclid(360.0);
            }
        }
    }

    pub fn run(&mut self, ticks: u32) {
        let mut total = Stopwatch::new();
        let mut worst_tick = std::time::Duration::ZERO;
        let mut total_pairs = 0usize;

        for tick in 1..=ticks {
            self.advance();

            total.start();
            let stats = self.world.tick(&self.entities, &mut self.handlers);
            total.stop();

            worst_tick = worst_tick.max(stats.total_time());
            total_pairs += stats.unique_pairs;

            if tick % REPORT_INTERVAL == 0 {
                log::info!(
                    "Tick {tick}: {} pairs, {} cells, {} blocks | build {:.2}ms, broad {:.2}ms, dispatch {:.2}ms",
                    stats.unique_pairs,
                    stats.occupied_cells,
                    stats.blocks,
                    stats.build_time.as_secs_f64() * 1000.0,
                    stats.broad_phase_time.as_secs_f64() * 1000.0,
                    stats.dispatch_time.as_secs_f64() * 1000.0,
                );
            }
        }

        let ticks = ticks.max(1);
        log::info!(
            "{ticks} ticks: average {:.2}ms, worst {:.2}ms, {:.1} pairs per tick",
            total.elapsed_millis() / ticks as f32,
            worst_tick.as_secs_f64() * 1000.0,
            total_pairs as f64 / f64::from(ticks),
        );

        for (name, count) in TYPE_NAMES.iter().zip(self.hits.borrow().iter()) {
            log::info!("  {name}: {count} callbacks");
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG overrides the default, e.g. RUST_LOG=collision_engine=debug
    collision_engine::foundation::logging::init_with_filter("info");

    log::info!("Starting collision stress test");

    let mut args = std::env::args().skip(1);
    let config_path = args.next();
    let ticks = args.next().map(|t| t.parse::<u32>()).transpose()?.unwrap_or(DEFAULT_TICKS);

    log::info!("Creating collision world...");
    let world = match &config_path {
        Some(path) => {
            log::info!("Loading configuration from {path}");
            CollisionWorld::from_config_file(path)
        }
        None => CollisionWorld::new(CollisionConfig::default()),
    };
    let world = match world {
        Ok(world) => world,
        Err(e) => {
            log::error!("Failed to create collision world: {e}");
            return Err(e.into());
        }
    };

    let mut app = StressApp::new(world);

    app.run(ticks);
    log::info!("Stress test completed");
    Ok(())
}
