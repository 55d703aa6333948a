//! Projectile pool demo
//!
//! Runs a fixed number of simulated frames in which a turret fires bullets and
//! sparks. Every projectile lives for a random number of frames and is then
//! returned to the pool. Halfway through, the level changes; the pool
//! container and everything parented under persistent roots survive it.
//!
//! Usage: `pool_demo [config.toml|config.ron]`

use prefab_pool::foundation::logging;
use prefab_pool::prelude::*;
use rand::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

// Configuration constants
const FRAMES: u32 = 240;
const FIRE_CHANCE: f64 = 0.6;
const MAX_LIFETIME_FRAMES: u32 = 30;
const BULLET_PREWARM: usize = 16;

/// Resets per-shot state when a bullet leaves the pool
struct Ballistics {
    shots: Rc<Cell<u32>>,
    distance: f32,
}

impl PoolObject for Ballistics {
    fn on_spawn(&mut self) {
        self.distance = 0.0;
        self.shots.set(self.shots.get() + 1);
    }

    fn on_despawn(&mut self) {
        log::trace!("Bullet travelled {:.1} units", self.distance);
    }
}

struct Projectile {
    node: NodeId,
    expires_at: u32,
}

fn load_config() -> Result<PoolConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading pool configuration from {}", path);
            PoolConfig::load_from_file(&path)
        }
        None => Ok(PoolConfig::new("ProjectilePool")),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_default("info");

    let config = load_config()?;
    let mut scene = SceneRuntime::new();
    let shots = Rc::new(Cell::new(0));

    let bullet_shots = shots.clone();
    let bullet = scene.register_prefab(Prefab::new("Bullet").with_component(move || {
        Box::new(Ballistics {
            shots: bullet_shots.clone(),
            distance: 0.0,
        })
    }));
    let spark = scene.register_prefab(Prefab::new("Spark").with_scale(Vec3::new(0.2, 0.2, 0.2)));
    let turret = scene.create_node("Turret");
    scene.set_persistent(turret, true)?;
    let effects = scene.create_node("Effects");
    scene.set_persistent(effects, true)?;
    scene.create_node("LevelGeometry");

    let mut pool = ObjectPool::new(&mut scene, &config)?;
    pool.pre_warm(&mut scene, &bullet, BULLET_PREWARM)?;

    let mut rng = thread_rng();
    let mut in_flight: Vec<Projectile> = Vec::new();

    for frame in 0..FRAMES {
        // Return expired projectiles first so this frame can reuse them
        let (expired, alive): (Vec<_>, Vec<_>) =
            in_flight.into_iter().partition(|p| p.expires_at <= frame);
        in_flight = alive;
        for projectile in expired {
            pool.despawn(&mut scene, projectile.node)?;
        }

        if rng.gen_bool(FIRE_CHANCE) {
            let heading = Quat::from_axis_angle(&Vec3::y_axis(), rng.gen_range(-0.5..0.5));
            let muzzle = Vec3::new(0.0, 1.5, rng.gen_range(-0.2..0.2));
            let node = pool.spawn(&mut scene, &bullet, muzzle, heading, Some(turret))?;
            in_flight.push(Projectile {
                node,
                expires_at: frame + rng.gen_range(1..=MAX_LIFETIME_FRAMES),
            });

            let flash = pool.spawn(&mut scene, &spark, muzzle, Quat::identity(), Some(effects))?;
            in_flight.push(Projectile {
                node: flash,
                expires_at: frame + 2,
            });
        }

        if frame == FRAMES / 2 {
            let scene_scoped = !config.persistent;
            if scene_scoped {
                // The container is about to go away; release its buckets first
                in_flight.clear();
                pool.release_all(&mut scene)?;
            }
            let destroyed = scene.load_scene("Level2");
            log::info!("Scene changed at frame {}, {} nodes dropped", frame, destroyed);
            if !pool.has_container(&scene) {
                pool = ObjectPool::new(&mut scene, &config)?;
                pool.pre_warm(&mut scene, &bullet, BULLET_PREWARM)?;
            }
        }
    }

    for projectile in in_flight.drain(..) {
        pool.despawn(&mut scene, projectile.node)?;
    }

    let bullet_key = pool.key_of(&scene, &bullet);
    let spark_key = pool.key_of(&scene, &spark);
    let stats = pool.stats().clone();
    log::info!(
        "Bullets: {} pooled, {} shots fired; sparks: {} pooled",
        pool.bucket_len(bullet_key),
        shots.get(),
        pool.bucket_len(spark_key)
    );
    log::info!(
        "Spawned {} (reuse {:.0}%), constructed {}, peak in flight {}",
        stats.spawned,
        stats.reuse_ratio() * 100.0,
        stats.constructed,
        stats.peak_active
    );

    pool.release(&mut scene, &spark)?;
    pool.shutdown(&mut scene)?;
    Ok(())
}
