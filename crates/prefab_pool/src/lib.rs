//! # Prefab Pool
//!
//! A prototype-keyed object pool for game entities. Instead of constructing and
//! destroying an expensive entity every time one is needed, the pool keeps a
//! bucket of instances per prototype and hands back a free one when it can.
//!
//! ## Features
//!
//! - **Prototype Buckets**: One growable bucket per prototype identity
//! - **Reuse Before Growth**: First free instance in insertion order is recycled
//! - **Lifecycle Hooks**: `on_spawn` / `on_despawn` on every attached [`pool::PoolObject`]
//! - **Pluggable Runtime**: Scene graph and construction live behind [`pool::EntityRuntime`]
//! - **Reference Runtime**: [`scene::SceneRuntime`] for tests, tools and demos
//!
//! ## Quick Start
//!
//! ```rust
//! use prefab_pool::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut scene = SceneRuntime::new();
//!     let bullet = scene.register_prefab(Prefab::new("Bullet"));
//!
//!     let mut pool = ObjectPool::new(&mut scene, &PoolConfig::default())?;
//!     pool.pre_warm(&mut scene, &bullet, 8)?;
//!
//!     let shot = pool.spawn(&mut scene, &bullet, Vec3::new(0.0, 1.0, 0.0), Quat::identity(), None)?;
//!     pool.despawn(&mut scene, shot)?;
//!
//!     pool.shutdown(&mut scene)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod pool;
pub mod scene;

/// Common imports for pool users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, PoolConfig},
        foundation::math::{Quat, Transform, Vec3},
        pool::{
            EntityRuntime, HideFlags, ObjectPool, PoolError, PoolObject, PoolStats,
            PrototypeKey,
        },
        scene::{NodeId, Prefab, PrefabId, SceneError, SceneRuntime},
    };
}
