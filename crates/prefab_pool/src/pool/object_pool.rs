//! Prototype-Keyed Object Pool
//!
//! Keeps one bucket of instances per prototype and recycles them instead of
//! constructing and destroying entities on every use.
//!
//! # Architecture
//!
//! ```text
//! ObjectPool
//!     ├── container node (parent of every free instance)
//!     ├── buckets: PrototypeKey → [instance, instance, ...]
//!     └── owners:  instance → PrototypeKey
//!                     ↓
//!              EntityRuntime (construct / destroy / activate / reparent)
//! ```
//!
//! # Reuse Order
//!
//! `spawn` scans a bucket front to back and hands out the first inactive
//! instance it finds. Only when every instance is in use does the bucket grow,
//! by exactly one. Buckets never shrink except through `release`, or when
//! the runtime reports that an instance was destroyed behind the pool's back
//! (for example by a scene transition), in which case the dead handle is
//! dropped before the scan.
//!
//! # Usage
//!
//! ```rust
//! use prefab_pool::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut scene = SceneRuntime::new();
//! let spark = scene.register_prefab(Prefab::new("Spark"));
//! let mut pool = ObjectPool::new(&mut scene, &PoolConfig::default())?;
//!
//! pool.pre_warm(&mut scene, &spark, 4)?;
//! let a = pool.spawn(&mut scene, &spark, Vec3::zeros(), Quat::identity(), None)?;
//! pool.despawn(&mut scene, a)?;
//!
//! // The same instance comes back: it is the first free one in the bucket.
//! let b = pool.spawn(&mut scene, &spark, Vec3::zeros(), Quat::identity(), None)?;
//! assert_eq!(a, b);
//! # pool.shutdown(&mut scene)?;
//! # Ok(())
//! # }
//! ```

use crate::config::{PoolConfig, DEFAULT_CONTAINER_NAME};
use crate::foundation::math::{Quat, Vec3};
use crate::pool::{EntityRuntime, HideFlags, PoolError, PoolEvent, PoolStats, PrototypeKey};
use std::collections::{HashMap, HashSet};

/// Result type for pool operations against runtime `R`
pub type PoolResult<T, R> = Result<T, PoolError<<R as EntityRuntime>::Error>>;

/// Registry of per-prototype instance buckets
///
/// The pool does not own the runtime. Every operation borrows it, so the host
/// keeps its scene and can run other systems between pool calls. Use one
/// runtime per pool: handles from a different runtime are meaningless here.
///
/// Instances are only ever destroyed by [`release`](Self::release),
/// [`release_all`](Self::release_all) or [`shutdown`](Self::shutdown).
/// Dropping a pool that still tracks instances leaves them in the runtime and
/// logs a warning.
pub struct ObjectPool<R: EntityRuntime> {
    /// Parent of every free instance
    container: R::Node,
    /// Instances per prototype, in construction order
    buckets: HashMap<PrototypeKey, Vec<R::Node>>,
    /// Reverse index used for ownership checks
    owners: HashMap<R::Node, PrototypeKey>,
    /// Instances currently handed out
    spawned: HashSet<R::Node>,
    /// Hide flags applied to every constructed instance
    instance_flags: Option<HideFlags>,
    /// Capacity reserved for new buckets
    bucket_capacity: usize,
    stats: PoolStats,
}

impl<R: EntityRuntime> ObjectPool<R> {
    /// Create a pool and its container node
    ///
    /// An invalid container name falls back to the default one.
    pub fn new(runtime: &mut R, config: &PoolConfig) -> PoolResult<Self, R> {
        let name = match config.validate() {
            Ok(()) => config.container_name.as_str(),
            Err(e) => {
                log::warn!("{}, using \"{}\"", e, DEFAULT_CONTAINER_NAME);
                DEFAULT_CONTAINER_NAME
            }
        };

        let container = runtime.create_container(name)?;
        let container_flags = if config.hide_container {
            HideFlags::HIDE_AND_DONT_SAVE
        } else {
            HideFlags::DONT_SAVE
        };
        runtime.set_hide_flags(container, container_flags)?;
        runtime.set_persistent(container, config.persistent)?;

        log::debug!(
            "Created ObjectPool container \"{}\" ({:?}, persistent: {})",
            name,
            container,
            config.persistent
        );

        Ok(Self {
            container,
            buckets: HashMap::new(),
            owners: HashMap::new(),
            spawned: HashSet::new(),
            instance_flags: config.instances_dont_save.then_some(HideFlags::DONT_SAVE),
            bucket_capacity: config.initial_bucket_capacity,
            stats: PoolStats::default(),
        })
    }

    /// Construct `max(count, 1)` inactive instances of `prototype` up front
    ///
    /// Always adds to the bucket; calling it twice doubles the warm-up.
    pub fn pre_warm(
        &mut self,
        runtime: &mut R,
        prototype: &R::Prototype,
        count: usize,
    ) -> PoolResult<(), R> {
        self.check_container(runtime)?;
        let key = runtime.identity_of(prototype);
        self.ensure_bucket(key);
        self.prune_dead(runtime, key);

        let count = count.max(1);
        let container = self.container;
        for _ in 0..count {
            let node = self.construct_instance(
                runtime,
                prototype,
                key,
                Vec3::zeros(),
                Quat::identity(),
                Some(container),
            )?;
            runtime.set_active(node, false)?;
        }

        log::info!(
            "Pre-warmed {} with {} instances ({} total)",
            key,
            count,
            self.bucket_len(key)
        );
        Ok(())
    }

    /// Hand out an instance of `prototype`, reusing a free one when possible
    ///
    /// The returned instance is active, placed at `position`/`orientation`
    /// under `parent`, and its [`PoolObject`](crate::pool::PoolObject)
    /// components have received exactly one `on_spawn`. Handles the host
    /// destroyed behind the pool's back are dropped from the bucket first.
    pub fn spawn(
        &mut self,
        runtime: &mut R,
        prototype: &R::Prototype,
        position: Vec3,
        orientation: Quat,
        parent: Option<R::Node>,
    ) -> PoolResult<R::Node, R> {
        let key = runtime.identity_of(prototype);
        self.ensure_bucket(key);
        self.prune_dead(runtime, key);
        let free = self
            .instances(key)
            .iter()
            .copied()
            .find(|&node| !runtime.is_active(node));

        let (node, reused) = match free {
            Some(node) => {
                runtime.set_transform(node, position, orientation)?;
                runtime.set_parent(node, parent)?;
                (node, true)
            }
            None => {
                let node =
                    self.construct_instance(runtime, prototype, key, position, orientation, parent)?;
                (node, false)
            }
        };

        runtime.set_active(node, true)?;
        self.spawned.insert(node);
        Self::notify(runtime, node, PoolEvent::Spawn)?;
        self.stats.record_spawn(reused);

        log::trace!(
            "Spawned {:?} from {} ({})",
            node,
            key,
            if reused { "reused" } else { "constructed" }
        );
        Ok(node)
    }

    /// Return an instance to its bucket
    ///
    /// Fires `on_despawn`, deactivates the instance and parks it under the
    /// container. Every check runs before the hook, so a failed despawn
    /// changes nothing:
    ///
    /// - handles this pool does not track, or that were destroyed outside
    ///   it, fail with [`PoolError::NotOwned`]
    /// - instances that are already free fail with [`PoolError::NotSpawned`]
    /// - a destroyed container fails with [`PoolError::ContainerLost`]
    pub fn despawn(&mut self, runtime: &mut R, instance: R::Node) -> PoolResult<(), R> {
        let Some(&key) = self.owners.get(&instance) else {
            return Err(PoolError::NotOwned {
                instance: format!("{instance:?}"),
            });
        };
        if !runtime.is_alive(instance) {
            self.prune_dead(runtime, key);
            return Err(PoolError::NotOwned {
                instance: format!("{instance:?}"),
            });
        }
        if !runtime.is_active(instance) {
            return Err(PoolError::NotSpawned {
                instance: format!("{instance:?}"),
            });
        }
        self.check_container(runtime)?;

        Self::notify(runtime, instance, PoolEvent::Despawn)?;
        runtime.set_active(instance, false)?;
        self.spawned.remove(&instance);
        runtime.set_parent(instance, Some(self.container))?;
        self.stats.record_despawn();

        log::trace!("Despawned {:?} back to {}", instance, key);
        Ok(())
    }

    /// Destroy every instance of `prototype` and forget its bucket
    ///
    /// Returns the number of instances destroyed; 0 when the prototype was
    /// never seen.
    pub fn release(&mut self, runtime: &mut R, prototype: &R::Prototype) -> PoolResult<usize, R> {
        let key = runtime.identity_of(prototype);
        self.release_key(runtime, key)
    }

    /// Same as [`release`](Self::release) for a precomputed key
    ///
    /// Handles that are already dead are forgotten without error. Every live
    /// instance is destroyed even if one fails; the first failure is returned
    /// afterwards.
    pub fn release_key(&mut self, runtime: &mut R, key: PrototypeKey) -> PoolResult<usize, R> {
        let Some(bucket) = self.buckets.remove(&key) else {
            return Ok(0);
        };

        let mut destroyed = 0;
        let mut first_error = None;
        for node in bucket {
            self.owners.remove(&node);
            let was_active = self.spawned.remove(&node);
            if !runtime.is_alive(node) {
                self.stats.record_lost(was_active);
                continue;
            }
            match runtime.destroy(node) {
                Ok(()) => {
                    destroyed += 1;
                    self.stats.record_destroy(was_active);
                }
                Err(e) => {
                    log::warn!("Failed to destroy {:?} while releasing {}: {}", node, key, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        log::debug!("Released {} ({} instances destroyed)", key, destroyed);
        first_error.map_or(Ok(destroyed), |e| Err(PoolError::Runtime(e)))
    }

    /// Release every bucket
    ///
    /// Returns the total number of instances destroyed. Calling it on an
    /// empty pool does nothing.
    pub fn release_all(&mut self, runtime: &mut R) -> PoolResult<usize, R> {
        let keys: Vec<PrototypeKey> = self.buckets.keys().copied().collect();
        if keys.is_empty() {
            return Ok(0);
        }

        let mut total = 0;
        let mut first_error = None;
        for key in keys {
            match self.release_key(runtime, key) {
                Ok(count) => total += count,
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        self.buckets.clear();
        self.owners.clear();
        self.spawned.clear();

        log::info!("Released all pooled instances ({} destroyed)", total);
        first_error.map_or(Ok(total), Err)
    }

    /// Keep the container (and every free instance) across scene transitions
    pub fn set_persistent(&mut self, runtime: &mut R) -> PoolResult<(), R> {
        runtime.set_persistent(self.container, true)?;
        Ok(())
    }

    /// Let the next scene transition take the container with it
    pub fn set_scene_scoped(&mut self, runtime: &mut R) -> PoolResult<(), R> {
        runtime.set_persistent(self.container, false)?;
        Ok(())
    }

    /// Release everything and destroy the container
    ///
    /// A container that is already gone is not an error.
    pub fn shutdown(mut self, runtime: &mut R) -> PoolResult<(), R> {
        let released = self.release_all(runtime);
        let destroyed = if runtime.is_alive(self.container) {
            runtime.destroy(self.container)
        } else {
            Ok(())
        };
        released?;
        destroyed?;
        log::debug!("ObjectPool shut down");
        Ok(())
    }

    /// Bucket key the runtime assigns to `prototype`
    pub fn key_of(&self, runtime: &R, prototype: &R::Prototype) -> PrototypeKey {
        runtime.identity_of(prototype)
    }

    /// Whether a bucket exists for `key`
    pub fn contains(&self, key: PrototypeKey) -> bool {
        self.buckets.contains_key(&key)
    }

    /// Instances in the bucket for `key`, in scan order
    pub fn instances(&self, key: PrototypeKey) -> &[R::Node] {
        self.buckets.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of instances in the bucket for `key`
    pub fn bucket_len(&self, key: PrototypeKey) -> usize {
        self.instances(key).len()
    }

    /// Number of free instances in the bucket for `key`
    pub fn free_count(&self, runtime: &R, key: PrototypeKey) -> usize {
        self.instances(key)
            .iter()
            .filter(|&&node| runtime.is_alive(node) && !runtime.is_active(node))
            .count()
    }

    /// Number of handed-out instances in the bucket for `key`
    pub fn active_count(&self, runtime: &R, key: PrototypeKey) -> usize {
        self.instances(key)
            .iter()
            .filter(|&&node| runtime.is_active(node))
            .count()
    }

    /// Number of buckets
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of instances across all buckets
    pub fn total_instances(&self) -> usize {
        self.owners.len()
    }

    /// Whether `instance` lives in one of this pool's buckets
    pub fn owns(&self, instance: R::Node) -> bool {
        self.owners.contains_key(&instance)
    }

    /// Node that parents free instances
    pub fn container(&self) -> R::Node {
        self.container
    }

    /// Whether the container node still exists
    pub fn has_container(&self, runtime: &R) -> bool {
        runtime.is_alive(self.container)
    }

    /// Usage counters
    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    fn ensure_bucket(&mut self, key: PrototypeKey) -> &mut Vec<R::Node> {
        let capacity = self.bucket_capacity;
        self.buckets.entry(key).or_insert_with(|| {
            log::debug!("Created bucket for {}", key);
            Vec::with_capacity(capacity)
        })
    }

    fn check_container(&self, runtime: &R) -> PoolResult<(), R> {
        if runtime.is_alive(self.container) {
            Ok(())
        } else {
            Err(PoolError::ContainerLost {
                container: format!("{:?}", self.container),
            })
        }
    }

    /// Forget handles in the bucket for `key` that no longer exist
    fn prune_dead(&mut self, runtime: &R, key: PrototypeKey) {
        let Some(bucket) = self.buckets.get_mut(&key) else {
            return;
        };
        let mut dead = Vec::new();
        bucket.retain(|&node| {
            let alive = runtime.is_alive(node);
            if !alive {
                dead.push(node);
            }
            alive
        });
        if dead.is_empty() {
            return;
        }

        log::warn!(
            "Dropped {} instances of {} destroyed outside the pool",
            dead.len(),
            key
        );
        for node in dead {
            self.owners.remove(&node);
            let was_active = self.spawned.remove(&node);
            self.stats.record_lost(was_active);
        }
    }

    /// Build an instance and track it before configuring it, so a failure
    /// after construction still leaves it owned by the bucket.
    fn construct_instance(
        &mut self,
        runtime: &mut R,
        prototype: &R::Prototype,
        key: PrototypeKey,
        position: Vec3,
        orientation: Quat,
        parent: Option<R::Node>,
    ) -> PoolResult<R::Node, R> {
        let node = runtime.construct(prototype, position, orientation)?;
        self.ensure_bucket(key).push(node);
        self.owners.insert(node, key);
        self.stats.constructed += 1;

        if let Some(flags) = self.instance_flags {
            runtime.set_hide_flags(node, flags)?;
        }
        runtime.set_parent(node, parent)?;
        Ok(node)
    }

    fn notify(runtime: &mut R, node: R::Node, event: PoolEvent) -> Result<(), R::Error> {
        runtime.for_each_pool_object(node, &mut |object| event.dispatch(object))
    }
}

impl<R: EntityRuntime> Drop for ObjectPool<R> {
    fn drop(&mut self) {
        if !self.owners.is_empty() {
            log::warn!(
                "ObjectPool dropped while tracking {} instances in {} buckets; call shutdown() to destroy them",
                self.owners.len(),
                self.buckets.len()
            );
        }
    }
}
