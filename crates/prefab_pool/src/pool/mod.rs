//! Object pooling
//!
//! [`ObjectPool`] keeps a bucket of reusable instances per prototype. Scene
//! manipulation is delegated to an [`EntityRuntime`]; instances learn about
//! being handed out or returned through [`PoolObject`].

pub mod error;
pub mod lifecycle;
pub mod object_pool;
pub mod runtime;
pub mod stats;

#[cfg(test)]
mod tests;

pub use error::PoolError;
pub use lifecycle::{PoolEvent, PoolObject};
pub use object_pool::{ObjectPool, PoolResult};
pub use runtime::{EntityRuntime, HideFlags, PrototypeKey};
pub use stats::PoolStats;
