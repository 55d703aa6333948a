//! Pool errors

use thiserror::Error;

/// Errors surfaced by [`ObjectPool`](crate::pool::ObjectPool)
///
/// Missing buckets are never an error. Precondition violations fail fast, and
/// anything the runtime reports is passed through untouched.
#[derive(Error, Debug)]
pub enum PoolError<E: std::error::Error + 'static> {
    /// The handle was not produced by this pool (or its bucket was released)
    #[error("Instance {instance} is not owned by this pool")]
    NotOwned {
        /// Debug rendering of the offending handle
        instance: String,
    },

    /// The instance is already sitting free in its bucket
    #[error("Instance {instance} is not spawned")]
    NotSpawned {
        /// Debug rendering of the offending handle
        instance: String,
    },

    /// The container node was destroyed outside the pool, so there is nowhere
    /// to park free instances
    #[error("Pool container {container} no longer exists")]
    ContainerLost {
        /// Debug rendering of the container handle
        container: String,
    },

    /// Failure reported by the entity runtime
    #[error("Entity runtime error: {0}")]
    Runtime(#[source] E),
}

impl<E: std::error::Error + 'static> PoolError<E> {
    /// The runtime error, if this is one
    pub fn runtime(&self) -> Option<&E> {
        match self {
            Self::Runtime(e) => Some(e),
            _ => None,
        }
    }
}

impl<E: std::error::Error + 'static> From<E> for PoolError<E> {
    fn from(error: E) -> Self {
        Self::Runtime(error)
    }
}
