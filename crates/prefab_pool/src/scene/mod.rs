//! In-memory scene runtime
//!
//! A small scene graph that implements [`EntityRuntime`](crate::pool::EntityRuntime)
//! without a host engine. It covers exactly what pooling needs:
//!
//! - Prefabs with ordered [`PoolObject`](crate::pool::PoolObject) component factories
//! - A node hierarchy with local transforms and active flags
//! - Hide flags and persistence markers
//! - Scene transitions that discard every non-persistent root
//!
//! ## Architecture
//!
//! ```text
//! SceneRuntime
//!     ├── prefabs: SlotMap<PrefabId, Prefab>
//!     └── nodes:   SlotMap<NodeId, SceneNode>
//!                      └── components: [Box<dyn PoolObject>, ...]
//! ```

mod node;
mod prefab;
mod runtime;

pub use node::SceneNode;
pub use prefab::{ComponentFactory, Prefab};
pub use runtime::{NodeId, PrefabId, SceneError, SceneRuntime};
