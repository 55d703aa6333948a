//! Lifecycle notifications for pooled instances

/// Component-level hooks fired as an instance moves in and out of use
///
/// Every component implementing this trait on an instance is notified, in the
/// order the components were attached:
///
/// - `on_spawn` runs once per spawn, after the instance is activated
/// - `on_despawn` runs once per despawn, before the instance is deactivated
///
/// Use these to reset per-use state (health, timers, velocity) instead of
/// relying on construction, which only happens the first time.
pub trait PoolObject {
    /// Instance was handed out by the pool
    fn on_spawn(&mut self);

    /// Instance is about to return to the pool
    fn on_despawn(&mut self);
}

/// Which hook to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolEvent {
    /// See [`PoolObject::on_spawn`]
    Spawn,
    /// See [`PoolObject::on_despawn`]
    Despawn,
}

impl PoolEvent {
    /// Deliver this event to one component
    pub fn dispatch(self, target: &mut dyn PoolObject) {
        match self {
            Self::Spawn => target.on_spawn(),
            Self::Despawn => target.on_despawn(),
        }
    }
}
