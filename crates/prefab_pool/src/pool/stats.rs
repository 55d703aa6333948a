//! Pool usage statistics

/// Running counters for an [`ObjectPool`](crate::pool::ObjectPool)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances built through the runtime (pre-warm and growth)
    pub constructed: u64,
    /// Spawns served by a free instance already in a bucket
    pub reused: u64,
    /// Completed spawns
    pub spawned: u64,
    /// Completed despawns
    pub despawned: u64,
    /// Instances destroyed by release
    pub destroyed: u64,
    /// Instances destroyed outside the pool and dropped from their bucket
    pub lost: u64,
    /// Instances currently handed out
    pub active: usize,
    /// Maximum number of instances handed out at once
    pub peak_active: usize,
}

impl PoolStats {
    pub(crate) fn record_spawn(&mut self, reused: bool) {
        self.spawned += 1;
        if reused {
            self.reused += 1;
        }
        self.active += 1;
        self.peak_active = self.peak_active.max(self.active);
    }

    pub(crate) fn record_despawn(&mut self) {
        self.despawned += 1;
        self.active = self.active.saturating_sub(1);
    }

    pub(crate) fn record_destroy(&mut self, was_active: bool) {
        self.destroyed += 1;
        if was_active {
            self.active = self.active.saturating_sub(1);
        }
    }

    pub(crate) fn record_lost(&mut self, was_active: bool) {
        self.lost += 1;
        if was_active {
            self.active = self.active.saturating_sub(1);
        }
    }

    /// Fraction of spawns served without constructing (0.0 to 1.0)
    #[allow(clippy::cast_precision_loss)]
    pub fn reuse_ratio(&self) -> f32 {
        if self.spawned == 0 {
            0.0
        } else {
            self.reused as f32 / self.spawned as f32
        }
    }
}
