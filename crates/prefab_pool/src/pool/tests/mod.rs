//! Scenario tests for the object pool running against the in-memory scene


use crate::config::PoolConfig;
use crate::pool::{ObjectPool, PoolObject};
use crate::scene::{Prefab, PrefabId, SceneRuntime};
use std::cell::RefCell;
use std::rc::Rc;

/// Lifecycle calls observed by [`Recorder`] components
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Call {
    Spawn(&'static str, u32),
    Despawn(&'static str, u32),
}

pub(super) type CallLog = Rc<RefCell<Vec<Call>>>;

/// Component that logs its hooks, tagged by component name and instance serial
pub(super) struct Recorder {
    tag: &'static str,
    serial: u32,
    log: CallLog,
}

impl PoolObject for Recorder {
    fn on_spawn(&mut self) {
        self.log.borrow_mut().push(Call::Spawn(self.tag, self.serial));
    }

    fn on_despawn(&mut self) {
        self.log.borrow_mut().push(Call::Despawn(self.tag, self.serial));
    }
}

/// Prefab whose instances carry one [`Recorder`] per tag, numbered by construction order
pub(super) fn recording_prefab(name: &str, tags: &[&'static str], log: &CallLog) -> Prefab {
    let serial = Rc::new(RefCell::new(0u32));
    let last = tags.len().saturating_sub(1);
    let mut prefab = Prefab::new(name);
    for (index, &tag) in tags.iter().enumerate() {
        let log = log.clone();
        let serial = serial.clone();
        prefab = prefab.with_component(move || {
            let current = *serial.borrow();
            if index == last {
                *serial.borrow_mut() += 1;
            }
            Box::new(Recorder {
                tag,
                serial: current,
                log: log.clone(),
            })
        });
    }
    prefab
}

pub(super) struct Fixture {
    pub scene: SceneRuntime,
    pub pool: ObjectPool<SceneRuntime>,
    pub log: CallLog,
}

impl Fixture {
    pub fn new() -> Self {
        let mut scene = SceneRuntime::new();
        let pool = ObjectPool::new(&mut scene, &PoolConfig::default()).unwrap();
        Self {
            scene,
            pool,
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn prefab(&mut self, name: &str, tags: &[&'static str]) -> PrefabId {
        let prefab = recording_prefab(name, tags, &self.log);
        self.scene.register_prefab(prefab)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }
}
