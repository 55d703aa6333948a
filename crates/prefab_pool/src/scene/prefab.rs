//! Prefab templates

use crate::foundation::math::Vec3;
use crate::pool::PoolObject;

/// Builds one fresh component for a new instance
pub type ComponentFactory = Box<dyn Fn() -> Box<dyn PoolObject>>;

/// Template instances are cloned from
///
/// Each registered factory contributes one component to every instance, in
/// the order the factories were added.
pub struct Prefab {
    name: String,
    scale: Vec3,
    components: Vec<ComponentFactory>,
}

impl Prefab {
    /// Create an empty prefab
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            components: Vec::new(),
        }
    }

    /// Add a component factory
    pub fn with_component<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn PoolObject> + 'static,
    {
        self.components.push(Box::new(factory));
        self
    }

    /// Set the scale every instance starts with
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Prefab name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Initial instance scale
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Number of components each instance gets
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub(crate) fn instantiate_components(&self) -> Vec<Box<dyn PoolObject>> {
        self.components.iter().map(|factory| factory()).collect()
    }
}

impl std::fmt::Debug for Prefab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prefab")
            .field("name", &self.name)
            .field("scale", &self.scale)
            .field("components", &self.components.len())
            .finish()
    }
}
