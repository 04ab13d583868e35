//! FailingRegistry: a registry whose writes always fail.

use crate::error::RegistryError;
use crate::registry::{Component, ComponentRegistry};
use std::collections::HashMap;

/// A registry that serves reads from a fixed set of components and
/// rejects every write with [`RegistryError::Rejected`].
pub struct FailingRegistry {
    components: HashMap<String, Component>,
}

impl FailingRegistry {
    /// A failing registry with no components.
    pub fn new() -> Self {
        Self {
            components: HashMap::new(),
        }
    }

    /// Seed a readable component.
    pub fn with_component(mut self, name: impl Into<String>, component: Component) -> Self {
        self.components.insert(name.into(), component);
        self
    }
}

impl Default for FailingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry for FailingRegistry {
    fn register_component(
        &self,
        name: &str,
        _component: Component,
    ) -> Result<Option<Component>, RegistryError> {
        Err(RegistryError::Rejected {
            name: name.to_owned(),
            reason: "registry is read-only".into(),
        })
    }

    fn contains_component(&self, name: &str) -> Result<bool, RegistryError> {
        Ok(self.components.contains_key(name))
    }

    fn get_component(&self, name: &str) -> Result<Option<Component>, RegistryError> {
        Ok(self.components.get(name).cloned())
    }
}
