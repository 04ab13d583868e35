use fnwire_core::error::RegistryError;
use fnwire_core::handler::FunctionHandler;
use fnwire_core::registry::{Component, ComponentRegistry};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory component registry backed by a `HashMap` behind a `RwLock`.
///
/// A poisoned lock surfaces as [`RegistryError::Unavailable`].
pub struct MemoryRegistry {
    components: RwLock<HashMap<String, Component>>,
}

impl MemoryRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            components: RwLock::new(HashMap::new()),
        }
    }

    /// Register a function component.
    pub fn register_function(
        &self,
        name: &str,
        handler: impl FunctionHandler + 'static,
    ) -> Result<(), RegistryError> {
        self.register_component(name, Component::Function(Arc::new(handler)))?;
        Ok(())
    }

    /// Register a plain value component.
    pub fn register_value(
        &self,
        name: &str,
        value: serde_json::Value,
    ) -> Result<(), RegistryError> {
        self.register_component(name, Component::Value(value))?;
        Ok(())
    }

    /// The function handler registered under `name`, if any.
    pub fn function(&self, name: &str) -> Result<Option<Arc<dyn FunctionHandler>>, RegistryError> {
        Ok(match self.get_component(name)? {
            Some(Component::Function(handler)) => Some(handler),
            _ => None,
        })
    }

    /// Names of all function components, sorted.
    pub fn function_names(&self) -> Result<Vec<String>, RegistryError> {
        let components = self.read()?;
        let mut names: Vec<String> = components
            .iter()
            .filter(|(_, c)| matches!(c, Component::Function(_)))
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Names of all components, sorted.
    pub fn component_names(&self) -> Result<Vec<String>, RegistryError> {
        let mut names: Vec<String> = self.read()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, Component>>, RegistryError> {
        self.components
            .read()
            .map_err(|e| RegistryError::Unavailable(e.to_string()))
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry for MemoryRegistry {
    fn register_component(
        &self,
        name: &str,
        component: Component,
    ) -> Result<Option<Component>, RegistryError> {
        let mut components = self
            .components
            .write()
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;
        Ok(components.insert(name.to_owned(), component))
    }

    fn contains_component(&self, name: &str) -> Result<bool, RegistryError> {
        Ok(self.read()?.contains_key(name))
    }

    fn get_component(&self, name: &str) -> Result<Option<Component>, RegistryError> {
        Ok(self.read()?.get(name).cloned())
    }
}
