//! The component registry protocol.

use crate::binding::BindingProxyDescriptor;
use crate::error::RegistryError;
use crate::handler::FunctionHandler;
use crate::shape::TypeShape;
use std::fmt;
use std::sync::Arc;

/// An entry in the component registry.
#[non_exhaustive]
#[derive(Clone)]
pub enum Component {
    /// A functional handler.
    Function(Arc<dyn FunctionHandler>),
    /// A binding proxy produced by the registrar.
    Binding(Arc<BindingProxyDescriptor>),
    /// Any other named value the application registered.
    Value(serde_json::Value),
}

impl Component {
    /// The declared shape, for function components.
    pub fn shape(&self) -> Option<&TypeShape> {
        match self {
            Self::Function(handler) => Some(handler.shape()),
            _ => None,
        }
    }

    /// The binding descriptor, for binding components.
    pub fn as_binding(&self) -> Option<&Arc<BindingProxyDescriptor>> {
        match self {
            Self::Binding(descriptor) => Some(descriptor),
            _ => None,
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Function(_) => "function",
            Self::Binding(_) => "binding",
            Self::Value(_) => "value",
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(handler) => f.debug_tuple("Function").field(handler.shape()).finish(),
            Self::Binding(descriptor) => f.debug_tuple("Binding").field(descriptor).finish(),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// Protocol: Component registry.
///
/// The live set of named components. The registrar only appends to it
/// during its pass; a name that is registered twice keeps the later entry.
pub trait ComponentRegistry: Send + Sync {
    /// Register a component, returning the entry it replaced, if any.
    fn register_component(
        &self,
        name: &str,
        component: Component,
    ) -> Result<Option<Component>, RegistryError>;

    /// Whether a component is registered under `name`.
    fn contains_component(&self, name: &str) -> Result<bool, RegistryError>;

    /// Fetch a component by name.
    fn get_component(&self, name: &str) -> Result<Option<Component>, RegistryError>;
}
