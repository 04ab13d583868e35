//! The function catalog protocol: looking up handlers by definition.

use crate::error::HandlerError;
use crate::handler::{FunctionHandler, Message};
use crate::shape::TypeShape;
use std::fmt;
use std::sync::Arc;

/// Reserved name of the routing handler.
pub const ROUTING_FUNCTION_NAME: &str = "functionRouter";

/// A handler resolved from the catalog under a given definition.
///
/// For a composed definition (`a|b`) the handler is the composition and the
/// shape is the chained shape.
#[derive(Clone)]
pub struct FunctionInvocation {
    definition: String,
    handler: Arc<dyn FunctionHandler>,
}

impl FunctionInvocation {
    /// Create an invocation for `definition`.
    pub fn new(definition: impl Into<String>, handler: Arc<dyn FunctionHandler>) -> Self {
        Self {
            definition: definition.into(),
            handler,
        }
    }

    /// The definition this invocation was resolved as. May differ from the
    /// name it was looked up by when the catalog resolves aliases.
    pub fn function_definition(&self) -> &str {
        &self.definition
    }

    /// The declared type shape.
    pub fn function_type(&self) -> &TypeShape {
        self.handler.shape()
    }

    /// No declared input.
    pub fn is_supplier(&self) -> bool {
        self.function_type().input.is_none()
    }

    /// No declared output.
    pub fn is_consumer(&self) -> bool {
        self.function_type().output.is_none()
    }

    /// The underlying handler.
    pub fn handler(&self) -> &Arc<dyn FunctionHandler> {
        &self.handler
    }

    /// Invoke the handler.
    pub async fn apply(&self, input: Option<Message>) -> Result<Option<Message>, HandlerError> {
        self.handler.apply(input).await
    }
}

impl fmt::Debug for FunctionInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionInvocation")
            .field("definition", &self.definition)
            .field("shape", self.function_type())
            .finish()
    }
}

/// Protocol: Function catalog.
///
/// Lookups are in-memory reads; the trait is synchronous.
pub trait FunctionCatalog: Send + Sync {
    /// Look up a handler by definition. An empty definition asks for the
    /// catalog's default function, which exists only when it is unambiguous.
    fn lookup(&self, definition: &str) -> Option<FunctionInvocation>;

    /// Names of all individually registered functions.
    fn function_names(&self) -> Vec<String>;
}

/// Split a `;`-delimited definition list, dropping blank entries.
pub fn definition_list(list: &str) -> Vec<&str> {
    list.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split one definition into its constituent function names. Both `|` and
/// `,` are composition operators.
pub fn constituents(definition: &str) -> Vec<&str> {
    definition
        .split(['|', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
