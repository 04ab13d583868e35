use crate::registry::MemoryRegistry;
use crate::routing::{RoutingExpression, RoutingHandler};
use async_trait::async_trait;
use fnwire_core::catalog::{constituents, FunctionCatalog, FunctionInvocation, ROUTING_FUNCTION_NAME};
use fnwire_core::error::HandlerError;
use fnwire_core::handler::{FunctionHandler, Message};
use fnwire_core::shape::TypeShape;
use std::collections::HashMap;
use std::sync::Arc;

/// Function catalog over the function components of a [`MemoryRegistry`].
///
/// Resolves single names, compositions (`a|b`, `a,b`), aliases, the
/// built-in routing handler, and the empty definition (the single
/// registered function, if there is exactly one).
#[derive(Clone)]
pub struct MemoryCatalog {
    registry: Arc<MemoryRegistry>,
    aliases: HashMap<String, String>,
    routing: RoutingExpression,
}

impl MemoryCatalog {
    /// Create a catalog viewing `registry`.
    pub fn new(registry: Arc<MemoryRegistry>) -> Self {
        Self {
            registry,
            aliases: HashMap::new(),
            routing: RoutingExpression::default(),
        }
    }

    /// Resolve `alias` as `target`. Aliases are followed one hop.
    pub fn with_alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), target.into());
        self
    }

    /// Set the routing expression used by the routing handler.
    pub fn with_routing_expression(mut self, expression: &str) -> Self {
        self.routing = RoutingExpression::parse(expression);
        self
    }

    /// The registry this catalog reads from.
    pub fn registry(&self) -> &Arc<MemoryRegistry> {
        &self.registry
    }

    fn single(&self, name: &str) -> Option<Arc<dyn FunctionHandler>> {
        match self.registry.function(name) {
            Ok(Some(handler)) => Some(handler),
            Ok(None) if name == ROUTING_FUNCTION_NAME => Some(Arc::new(RoutingHandler::new(
                self.clone(),
                self.routing.clone(),
            ))),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(function = name, error = %e, "catalog lookup failed");
                None
            }
        }
    }

    fn resolve(&self, definition: &str) -> Option<FunctionInvocation> {
        let names = constituents(definition);
        match names.as_slice() {
            [] => None,
            [name] => self
                .single(name)
                .map(|handler| FunctionInvocation::new(*name, handler)),
            _ => {
                let stages = names
                    .iter()
                    .map(|name| self.single(name))
                    .collect::<Option<Vec<_>>>()?;
                Some(FunctionInvocation::new(
                    names.join("|"),
                    Arc::new(ComposedHandler::new(stages)),
                ))
            }
        }
    }

    fn default_function(&self) -> Option<FunctionInvocation> {
        let names = self.function_names();
        match names.as_slice() {
            [only] => self.resolve(only),
            _ => None,
        }
    }
}

impl FunctionCatalog for MemoryCatalog {
    fn lookup(&self, definition: &str) -> Option<FunctionInvocation> {
        let definition = definition.trim();
        if definition.is_empty() {
            return self.default_function();
        }
        match self.aliases.get(definition) {
            Some(target) => self.resolve(target),
            None => self.resolve(definition),
        }
    }

    fn function_names(&self) -> Vec<String> {
        match self.registry.function_names() {
            Ok(names) => names
                .into_iter()
                .filter(|n| n != ROUTING_FUNCTION_NAME)
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "could not list catalog functions");
                Vec::new()
            }
        }
    }
}

/// Pipes the output of each stage into the next.
pub struct ComposedHandler {
    stages: Vec<Arc<dyn FunctionHandler>>,
    shape: TypeShape,
}

impl ComposedHandler {
    /// Compose `stages` in order. An empty list yields a shape with
    /// neither input nor output.
    pub fn new(stages: Vec<Arc<dyn FunctionHandler>>) -> Self {
        let shape = match stages.split_first() {
            Some((first, rest)) => rest
                .iter()
                .fold(first.shape().clone(), |acc, next| acc.then(next.shape())),
            None => TypeShape {
                input: None,
                output: None,
                affinity: Default::default(),
            },
        };
        Self { stages, shape }
    }
}

#[async_trait]
impl FunctionHandler for ComposedHandler {
    fn shape(&self) -> &TypeShape {
        &self.shape
    }

    async fn apply(&self, input: Option<Message>) -> Result<Option<Message>, HandlerError> {
        let mut current = input;
        for stage in &self.stages {
            current = stage.apply(current).await?;
        }
        Ok(current)
    }
}
