//! Which definition list to bind, decided by an ordered resolver chain.
//!
//! Resolvers are consulted in order and the first one that returns a
//! definition wins; later resolvers are not called. The standard chain is:
//!
//! 1. [`ExplicitDefinition`]: `stream.function.definition`
//! 2. [`EnvironmentDefinition`]: `function.definition`
//! 3. [`RoutingDefinition`]: routing enabled or a routing expression set
//! 4. [`AutodetectDefinition`]: the catalog's single default function

use fnwire_core::binding::StreamFunctionProperties;
use fnwire_core::catalog::{FunctionCatalog, ROUTING_FUNCTION_NAME};
use fnwire_core::config::{bool_property, keys, text_property, PropertySource};
use serde::Serialize;

/// Everything a resolver may consult.
pub struct ResolutionContext<'a> {
    /// Stream-function properties as configured.
    pub properties: &'a StreamFunctionProperties,
    /// Process-level configuration.
    pub environment: &'a dyn PropertySource,
    /// The function catalog.
    pub catalog: &'a dyn FunctionCatalog,
}

/// Which resolver produced the definition.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionSource {
    /// Explicit stream-function definition.
    Explicit,
    /// Environment fallback definition.
    Environment,
    /// Routing was requested.
    Routing,
    /// Single default function found in the catalog.
    Autodetect,
    /// A caller-supplied resolver.
    Custom,
}

/// A resolved definition list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDefinition {
    /// `;`-delimited definition list.
    pub definition: String,
    /// Where it came from.
    pub source: DefinitionSource,
}

impl ResolvedDefinition {
    /// Create a resolved definition.
    pub fn new(definition: impl Into<String>, source: DefinitionSource) -> Self {
        Self {
            definition: definition.into(),
            source,
        }
    }
}

/// One step of the precedence chain.
pub trait DefinitionResolver: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// A definition, or `None` to defer to the next resolver.
    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Option<ResolvedDefinition>;
}

/// Reads the explicitly configured stream-function definition.
pub struct ExplicitDefinition;

impl DefinitionResolver for ExplicitDefinition {
    fn name(&self) -> &'static str {
        "explicit"
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Option<ResolvedDefinition> {
        ctx.properties
            .definition()
            .map(|d| ResolvedDefinition::new(d, DefinitionSource::Explicit))
    }
}

/// Reads the environment-level fallback definition.
pub struct EnvironmentDefinition;

impl DefinitionResolver for EnvironmentDefinition {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Option<ResolvedDefinition> {
        text_property(ctx.environment, keys::FUNCTION_DEFINITION)
            .map(|d| ResolvedDefinition::new(d, DefinitionSource::Environment))
    }
}

/// Selects the routing handler when routing is enabled or an expression
/// is present.
pub struct RoutingDefinition;

impl DefinitionResolver for RoutingDefinition {
    fn name(&self) -> &'static str {
        "routing"
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Option<ResolvedDefinition> {
        let enabled = flag(ctx.environment, keys::ROUTING_ENABLED, false);
        if enabled || ctx.environment.contains_property(keys::ROUTING_EXPRESSION) {
            Some(ResolvedDefinition::new(
                ROUTING_FUNCTION_NAME,
                DefinitionSource::Routing,
            ))
        } else {
            None
        }
    }
}

/// Picks the catalog's default function when autodetection is on.
pub struct AutodetectDefinition;

impl DefinitionResolver for AutodetectDefinition {
    fn name(&self) -> &'static str {
        "autodetect"
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Option<ResolvedDefinition> {
        if !flag(ctx.environment, keys::AUTODETECT, true) {
            return None;
        }
        ctx.catalog.lookup("").map(|invocation| {
            ResolvedDefinition::new(
                invocation.function_definition(),
                DefinitionSource::Autodetect,
            )
        })
    }
}

/// Boolean property; an unparsable value is logged and treated as `default`.
fn flag(source: &dyn PropertySource, key: &str, default: bool) -> bool {
    bool_property(source, key, default).unwrap_or_else(|e| {
        tracing::warn!(key, error = %e, default, "ignoring invalid boolean property");
        default
    })
}

/// Ordered list of resolvers; the first match wins.
pub struct DefinitionChain {
    resolvers: Vec<Box<dyn DefinitionResolver>>,
}

impl DefinitionChain {
    /// An empty chain that never resolves.
    pub fn new() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    /// Explicit, environment, routing, autodetect.
    pub fn standard() -> Self {
        Self::new()
            .with(ExplicitDefinition)
            .with(EnvironmentDefinition)
            .with(RoutingDefinition)
            .with(AutodetectDefinition)
    }

    /// Append a resolver at the lowest precedence.
    pub fn with(mut self, resolver: impl DefinitionResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    /// Resolver names in precedence order.
    pub fn names(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    /// Consult resolvers in order, stopping at the first match.
    pub fn resolve(&self, ctx: &ResolutionContext<'_>) -> Option<ResolvedDefinition> {
        for resolver in &self.resolvers {
            if let Some(resolved) = resolver.resolve(ctx) {
                tracing::debug!(
                    resolver = resolver.name(),
                    definition = %resolved.definition,
                    "function definition resolved"
                );
                return Some(resolved);
            }
        }
        None
    }
}

impl Default for DefinitionChain {
    fn default() -> Self {
        Self::standard()
    }
}
