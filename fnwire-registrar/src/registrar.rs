use crate::arity::compute_arity;
use crate::definition::{DefinitionChain, ResolutionContext, ResolvedDefinition};
use crate::error::{InspectError, RegistrarError, SkipReason, Skipped};
use crate::inspector::CatalogInspector;
use fnwire_core::binding::{BindingProxyDescriptor, BindingTable, StreamFunctionProperties};
use fnwire_core::catalog::{definition_list, FunctionCatalog};
use fnwire_core::config::{keys, text_property, MapProperties, PropertySource};
use fnwire_core::registry::{Component, ComponentRegistry};
use serde::Serialize;
use std::sync::Arc;

/// Lifecycle of a registrar. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrarState {
    /// Constructed, not yet run.
    Uninitialized,
    /// Working out which definitions to bind.
    ResolvingDefinitions,
    /// Registering binding descriptors.
    Registering,
    /// Done; the binding table is final.
    Complete,
}

/// Outcome of a registration pass.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationReport {
    /// The definition selected by the precedence chain, when `run` was used
    /// and a resolver matched.
    pub definition: Option<ResolvedDefinition>,
    /// Descriptors registered during the pass, in registration order.
    pub table: BindingTable,
    /// Definitions and sources that produced no descriptor.
    pub skipped: Vec<Skipped>,
}

/// Derives binding descriptors for the configured handlers and registers
/// them, once, at startup.
///
/// ```
/// use fnwire_catalog_memory::{MemoryCatalog, MemoryRegistry};
/// use fnwire_core::handler::{FnHandler, Message};
/// use fnwire_registrar::FunctionBindingRegistrar;
/// use std::sync::Arc;
///
/// let registry = Arc::new(MemoryRegistry::new());
/// registry
///     .register_function("upper", FnHandler::function::<String, String>(|m: Message| Ok(m)))
///     .unwrap();
/// let catalog = Arc::new(MemoryCatalog::new(Arc::clone(&registry)));
///
/// let mut registrar = FunctionBindingRegistrar::new(catalog, registry);
/// let report = registrar.run().unwrap();
/// assert_eq!(report.table.names(), vec!["upper_binding"]);
/// ```
pub struct FunctionBindingRegistrar {
    catalog: Arc<dyn FunctionCatalog>,
    registry: Arc<dyn ComponentRegistry>,
    environment: Arc<dyn PropertySource>,
    properties: Option<StreamFunctionProperties>,
    chain: DefinitionChain,
    state: RegistrarState,
}

impl FunctionBindingRegistrar {
    /// Create a registrar with an empty environment and the standard chain.
    pub fn new(catalog: Arc<dyn FunctionCatalog>, registry: Arc<dyn ComponentRegistry>) -> Self {
        Self {
            catalog,
            registry,
            environment: Arc::new(MapProperties::new()),
            properties: None,
            chain: DefinitionChain::standard(),
            state: RegistrarState::Uninitialized,
        }
    }

    /// Read configuration from `environment`.
    pub fn with_environment(mut self, environment: Arc<dyn PropertySource>) -> Self {
        self.environment = environment;
        self
    }

    /// Use `properties` instead of reading them from the environment.
    pub fn with_properties(mut self, properties: StreamFunctionProperties) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Replace the definition precedence chain.
    pub fn with_chain(mut self, chain: DefinitionChain) -> Self {
        self.chain = chain;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RegistrarState {
        self.state
    }

    /// Resolve the definition list and the source names from configuration,
    /// then register bindings for them.
    pub fn run(&mut self) -> Result<RegistrationReport, RegistrarError> {
        self.begin(RegistrarState::ResolvingDefinitions)?;

        let mut properties = self.effective_properties();
        let resolved = self.chain.resolve(&ResolutionContext {
            properties: &properties,
            environment: self.environment.as_ref(),
            catalog: self.catalog.as_ref(),
        });
        if resolved.is_none() {
            tracing::info!("no function definition resolved; nothing to bind");
        }
        properties.definition = resolved.as_ref().map(|r| r.definition.clone());

        let source_list =
            text_property(self.environment.as_ref(), keys::SOURCE).unwrap_or_default();
        let sources = definition_list(&source_list);
        let definitions = properties.definition.clone().unwrap_or_default();

        let mut report = self.pass(&definitions, &sources, properties)?;
        report.definition = resolved;
        Ok(report)
    }

    /// Register bindings for a `;`-delimited definition list and a set of
    /// output-only source names.
    pub fn register_bindings(
        &mut self,
        definitions: &str,
        sources: &[&str],
    ) -> Result<RegistrationReport, RegistrarError> {
        self.begin(RegistrarState::ResolvingDefinitions)?;
        let mut properties = self.effective_properties();
        if !definitions.trim().is_empty() {
            properties.definition = Some(definitions.to_owned());
        }
        self.pass(definitions, sources, properties)
    }

    fn begin(&mut self, next: RegistrarState) -> Result<(), RegistrarError> {
        if self.state != RegistrarState::Uninitialized {
            return Err(RegistrarError::AlreadyRun(self.state));
        }
        self.transition(next);
        Ok(())
    }

    fn transition(&mut self, next: RegistrarState) {
        tracing::debug!(from = ?self.state, to = ?next, "registrar state");
        self.state = next;
    }

    fn effective_properties(&self) -> StreamFunctionProperties {
        self.properties
            .clone()
            .unwrap_or_else(|| StreamFunctionProperties::from_source(self.environment.as_ref()))
    }

    fn pass(
        &mut self,
        definitions: &str,
        sources: &[&str],
        properties: StreamFunctionProperties,
    ) -> Result<RegistrationReport, RegistrarError> {
        let catalog = Arc::clone(&self.catalog);
        let inspector = CatalogInspector::new(catalog.as_ref());
        let eligibility = inspector.eligible_definitions(definitions, self.registry.as_ref())?;

        self.transition(RegistrarState::Registering);
        let properties = Arc::new(properties);
        let mut table = BindingTable::new();
        let mut skipped = eligibility.excluded;

        for definition in &eligibility.eligible {
            let descriptor = match inspector.resolve(definition) {
                Ok(descriptor) => descriptor,
                Err(InspectError::HandlerNotFound(_)) => {
                    tracing::warn!(
                        definition = definition.as_str(),
                        "function definition does not resolve to a function; no binding created"
                    );
                    skipped.push(Skipped::new(definition.as_str(), SkipReason::HandlerNotFound));
                    continue;
                }
            };
            let arity = compute_arity(&descriptor);
            let proxy = BindingProxyDescriptor::new(
                descriptor.name,
                arity.inputs,
                arity.outputs,
                Arc::clone(&properties),
            );
            self.register(proxy, &mut table)?;
        }

        for &source in sources {
            if self.is_bindable_source(source)? {
                let proxy = BindingProxyDescriptor::new(source, 0, 1, Arc::clone(&properties));
                self.register(proxy, &mut table)?;
            } else {
                tracing::debug!(source, "source is a catalog function; bound by definition");
                skipped.push(Skipped::new(source, SkipReason::SourceIsFunction));
            }
        }

        self.transition(RegistrarState::Complete);
        tracing::info!(
            bindings = table.len(),
            skipped = skipped.len(),
            "function bindings registered"
        );
        Ok(RegistrationReport {
            definition: None,
            table,
            skipped,
        })
    }

    /// A source gets its own output binding unless it names a catalog
    /// function. A name the catalog resolves to some other function (an
    /// alias or default fallback) still counts as a source when the registry
    /// holds a component under that exact name.
    fn is_bindable_source(&self, source: &str) -> Result<bool, RegistrarError> {
        match self.catalog.lookup(source) {
            None => Ok(true),
            Some(invocation) if invocation.function_definition() != source => {
                Ok(self.registry.contains_component(source)?)
            }
            Some(_) => Ok(false),
        }
    }

    fn register(
        &self,
        proxy: BindingProxyDescriptor,
        table: &mut BindingTable,
    ) -> Result<(), RegistrarError> {
        let proxy = Arc::new(proxy);
        let name = proxy.binding_name.clone();
        let previous = self
            .registry
            .register_component(name.as_str(), Component::Binding(Arc::clone(&proxy)))?;
        if let Some(previous) = previous {
            tracing::warn!(
                binding = %name,
                replaced = previous.kind(),
                "binding name registered twice; keeping the later descriptor"
            );
        }
        tracing::debug!(
            binding = %name,
            inputs = proxy.input_count,
            outputs = proxy.output_count,
            "binding registered"
        );
        table.insert(proxy);
        Ok(())
    }
}
