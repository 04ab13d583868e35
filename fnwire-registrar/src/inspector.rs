//! Catalog inspection: resolving definitions to classified handlers and
//! filtering out definitions that belong to the streaming-table binder.

use crate::error::{InspectError, SkipReason, Skipped};
use fnwire_core::catalog::{
    constituents, definition_list, FunctionCatalog, FunctionInvocation, ROUTING_FUNCTION_NAME,
};
use fnwire_core::error::RegistryError;
use fnwire_core::handler::HandlerKind;
use fnwire_core::id::FunctionName;
use fnwire_core::registry::ComponentRegistry;
use fnwire_core::shape::TypeShape;
use serde::Serialize;

/// A handler resolved from the catalog and classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerDescriptor {
    /// The definition it was resolved under.
    pub name: FunctionName,
    /// Classification.
    pub kind: HandlerKind,
    /// Declared shape.
    pub shape: TypeShape,
}

/// Classify an invocation resolved under `name`.
///
/// Suppliers are recognized first; otherwise the reserved routing name
/// wins over the declared shape.
pub fn classify(name: &str, invocation: &FunctionInvocation) -> HandlerKind {
    if invocation.is_supplier() {
        HandlerKind::Supplier
    } else if name == ROUTING_FUNCTION_NAME {
        HandlerKind::Routing
    } else if invocation.is_consumer() {
        HandlerKind::Consumer
    } else {
        HandlerKind::Transformer
    }
}

/// Result of filtering a definition list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Eligibility {
    /// Definitions to bind, in list order.
    pub eligible: Vec<String>,
    /// Definitions excluded for the streaming-table binder.
    pub excluded: Vec<Skipped>,
}

/// Looks handlers up in a catalog and classifies them.
pub struct CatalogInspector<'a> {
    catalog: &'a dyn FunctionCatalog,
}

impl<'a> CatalogInspector<'a> {
    /// Inspect `catalog`.
    pub fn new(catalog: &'a dyn FunctionCatalog) -> Self {
        Self { catalog }
    }

    /// Resolve and classify `name`.
    pub fn resolve(&self, name: &str) -> Result<HandlerDescriptor, InspectError> {
        let not_found = || InspectError::HandlerNotFound(name.to_owned());
        let function = FunctionName::parse(name).ok_or_else(not_found)?;
        let invocation = self.catalog.lookup(function.as_str()).ok_or_else(not_found)?;
        Ok(HandlerDescriptor {
            kind: classify(function.as_str(), &invocation),
            name: function,
            shape: invocation.function_type().clone(),
        })
    }

    /// Filter a `;`-delimited definition list.
    ///
    /// A definition is excluded when any of its constituents is tagged for
    /// the streaming-table binder. A constituent that is not registered is
    /// reported with a warning and does not exclude the definition.
    pub fn eligible_definitions(
        &self,
        list: &str,
        registry: &dyn ComponentRegistry,
    ) -> Result<Eligibility, RegistryError> {
        let mut result = Eligibility::default();
        'definitions: for definition in definition_list(list) {
            for name in constituents(definition) {
                let shape = match registry.get_component(name)? {
                    Some(component) => component.shape().cloned(),
                    None => match self.catalog.lookup(name) {
                        Some(invocation) => Some(invocation.function_type().clone()),
                        None => {
                            tracing::warn!(
                                function = name,
                                "function definition references a function that does not exist"
                            );
                            continue;
                        }
                    },
                };
                if shape.as_ref().is_some_and(TypeShape::is_stream_table) {
                    tracing::warn!(
                        definition,
                        constituent = name,
                        "definition belongs to the stream-table binder; not binding"
                    );
                    result.excluded.push(Skipped::new(
                        definition,
                        SkipReason::IneligibleDefinition {
                            constituent: name.to_owned(),
                        },
                    ));
                    continue 'definitions;
                }
            }
            result.eligible.push(definition.to_owned());
        }
        Ok(result)
    }
}
