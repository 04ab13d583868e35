use crate::registrar::RegistrarState;
use fnwire_core::error::RegistryError;
use serde::Serialize;
use thiserror::Error;

/// Errors that abort a registration pass.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RegistrarError {
    /// The component registry could not be read or written.
    #[error("registry access failure: {0}")]
    Registry(#[from] RegistryError),

    /// The registrar runs once per startup.
    #[error("registrar already ran (state: {0:?})")]
    AlreadyRun(RegistrarState),
}

/// A catalog lookup that found nothing.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum InspectError {
    /// No handler for the definition.
    #[error("function not found: {0}")]
    HandlerNotFound(String),
}

/// Why a definition or source produced no binding.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The catalog could not resolve the definition.
    HandlerNotFound,
    /// A constituent belongs to the streaming-table binder.
    IneligibleDefinition {
        /// The stream-table constituent.
        constituent: String,
    },
    /// The source name is itself a catalog function and is bound through
    /// its definition instead.
    SourceIsFunction,
}

/// A definition or source that was skipped, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    /// The definition or source name.
    pub name: String,
    /// Why it was skipped.
    #[serde(flatten)]
    pub reason: SkipReason,
}

impl Skipped {
    /// Record a skip.
    pub fn new(name: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            name: name.into(),
            reason,
        }
    }
}
