#![deny(missing_docs)]
//! Startup registrar that turns configured function definitions into
//! binding proxy descriptors.
//!
//! A pass runs once per process start:
//!
//! 1. the [`DefinitionChain`] picks the definition list (explicit
//!    definition, environment fallback, routing, or the single default
//!    function);
//! 2. the [`CatalogInspector`] drops definitions that belong to the
//!    streaming-table binder and classifies the rest;
//! 3. [`compute_arity`] derives input and output channel counts;
//! 4. the [`FunctionBindingRegistrar`] registers one descriptor per
//!    definition, plus an output-only descriptor per configured source.
//!
//! Definitions that cannot be bound are logged and reported in
//! [`RegistrationReport::skipped`]; only registry failures abort the pass.

mod arity;
pub mod definition;
mod error;
mod inspector;
mod registrar;

pub use arity::{compute_arity, Arity};
pub use definition::{
    DefinitionChain, DefinitionResolver, DefinitionSource, ResolutionContext, ResolvedDefinition,
};
pub use error::{InspectError, RegistrarError, SkipReason, Skipped};
pub use inspector::{classify, CatalogInspector, Eligibility, HandlerDescriptor};
pub use registrar::{FunctionBindingRegistrar, RegistrarState, RegistrationReport};
