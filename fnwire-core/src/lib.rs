//! # fnwire-core: protocol types for binding functional handlers
//!
//! This crate defines the vocabulary shared by the registrar and the
//! collaborators it talks to. It performs no I/O.
//!
//! ## The Protocols
//!
//! | Protocol | Trait | What it does |
//! |----------|-------|-------------|
//! | ① Catalog | [`FunctionCatalog`] | Resolve a definition to a callable handler |
//! | ② Registry | [`ComponentRegistry`] | Hold named components, including bindings |
//! | ③ Binder | [`DestinationBinder`] | Attach channels to broker destinations |
//! | ④ Properties | [`PropertySource`] | Read configuration by dotted key |
//!
//! ## Declared shapes
//!
//! Handlers declare their arity through [`Supplies`], [`Consumes`] and
//! [`Transforms`]; the declared types map to a [`TypeShape`] via
//! [`Describe`]. Handlers belonging to the streaming-table binder carry
//! [`BinderAffinity::StreamTable`] and are never given binding proxies.

#![deny(missing_docs)]

pub mod binding;
pub mod catalog;
pub mod config;
pub mod error;
pub mod handler;
pub mod id;
pub mod registry;
pub mod shape;

#[cfg(feature = "test-utils")]
pub mod test_utils;

// Re-exports for convenience
pub use binding::{
    BindingProxyDescriptor, BindingTable, ChannelBinding, ChannelRole, DestinationBinder,
    StreamFunctionProperties,
};
pub use catalog::{FunctionCatalog, FunctionInvocation, ROUTING_FUNCTION_NAME};
pub use config::{MapProperties, PropertySource};
pub use error::{BinderError, ConfigError, HandlerError, RegistryError};
pub use handler::{
    ConsumerHandler, Consumes, FnHandler, FunctionHandler, HandlerKind, Message, SupplierHandler,
    Supplies, TransformerHandler, Transforms,
};
pub use id::{BindingName, FunctionName};
pub use registry::{Component, ComponentRegistry};
pub use shape::{BinderAffinity, Describe, Many, Msg, Single, TypeRef, TypeShape};
