#![deny(missing_docs)]
//! # fnwire: umbrella crate
//!
//! A single import surface for fnwire. Re-exports the protocol crate and
//! its implementations behind feature flags, plus a `prelude` for the
//! common startup path.

#[cfg(feature = "catalog-memory")]
pub use fnwire_catalog_memory;
#[cfg(feature = "config-env")]
pub use fnwire_config_env;
#[cfg(feature = "core")]
pub use fnwire_core;
#[cfg(feature = "registrar")]
pub use fnwire_registrar;

/// Happy-path imports for registering function bindings.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use fnwire_core::{
        BinderError, BindingTable, Component, ComponentRegistry, ConsumerHandler, Consumes,
        DestinationBinder, FnHandler, FunctionCatalog, FunctionHandler, HandlerError,
        MapProperties, Many, Message, Msg, PropertySource, Single, StreamFunctionProperties,
        SupplierHandler, Supplies, TransformerHandler, Transforms, TypeShape,
    };

    #[cfg(feature = "catalog-memory")]
    pub use fnwire_catalog_memory::{MemoryCatalog, MemoryRegistry};

    #[cfg(feature = "config-env")]
    pub use fnwire_config_env::{EnvProperties, LayeredProperties};

    #[cfg(feature = "registrar")]
    pub use fnwire_registrar::{
        DefinitionChain, FunctionBindingRegistrar, RegistrarError, RegistrationReport,
    };
}
