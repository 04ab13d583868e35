#![deny(missing_docs)]
//! In-memory implementations of fnwire's registry and catalog protocols.
//!
//! [`MemoryRegistry`] holds components in a `HashMap` behind a `RwLock`.
//! [`MemoryCatalog`] is a view over the registry's function components that
//! resolves compositions, aliases, the default function and the routing
//! handler. Suitable for tests and single-process applications.

mod catalog;
mod registry;
mod routing;

pub use catalog::{ComposedHandler, MemoryCatalog};
pub use registry::MemoryRegistry;
pub use routing::{RoutingExpression, RoutingHandler, ROUTE_HEADER};
