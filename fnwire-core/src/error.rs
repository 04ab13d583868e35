//! Error types for each protocol.

use thiserror::Error;

/// Component registry errors.
///
/// Any of these during a registration pass is fatal: the registry is the
/// one shared resource the registrar cannot work around.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry cannot be read or written (poisoned lock, closed context).
    #[error("registry unavailable: {0}")]
    Unavailable(String),

    /// The registry refused a registration.
    #[error("registration of {name} rejected: {reason}")]
    Rejected {
        /// Component name that was refused.
        name: String,
        /// Why the registry refused it.
        reason: String,
    },

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Handler invocation errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A supplier-only handler was given an input, or a handler that needs
    /// input was called without one.
    #[error("handler {handler} invoked with the wrong input: {message}")]
    InvalidInput {
        /// Handler definition.
        handler: String,
        /// What was wrong.
        message: String,
    },

    /// The routing handler could not find the target function.
    #[error("no function to route to: {0}")]
    RouteNotFound(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Destination binder errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BinderError {
    /// The destination could not be reached or created.
    #[error("destination {destination} unavailable: {message}")]
    DestinationUnavailable {
        /// Destination name.
        destination: String,
        /// Transport-level detail.
        message: String,
    },

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Configuration errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A property held a value that could not be parsed.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Property key.
        key: String,
        /// Raw value found.
        value: String,
    },
}
