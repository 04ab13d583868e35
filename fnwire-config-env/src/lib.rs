#![deny(missing_docs)]
//! Property sources backed by process environment variables.
//!
//! [`EnvProperties`] maps a dotted key such as `stream.function.definition`
//! to `FNWIRE_STREAM_FUNCTION_DEFINITION`. [`LayeredProperties`] stacks
//! several sources so that, for example, environment variables override a
//! map of defaults.

use fnwire_core::config::PropertySource;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Default variable prefix.
pub const DEFAULT_PREFIX: &str = "FNWIRE_";

/// Reads properties from environment variables.
///
/// The variable name is the prefix followed by the key upper-cased, with
/// `.` and `-` replaced by `_`:
///
/// | Key | Variable |
/// |-----|----------|
/// | `stream.source` | `FNWIRE_STREAM_SOURCE` |
/// | `function.routing-expression` | `FNWIRE_FUNCTION_ROUTING_EXPRESSION` |
///
/// The mapping is one-way, so this source cannot enumerate keys.
#[derive(Debug, Clone)]
pub struct EnvProperties {
    prefix: String,
}

impl EnvProperties {
    /// Read variables with the [`DEFAULT_PREFIX`].
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_PREFIX)
    }

    /// Read variables with a custom prefix (may be empty).
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The environment variable consulted for `key`.
    pub fn var_name(&self, key: &str) -> String {
        let mapped: String = key
            .chars()
            .map(|c| match c {
                '.' | '-' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();
        format!("{}{mapped}", self.prefix)
    }
}

impl Default for EnvProperties {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertySource for EnvProperties {
    fn property(&self, key: &str) -> Option<String> {
        let var = self.var_name(key);
        match std::env::var(&var) {
            Ok(value) => Some(value),
            Err(std::env::VarError::NotPresent) => None,
            Err(std::env::VarError::NotUnicode(_)) => {
                tracing::warn!(key, var = var.as_str(), "ignoring non-unicode environment variable");
                None
            }
        }
    }
}

/// Consults several sources in order; the first that has a key wins.
#[derive(Clone, Default)]
pub struct LayeredProperties {
    layers: Vec<Arc<dyn PropertySource>>,
}

impl LayeredProperties {
    /// No layers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer below the existing ones.
    pub fn with_layer(mut self, layer: Arc<dyn PropertySource>) -> Self {
        self.layers.push(layer);
        self
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether there are no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl std::fmt::Debug for LayeredProperties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayeredProperties")
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl PropertySource for LayeredProperties {
    fn property(&self, key: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.property(key))
    }

    fn contains_property(&self, key: &str) -> bool {
        self.layers.iter().any(|layer| layer.contains_property(key))
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let keys: BTreeSet<String> = self
            .layers
            .iter()
            .flat_map(|layer| layer.keys_with_prefix(prefix))
            .collect();
        keys.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnwire_core::config::{keys, MapProperties};

    fn _assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn object_safety() {
        _assert_send_sync::<EnvProperties>();
        _assert_send_sync::<LayeredProperties>();
        let _: Arc<dyn PropertySource> = Arc::new(EnvProperties::new());
        let _: Arc<dyn PropertySource> = Arc::new(LayeredProperties::new());
    }

    #[test]
    fn maps_keys_to_variable_names() {
        let env = EnvProperties::new();
        assert_eq!(
            env.var_name(keys::STREAM_DEFINITION),
            "FNWIRE_STREAM_FUNCTION_DEFINITION"
        );
        assert_eq!(
            env.var_name(keys::ROUTING_EXPRESSION),
            "FNWIRE_FUNCTION_ROUTING_EXPRESSION"
        );
        assert_eq!(
            env.var_name(&keys::destination("onReceive-in-0")),
            "FNWIRE_STREAM_BINDINGS_ONRECEIVE_IN_0_DESTINATION"
        );
        assert_eq!(EnvProperties::with_prefix("").var_name("path"), "PATH");
    }

    #[test]
    fn reads_set_variable() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("FNWIRE_TEST_ENV_SOURCE", "sendMessages") };
        let env = EnvProperties::new();
        assert_eq!(env.property("test.env-source").as_deref(), Some("sendMessages"));
        assert!(env.contains_property("test.env.source"));
        // SAFETY: as above.
        unsafe { std::env::remove_var("FNWIRE_TEST_ENV_SOURCE") };
    }

    #[test]
    fn missing_variable_is_none() {
        let env = EnvProperties::with_prefix("FNWIRE_TEST_MISSING_");
        assert!(env.property("anything").is_none());
        assert!(env.keys_with_prefix("").is_empty());
    }

    #[test]
    fn first_layer_wins() {
        let top = MapProperties::new().with(keys::SOURCE, "top");
        let bottom = MapProperties::new()
            .with(keys::SOURCE, "bottom")
            .with(keys::AUTODETECT, "false");
        let layered = LayeredProperties::new()
            .with_layer(Arc::new(top))
            .with_layer(Arc::new(bottom));

        assert_eq!(layered.len(), 2);
        assert_eq!(layered.property(keys::SOURCE).as_deref(), Some("top"));
        assert_eq!(layered.property(keys::AUTODETECT).as_deref(), Some("false"));
        assert!(layered.property(keys::STREAM_DEFINITION).is_none());
    }

    #[test]
    fn enumerates_keys_across_layers() {
        let a = MapProperties::new().with(keys::destination("x-in-0"), "q1");
        let b = MapProperties::new()
            .with(keys::destination("x-in-0"), "q2")
            .with(keys::destination("x-out-0"), "q3");
        let layered = LayeredProperties::new()
            .with_layer(Arc::new(a))
            .with_layer(Arc::new(EnvProperties::new()))
            .with_layer(Arc::new(b));

        assert_eq!(
            layered.keys_with_prefix(keys::BINDINGS_PREFIX),
            vec![
                "stream.bindings.x-in-0.destination",
                "stream.bindings.x-out-0.destination"
            ]
        );
    }
}
