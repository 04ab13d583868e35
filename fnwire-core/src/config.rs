//! Configuration surface: property keys and the property source protocol.

use crate::error::ConfigError;
use std::collections::BTreeMap;

/// Property keys read during registration.
///
/// The autodetect and routing flags live under `stream.function.`, so
/// `function.autodetect` and `function.routing.enabled` are spelled
/// [`AUTODETECT`](keys::AUTODETECT) and
/// [`ROUTING_ENABLED`](keys::ROUTING_ENABLED) here.
pub mod keys {
    /// Explicit `;`-delimited list of function definitions to bind.
    pub const STREAM_DEFINITION: &str = "stream.function.definition";
    /// Fallback single definition.
    pub const FUNCTION_DEFINITION: &str = "function.definition";
    /// Enable default-function autodetection (default `true`).
    pub const AUTODETECT: &str = "stream.function.autodetect";
    /// Force binding of the routing handler (default `false`).
    pub const ROUTING_ENABLED: &str = "stream.function.routing.enabled";
    /// Routing expression; its presence alone enables routing.
    pub const ROUTING_EXPRESSION: &str = "function.routing-expression";
    /// `;`-delimited list of output-only source names.
    pub const SOURCE: &str = "stream.source";
    /// Prefix of per-channel binding properties.
    pub const BINDINGS_PREFIX: &str = "stream.bindings.";
    /// Suffix of the per-channel destination override.
    pub const DESTINATION_SUFFIX: &str = ".destination";

    /// Key of the destination override for `channel`.
    pub fn destination(channel: &str) -> String {
        format!("{BINDINGS_PREFIX}{channel}{DESTINATION_SUFFIX}")
    }
}

/// Protocol: Property source.
///
/// A read-only view of configuration properties keyed by dotted names.
pub trait PropertySource: Send + Sync {
    /// The raw value of `key`, if set.
    fn property(&self, key: &str) -> Option<String>;

    /// Whether `key` is set at all, even to an empty value.
    fn contains_property(&self, key: &str) -> bool {
        self.property(key).is_some()
    }

    /// Keys starting with `prefix`. Sources that cannot enumerate their
    /// keys return an empty list.
    fn keys_with_prefix(&self, _prefix: &str) -> Vec<String> {
        Vec::new()
    }
}

/// The value of `key` if it contains non-whitespace text.
pub fn text_property(source: &dyn PropertySource, key: &str) -> Option<String> {
    source.property(key).filter(|v| !v.trim().is_empty())
}

/// Parse a boolean property, `default` when unset.
pub fn bool_property(
    source: &dyn PropertySource,
    key: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    match source.property(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            "" => Ok(default),
            _ => Err(ConfigError::InvalidValue {
                key: key.into(),
                value: raw,
            }),
        },
    }
}

/// In-memory property source backed by a sorted map.
#[derive(Debug, Clone, Default)]
pub struct MapProperties {
    values: BTreeMap<String, String>,
}

impl MapProperties {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl PropertySource for MapProperties {
    fn property(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.values
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_property_parses_and_defaults() {
        let props = MapProperties::new()
            .with("a", "TRUE")
            .with("b", "off")
            .with("c", "maybe");
        assert!(bool_property(&props, "a", false).unwrap());
        assert!(!bool_property(&props, "b", true).unwrap());
        assert!(bool_property(&props, "missing", true).unwrap());
        assert!(bool_property(&props, "c", true).is_err());
    }

    #[test]
    fn text_property_ignores_blank() {
        let props = MapProperties::new().with("blank", "   ");
        assert_eq!(text_property(&props, "blank"), None);
        assert!(props.contains_property("blank"));
    }
}
