//! Names of functions and of the binding descriptors registered for them.

use crate::catalog::constituents;
use serde::Serialize;
use std::fmt;

/// Suffix appended to a function definition to form its binding name.
pub const BINDING_SUFFIX: &str = "_binding";

/// One function definition: a single name, or a composition such as `a|b`
/// or `a,b`. Surrounding whitespace is not part of the name.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct FunctionName(String);

impl FunctionName {
    /// Wrap a definition, trimming surrounding whitespace.
    pub fn new(definition: impl AsRef<str>) -> Self {
        Self(definition.as_ref().trim().to_owned())
    }

    /// A definition usable as a binding target: `None` when it is blank or
    /// is a `;`-delimited list rather than a single definition.
    pub fn parse(definition: &str) -> Option<Self> {
        let name = Self::new(definition);
        (!name.0.is_empty() && !name.0.contains(';')).then_some(name)
    }

    /// Borrow the definition text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Function names making up the definition, in pipeline order.
    pub fn constituents(&self) -> Vec<&str> {
        constituents(&self.0)
    }

    /// Whether the definition composes more than one function.
    pub fn is_composed(&self) -> bool {
        self.constituents().len() > 1
    }

    /// Channel name prefix: the definition with composition operators removed.
    pub fn channel_prefix(&self) -> String {
        self.0.replace(['|', ','], "")
    }

    /// The registry name of this definition's binding descriptor.
    pub fn binding_name(&self) -> BindingName {
        BindingName(format!("{}{BINDING_SUFFIX}", self.0))
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FunctionName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for FunctionName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Registry name of a binding descriptor, always `<definition>_binding`.
///
/// Only obtainable from [`FunctionName::binding_name`].
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct BindingName(String);

impl BindingName {
    /// Borrow the registry name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The definition this binding was derived from.
    pub fn function(&self) -> &str {
        self.0.strip_suffix(BINDING_SUFFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for BindingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
