//! Binding proxy descriptors, the binding table, and the destination
//! binder protocol.

use crate::config::{keys, PropertySource};
use crate::error::BinderError;
use crate::id::{BindingName, FunctionName};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Process-wide stream-function configuration shared by every descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamFunctionProperties {
    /// Effective `;`-delimited definition list.
    pub definition: Option<String>,
    /// Per-channel destination overrides.
    #[serde(default)]
    pub destinations: BTreeMap<String, String>,
}

impl StreamFunctionProperties {
    /// Empty properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the explicit definition and destination overrides from `source`.
    pub fn from_source(source: &dyn PropertySource) -> Self {
        let definition = crate::config::text_property(source, keys::STREAM_DEFINITION);
        let destinations = source
            .keys_with_prefix(keys::BINDINGS_PREFIX)
            .into_iter()
            .filter_map(|key| {
                let channel = key
                    .strip_prefix(keys::BINDINGS_PREFIX)?
                    .strip_suffix(keys::DESTINATION_SUFFIX)?
                    .to_owned();
                let destination = source.property(&key)?;
                Some((channel, destination))
            })
            .collect();
        Self {
            definition,
            destinations,
        }
    }

    /// Builder-style definition.
    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }

    /// Builder-style destination override.
    pub fn with_destination(
        mut self,
        channel: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        self.destinations.insert(channel.into(), destination.into());
        self
    }

    /// The definition if it contains text.
    pub fn definition(&self) -> Option<&str> {
        self.definition
            .as_deref()
            .filter(|d| !d.trim().is_empty())
    }

    /// Destination for `channel`: the override, or the channel name itself.
    pub fn destination_for<'a>(&'a self, channel: &'a str) -> &'a str {
        self.destinations
            .get(channel)
            .map(String::as_str)
            .unwrap_or(channel)
    }
}

/// The unit registered per bound handler: how many channels to create
/// for it and which shared properties apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingProxyDescriptor {
    /// Function definition the channels belong to.
    pub function: FunctionName,
    /// Registry name, `<definition>_binding`.
    pub binding_name: BindingName,
    /// Number of input channels.
    pub input_count: usize,
    /// Number of output channels.
    pub output_count: usize,
    #[serde(skip)]
    properties: Arc<StreamFunctionProperties>,
}

impl BindingProxyDescriptor {
    /// Create a descriptor for `function`.
    pub fn new(
        function: impl Into<FunctionName>,
        input_count: usize,
        output_count: usize,
        properties: Arc<StreamFunctionProperties>,
    ) -> Self {
        let function = function.into();
        Self {
            binding_name: function.binding_name(),
            function,
            input_count,
            output_count,
            properties,
        }
    }

    /// The shared properties.
    pub fn properties(&self) -> &Arc<StreamFunctionProperties> {
        &self.properties
    }

    /// Channel name prefix: the definition with composition operators removed.
    pub fn channel_prefix(&self) -> String {
        self.function.channel_prefix()
    }

    /// `<prefix>-in-<i>` for each input.
    pub fn input_channels(&self) -> Vec<String> {
        let prefix = self.channel_prefix();
        (0..self.input_count)
            .map(|i| format!("{prefix}-in-{i}"))
            .collect()
    }

    /// `<prefix>-out-<i>` for each output.
    pub fn output_channels(&self) -> Vec<String> {
        let prefix = self.channel_prefix();
        (0..self.output_count)
            .map(|i| format!("{prefix}-out-{i}"))
            .collect()
    }
}

/// Direction of a bound channel.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelRole {
    /// Messages arrive from the destination.
    Input,
    /// Messages are published to the destination.
    Output,
}

/// One channel attached to a destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelBinding {
    /// Channel name.
    pub channel: String,
    /// Broker destination.
    pub destination: String,
    /// Direction.
    pub role: ChannelRole,
}

/// Protocol: Destination binder.
///
/// Physically attaches channels to broker destinations. Implementations own
/// the transport; delivery guarantees and retries are theirs.
#[async_trait]
pub trait DestinationBinder: Send + Sync {
    /// Subscribe `channel` to messages arriving at `destination`.
    async fn bind_consumer(&self, destination: &str, channel: &str) -> Result<(), BinderError>;

    /// Publish messages sent on `channel` to `destination`.
    async fn bind_producer(&self, destination: &str, channel: &str) -> Result<(), BinderError>;
}

/// Ordered, name-unique set of binding descriptors produced by one
/// registration pass.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct BindingTable {
    entries: Vec<Arc<BindingProxyDescriptor>>,
}

impl BindingTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a descriptor. A descriptor with the same binding name is
    /// replaced whole, in place, and returned.
    pub fn insert(
        &mut self,
        descriptor: Arc<BindingProxyDescriptor>,
    ) -> Option<Arc<BindingProxyDescriptor>> {
        match self
            .entries
            .iter_mut()
            .find(|d| d.binding_name == descriptor.binding_name)
        {
            Some(slot) => Some(std::mem::replace(slot, descriptor)),
            None => {
                self.entries.push(descriptor);
                None
            }
        }
    }

    /// Look up by binding name.
    pub fn get(&self, binding_name: &str) -> Option<&Arc<BindingProxyDescriptor>> {
        self.entries
            .iter()
            .find(|d| d.binding_name.as_str() == binding_name)
    }

    /// Descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<BindingProxyDescriptor>> {
        self.entries.iter()
    }

    /// Binding names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|d| d.binding_name.as_str()).collect()
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attach every channel of every descriptor through `binder`, inputs
    /// before outputs, in registration order. Stops at the first error.
    pub async fn attach(
        &self,
        binder: &dyn DestinationBinder,
    ) -> Result<Vec<ChannelBinding>, BinderError> {
        let mut bound = Vec::new();
        for descriptor in &self.entries {
            let props = descriptor.properties();
            for channel in descriptor.input_channels() {
                let destination = props.destination_for(&channel).to_owned();
                binder.bind_consumer(&destination, &channel).await?;
                tracing::debug!(%channel, %destination, "bound input channel");
                bound.push(ChannelBinding {
                    channel,
                    destination,
                    role: ChannelRole::Input,
                });
            }
            for channel in descriptor.output_channels() {
                let destination = props.destination_for(&channel).to_owned();
                binder.bind_producer(&destination, &channel).await?;
                tracing::debug!(%channel, %destination, "bound output channel");
                bound.push(ChannelBinding {
                    channel,
                    destination,
                    role: ChannelRole::Output,
                });
            }
        }
        Ok(bound)
    }
}
