//! RecordingBinder: records every attachment request.

use crate::binding::{ChannelBinding, ChannelRole, DestinationBinder};
use crate::error::BinderError;
use async_trait::async_trait;
use std::sync::Mutex;

/// A binder that accepts every request and records it.
/// Use `.bindings()` to inspect what was recorded.
pub struct RecordingBinder {
    bindings: Mutex<Vec<ChannelBinding>>,
    reject: Option<String>,
}

impl RecordingBinder {
    /// A binder that accepts everything.
    pub fn new() -> Self {
        Self {
            bindings: Mutex::new(Vec::new()),
            reject: None,
        }
    }

    /// A binder that fails for one destination.
    pub fn rejecting(destination: impl Into<String>) -> Self {
        Self {
            bindings: Mutex::new(Vec::new()),
            reject: Some(destination.into()),
        }
    }

    /// Snapshot of recorded bindings.
    pub fn bindings(&self) -> Vec<ChannelBinding> {
        self.bindings.lock().unwrap().clone()
    }

    fn record(&self, destination: &str, channel: &str, role: ChannelRole) -> Result<(), BinderError> {
        if self.reject.as_deref() == Some(destination) {
            return Err(BinderError::DestinationUnavailable {
                destination: destination.into(),
                message: "rejected by test binder".into(),
            });
        }
        self.bindings.lock().unwrap().push(ChannelBinding {
            channel: channel.into(),
            destination: destination.into(),
            role,
        });
        Ok(())
    }
}

impl Default for RecordingBinder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DestinationBinder for RecordingBinder {
    async fn bind_consumer(&self, destination: &str, channel: &str) -> Result<(), BinderError> {
        self.record(destination, channel, ChannelRole::Input)
    }

    async fn bind_producer(&self, destination: &str, channel: &str) -> Result<(), BinderError> {
        self.record(destination, channel, ChannelRole::Output)
    }
}
