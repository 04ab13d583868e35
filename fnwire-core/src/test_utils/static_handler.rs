//! StaticHandler: a handler with an arbitrary declared shape.

use crate::error::HandlerError;
use crate::handler::{FunctionHandler, Message};
use crate::shape::TypeShape;
use async_trait::async_trait;

/// A handler that declares whatever shape it is given and echoes its input.
///
/// Suppliers return a `null` payload; consumers return nothing.
pub struct StaticHandler {
    shape: TypeShape,
}

impl StaticHandler {
    /// Create a handler declaring `shape`.
    pub fn new(shape: TypeShape) -> Self {
        Self { shape }
    }
}

#[async_trait]
impl FunctionHandler for StaticHandler {
    fn shape(&self) -> &TypeShape {
        &self.shape
    }

    async fn apply(&self, input: Option<Message>) -> Result<Option<Message>, HandlerError> {
        if self.shape.output.is_none() {
            return Ok(None);
        }
        Ok(Some(input.unwrap_or_else(|| Message::new(serde_json::Value::Null))))
    }
}
