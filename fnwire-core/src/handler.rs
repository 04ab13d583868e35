//! Functional handlers and the capability interfaces that declare their shape.
//!
//! Authors implement one of [`Supplies`], [`Consumes`] or [`Transforms`],
//! naming the declared input/output types as generic parameters. The
//! adapters in this module turn those into [`FunctionHandler`] trait objects
//! whose [`TypeShape`] is derived from the declared types, so arity is never
//! guessed from a runtime signature.

use crate::error::HandlerError;
use crate::shape::{Describe, TypeShape};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// A message flowing through a handler: JSON payload plus string headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message body.
    pub payload: serde_json::Value,
    /// Message headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Message {
    /// Create a message without headers.
    pub fn new(payload: impl Into<serde_json::Value>) -> Self {
        Self {
            payload: payload.into(),
            headers: BTreeMap::new(),
        }
    }

    /// Add a header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Read a header.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }
}

/// How a handler is classified for binding purposes.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    /// Output only.
    Supplier,
    /// Input only.
    Consumer,
    /// Input and output.
    Transformer,
    /// The reserved dispatcher forwarding to other handlers by name.
    Routing,
}

/// A callable functional handler with a declared shape.
///
/// `apply` receives `None` for suppliers and returns `None` for consumers.
#[async_trait]
pub trait FunctionHandler: Send + Sync {
    /// The declared shape.
    fn shape(&self) -> &TypeShape;

    /// Invoke the handler once.
    async fn apply(&self, input: Option<Message>) -> Result<Option<Message>, HandlerError>;
}

/// Capability: produces values of the declared type `T`.
#[async_trait]
pub trait Supplies<T: Describe>: Send + Sync {
    /// Produce the next message.
    async fn supply(&self) -> Result<Message, HandlerError>;
}

/// Capability: accepts values of the declared type `T`.
#[async_trait]
pub trait Consumes<T: Describe>: Send + Sync {
    /// Accept one message.
    async fn consume(&self, message: Message) -> Result<(), HandlerError>;
}

/// Capability: maps values of declared type `T` to declared type `R`.
#[async_trait]
pub trait Transforms<T: Describe, R: Describe>: Send + Sync {
    /// Transform one message.
    async fn transform(&self, message: Message) -> Result<Message, HandlerError>;
}

fn missing_input(handler: &str) -> HandlerError {
    HandlerError::InvalidInput {
        handler: handler.into(),
        message: "an input message is required".into(),
    }
}

/// Adapts a [`Supplies`] implementation into a [`FunctionHandler`].
pub struct SupplierHandler<T, S> {
    inner: S,
    shape: TypeShape,
    _declared: PhantomData<fn() -> T>,
}

impl<T: Describe, S: Supplies<T>> SupplierHandler<T, S> {
    /// Wrap a supplier; its shape is `() -> T`.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            shape: TypeShape::of_supplier::<T>(),
            _declared: PhantomData,
        }
    }
}

#[async_trait]
impl<T, S> FunctionHandler for SupplierHandler<T, S>
where
    T: Describe + 'static,
    S: Supplies<T> + 'static,
{
    fn shape(&self) -> &TypeShape {
        &self.shape
    }

    async fn apply(&self, _input: Option<Message>) -> Result<Option<Message>, HandlerError> {
        self.inner.supply().await.map(Some)
    }
}

/// Adapts a [`Consumes`] implementation into a [`FunctionHandler`].
pub struct ConsumerHandler<T, C> {
    inner: C,
    shape: TypeShape,
    _declared: PhantomData<fn() -> T>,
}

impl<T: Describe, C: Consumes<T>> ConsumerHandler<T, C> {
    /// Wrap a consumer; its shape is `T -> ()`.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            shape: TypeShape::of_consumer::<T>(),
            _declared: PhantomData,
        }
    }
}

#[async_trait]
impl<T, C> FunctionHandler for ConsumerHandler<T, C>
where
    T: Describe + 'static,
    C: Consumes<T> + 'static,
{
    fn shape(&self) -> &TypeShape {
        &self.shape
    }

    async fn apply(&self, input: Option<Message>) -> Result<Option<Message>, HandlerError> {
        let message = input.ok_or_else(|| missing_input("consumer"))?;
        self.inner.consume(message).await?;
        Ok(None)
    }
}

/// Adapts a [`Transforms`] implementation into a [`FunctionHandler`].
pub struct TransformerHandler<T, R, F> {
    inner: F,
    shape: TypeShape,
    _declared: PhantomData<fn(T) -> R>,
}

impl<T: Describe, R: Describe, F: Transforms<T, R>> TransformerHandler<T, R, F> {
    /// Wrap a transformer; its shape is `T -> R`.
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            shape: TypeShape::of_function::<T, R>(),
            _declared: PhantomData,
        }
    }
}

#[async_trait]
impl<T, R, F> FunctionHandler for TransformerHandler<T, R, F>
where
    T: Describe + 'static,
    R: Describe + 'static,
    F: Transforms<T, R> + 'static,
{
    fn shape(&self) -> &TypeShape {
        &self.shape
    }

    async fn apply(&self, input: Option<Message>) -> Result<Option<Message>, HandlerError> {
        let message = input.ok_or_else(|| missing_input("function"))?;
        self.inner.transform(message).await.map(Some)
    }
}

type SupplyFn = dyn Fn() -> Result<Message, HandlerError> + Send + Sync;
type ConsumeFn = dyn Fn(Message) -> Result<(), HandlerError> + Send + Sync;
type TransformFn = dyn Fn(Message) -> Result<Message, HandlerError> + Send + Sync;

enum FnBody {
    Supplier(Arc<SupplyFn>),
    Consumer(Arc<ConsumeFn>),
    Function(Arc<TransformFn>),
}

/// A handler built from a synchronous closure plus declared types.
///
/// ```
/// use fnwire_core::handler::{FnHandler, Message};
/// use fnwire_core::shape::Many;
///
/// let upper = FnHandler::function::<Many<String>, Many<String>>(|m: Message| {
///     let text = m.payload.as_str().unwrap_or_default().to_uppercase();
///     Ok(Message::new(text))
/// });
/// assert_eq!(fnwire_core::FunctionHandler::shape(&upper).output_count(), 1);
/// ```
pub struct FnHandler {
    shape: TypeShape,
    body: FnBody,
}

impl FnHandler {
    /// A supplier producing declared type `T`.
    pub fn supplier<T: Describe>(
        f: impl Fn() -> Result<Message, HandlerError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            shape: TypeShape::of_supplier::<T>(),
            body: FnBody::Supplier(Arc::new(f)),
        }
    }

    /// A consumer of declared type `T`.
    pub fn consumer<T: Describe>(
        f: impl Fn(Message) -> Result<(), HandlerError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            shape: TypeShape::of_consumer::<T>(),
            body: FnBody::Consumer(Arc::new(f)),
        }
    }

    /// A function from declared type `T` to declared type `R`.
    pub fn function<T: Describe, R: Describe>(
        f: impl Fn(Message) -> Result<Message, HandlerError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            shape: TypeShape::of_function::<T, R>(),
            body: FnBody::Function(Arc::new(f)),
        }
    }

    /// Replace the declared shape, e.g. to tag it for the stream-table binder.
    pub fn with_shape(mut self, shape: TypeShape) -> Self {
        self.shape = shape;
        self
    }
}

#[async_trait]
impl FunctionHandler for FnHandler {
    fn shape(&self) -> &TypeShape {
        &self.shape
    }

    async fn apply(&self, input: Option<Message>) -> Result<Option<Message>, HandlerError> {
        match &self.body {
            FnBody::Supplier(f) => f().map(Some),
            FnBody::Consumer(f) => {
                f(input.ok_or_else(|| missing_input("consumer"))?)?;
                Ok(None)
            }
            FnBody::Function(f) => f(input.ok_or_else(|| missing_input("function"))?).map(Some),
        }
    }
}
