//! Declared type shapes of functional handlers.
//!
//! A [`TypeShape`] is what a handler declares about its signature: the
//! structure of its input, the structure of its output, and which binder
//! family it belongs to. Handlers never have their shape inferred; it comes
//! from the [`Describe`] impls of the types named in their capability
//! interface (see [`crate::handler`]).

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Structural description of one side of a handler signature.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "of", rename_all = "snake_case")]
pub enum TypeRef {
    /// The unit type. Nothing flows.
    Unit,
    /// A plain named type.
    Named(String),
    /// A message envelope carrying headers around a payload.
    Message(Box<TypeRef>),
    /// A reactive wrapper producing at most one value.
    Single(Box<TypeRef>),
    /// A reactive wrapper producing any number of values.
    Many(Box<TypeRef>),
    /// Several independent values, one channel each.
    Tuple(Vec<TypeRef>),
}

impl TypeRef {
    /// A plain named type.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Wrap in a single-value reactive wrapper.
    pub fn single(inner: TypeRef) -> Self {
        Self::Single(Box::new(inner))
    }

    /// Wrap in a multi-value reactive wrapper.
    pub fn many(inner: TypeRef) -> Self {
        Self::Many(Box::new(inner))
    }

    /// Wrap in a message envelope.
    pub fn message(inner: TypeRef) -> Self {
        Self::Message(Box::new(inner))
    }

    /// Whether this is the unit type itself.
    pub fn is_unit(&self) -> bool {
        matches!(self, Self::Unit)
    }

    /// Whether this is a single-value wrapper around unit ("fire and forget").
    pub fn is_single_of_unit(&self) -> bool {
        matches!(self, Self::Single(inner) if inner.is_unit())
    }

    /// Number of channels this side of the signature occupies.
    pub fn channel_count(&self) -> usize {
        match self {
            Self::Tuple(items) => items.len(),
            _ => 1,
        }
    }
}

/// Which binder family a handler belongs to.
///
/// Handlers tagged [`BinderAffinity::StreamTable`] are bound by a separate
/// stream-processing binder and never receive a binding proxy from the
/// registrar.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinderAffinity {
    /// Bound through the message-channel binding proxies.
    #[default]
    Core,
    /// Bound by a streaming-table binder.
    StreamTable,
}

/// The declared shape of a handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeShape {
    /// Input side, `None` for suppliers.
    pub input: Option<TypeRef>,
    /// Output side, `None` for consumers.
    pub output: Option<TypeRef>,
    /// Binder family.
    #[serde(default)]
    pub affinity: BinderAffinity,
}

impl TypeShape {
    /// Output only.
    pub fn supplier(output: TypeRef) -> Self {
        Self {
            input: None,
            output: Some(output),
            affinity: BinderAffinity::Core,
        }
    }

    /// Input only.
    pub fn consumer(input: TypeRef) -> Self {
        Self {
            input: Some(input),
            output: None,
            affinity: BinderAffinity::Core,
        }
    }

    /// Input and output.
    pub fn function(input: TypeRef, output: TypeRef) -> Self {
        Self {
            input: Some(input),
            output: Some(output),
            affinity: BinderAffinity::Core,
        }
    }

    /// Shape of a supplier of `T`.
    pub fn of_supplier<T: Describe>() -> Self {
        Self::supplier(T::describe())
    }

    /// Shape of a consumer of `T`.
    pub fn of_consumer<T: Describe>() -> Self {
        Self::consumer(T::describe())
    }

    /// Shape of a function from `T` to `R`.
    pub fn of_function<T: Describe, R: Describe>() -> Self {
        Self::function(T::describe(), R::describe())
    }

    /// Set the binder affinity.
    pub fn with_affinity(mut self, affinity: BinderAffinity) -> Self {
        self.affinity = affinity;
        self
    }

    /// Structural input count: 0 without input, tuple arity, otherwise 1.
    pub fn input_count(&self) -> usize {
        self.input.as_ref().map_or(0, TypeRef::channel_count)
    }

    /// Structural output count: 0 without output, tuple arity, otherwise 1.
    pub fn output_count(&self) -> usize {
        self.output.as_ref().map_or(0, TypeRef::channel_count)
    }

    /// Whether the shape is bound by the streaming-table binder.
    pub fn is_stream_table(&self) -> bool {
        self.affinity == BinderAffinity::StreamTable
    }

    /// Shape of `self` piped into `next`: input of the first, output of
    /// the last, stream-table if either side is.
    pub fn then(&self, next: &TypeShape) -> TypeShape {
        let affinity = if self.is_stream_table() || next.is_stream_table() {
            BinderAffinity::StreamTable
        } else {
            BinderAffinity::Core
        };
        TypeShape {
            input: self.input.clone(),
            output: next.output.clone(),
            affinity,
        }
    }
}

/// Maps a Rust type to its structural [`TypeRef`].
pub trait Describe {
    /// The structural description of `Self`.
    fn describe() -> TypeRef;
}

/// Marker for a reactive single-value wrapper around `T`.
pub struct Single<T>(PhantomData<fn() -> T>);

/// Marker for a reactive multi-value wrapper around `T`.
pub struct Many<T>(PhantomData<fn() -> T>);

/// Marker for a message envelope around `T`.
pub struct Msg<T>(PhantomData<fn() -> T>);

impl Describe for () {
    fn describe() -> TypeRef {
        TypeRef::Unit
    }
}

macro_rules! describe_named {
    ($($ty:ty => $name:expr),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe() -> TypeRef {
                    TypeRef::named($name)
                }
            }
        )*
    };
}

describe_named!(
    String => "String",
    bool => "bool",
    i32 => "i32",
    i64 => "i64",
    u32 => "u32",
    u64 => "u64",
    f64 => "f64",
    serde_json::Value => "Value",
);

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeRef {
        match T::describe() {
            TypeRef::Named(name) => TypeRef::Named(format!("Vec<{name}>")),
            other => TypeRef::Named(format!("Vec<{other:?}>")),
        }
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeRef {
        T::describe()
    }
}

impl<T: Describe> Describe for Single<T> {
    fn describe() -> TypeRef {
        TypeRef::single(T::describe())
    }
}

impl<T: Describe> Describe for Many<T> {
    fn describe() -> TypeRef {
        TypeRef::many(T::describe())
    }
}

impl<T: Describe> Describe for Msg<T> {
    fn describe() -> TypeRef {
        TypeRef::message(T::describe())
    }
}

impl<A: Describe, B: Describe> Describe for (A, B) {
    fn describe() -> TypeRef {
        TypeRef::Tuple(vec![A::describe(), B::describe()])
    }
}

impl<A: Describe, B: Describe, C: Describe> Describe for (A, B, C) {
    fn describe() -> TypeRef {
        TypeRef::Tuple(vec![A::describe(), B::describe(), C::describe()])
    }
}
