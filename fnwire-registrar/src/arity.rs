//! Channel counts from declared shapes.

use crate::inspector::HandlerDescriptor;
use fnwire_core::handler::HandlerKind;
use fnwire_core::shape::TypeShape;
use serde::Serialize;

/// Number of input and output channels a handler needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Arity {
    /// Input channels.
    pub inputs: usize,
    /// Output channels.
    pub outputs: usize,
}

impl Arity {
    /// Create an arity.
    pub fn new(inputs: usize, outputs: usize) -> Self {
        Self { inputs, outputs }
    }
}

/// Compute the channel counts for a classified handler.
///
/// Suppliers never get inputs; consumers and the router never get outputs.
/// An output that is unit, or a single-value wrapper of unit, has nothing to
/// bind and counts as zero outputs.
pub fn compute_arity(descriptor: &HandlerDescriptor) -> Arity {
    let shape = &descriptor.shape;
    match descriptor.kind {
        HandlerKind::Supplier => Arity::new(0, bindable_outputs(shape)),
        HandlerKind::Consumer | HandlerKind::Routing => Arity::new(shape.input_count(), 0),
        // Transformer, and any kind added later, binds both sides.
        _ => Arity::new(shape.input_count(), bindable_outputs(shape)),
    }
}

fn bindable_outputs(shape: &TypeShape) -> usize {
    match &shape.output {
        Some(output) if output.is_single_of_unit() => 0,
        Some(output) if output.is_unit() => 0,
        _ => shape.output_count(),
    }
}
