// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::MAX_WIRES;
use thiserror::Error;

/// An unknown or ill-formed gate reference. Not recoverable within an
/// evaluation; the pass for that circuit aborts and the error surfaces to the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// The circuit names a gate family the gate set does not define.
    #[error("unknown gate family '{0}'")]
    UnknownGate(String),

    /// The family exists but does not generate a member for the given span.
    #[error("gate family '{gate}' does not support span {span}")]
    UnsupportedSpan { gate: String, span: usize },

    /// A placement's target or control wires fall outside the circuit.
    #[error("placement of '{gate}' references wire {wire}, past the last wire of the circuit")]
    PlacementOutOfRange { gate: String, wire: usize },

    /// Two placements in the same column claim the same wire, as a target or
    /// a control. Columns must keep wires disjoint.
    #[error("placements in the same column overlap on wire {wire}")]
    OverlappingWires { wire: usize },
}

/// A wire count whose amplitude vector would exceed the supported maximum.
/// Surfaced before any allocation is attempted; there is never a partial
/// result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{wire_count} wires exceed the supported maximum of {}", MAX_WIRES)]
pub struct CapacityError {
    pub wire_count: usize,
}

/// Any failure surfaced by circuit evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    #[error(transparent)]
    Capacity(#[from] CapacityError),
}
