// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # Dense State-Vector Quantum Simulator
//! This library implements dense state-vector simulation for interactive
//! circuit editing: a full amplitude vector per state, data-parallel gate
//! application, prefix-cached evaluation of edited circuits, per-wire
//! display statistics, and a debounced scheduler that keeps the published
//! statistics current as edits stream in.

pub mod circuit;
pub mod control;
pub mod error;
pub mod evaluate;
pub mod gate;
pub mod schedule;
pub mod state;
pub mod stats;

mod apply;

// Additional test infrastructure is available in matrix_testing that allows
// realizing gate actions as dense matrices and checking their algebraic
// properties directly.
#[cfg(test)]
mod matrix_testing;

pub use circuit::{Circuit, GateColumn, GatePlacement};
pub use control::{ControlSet, ControlState};
pub use error::{CapacityError, DefinitionError, Error};
pub use evaluate::{EvalOptions, Evaluation, Evaluator, NORM_TOLERANCE};
pub use gate::{GateFamily, GateSet};
pub use schedule::{Phase, Published, RecomputeScheduler};
pub use state::StateVector;
pub use stats::{extract_statistics, BlochVector, CircuitStats};

/// Largest supported circuit width. The amplitude vector is exponential in
/// the wire count, so this caps allocation at `2^16` complex values.
pub const MAX_WIRES: usize = 16;
