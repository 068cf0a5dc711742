// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The gate application engine: data-parallel application of a gate action to
//! the subset of amplitudes selected by a wire span and a control mask.
//!
//! Every pass is a map over all basis indices. Each output index reads only
//! the small local group of amplitudes that differ from it in the target
//! wires, and writes its own slot in a fresh buffer, so no index ever
//! observes a partially written result.

use ndarray::Array2;
use num_complex::Complex64;
use num_traits::Zero;
use rayon::prelude::*;
use std::f64::consts::PI;

use crate::control::ControlMask;
use crate::gate::{GateAction, SubOp};
use crate::state::StateVector;

/// Applies a gate action at the given starting wire.
///
/// Indices the mask does not admit keep their amplitude unchanged. A
/// [`GateAction::None`] returns the input bit for bit.
pub(crate) fn apply_action(
    state: &StateVector,
    action: &GateAction,
    start: usize,
    mask: &ControlMask,
) -> StateVector {
    match action {
        GateAction::None => state.clone(),
        GateAction::Matrix(matrix) => apply_matrix(state, matrix, start, mask),
        GateAction::Sequence(steps) => {
            let mut current = state.clone();
            for step in steps {
                current = match step {
                    SubOp::Matrix { offset, matrix } => {
                        apply_matrix(&current, matrix, start + offset, mask)
                    }
                    SubOp::PhaseGradient { width, sign } => {
                        apply_phase_gradient(&current, *width, *sign, start, mask)
                    }
                    SubOp::ReverseWires { span } => apply_reversal(&current, *span, start, mask),
                };
            }
            current
        }
    }
}

/// Dense operator on the `span` wires starting at `start`. For each admitted
/// index the new amplitude is the matrix row selected by the index's target
/// bits, dotted with the amplitudes of the `2^span` partner indices.
fn apply_matrix(
    state: &StateVector,
    matrix: &Array2<Complex64>,
    start: usize,
    mask: &ControlMask,
) -> StateVector {
    let window = matrix.nrows() - 1;
    let amps = state.amplitudes();
    let next = (0..amps.len())
        .into_par_iter()
        .map(|index| {
            if !mask.admits(index) {
                return amps[index];
            }
            let row = (index >> start) & window;
            let base = index & !(window << start);
            let mut acc = Complex64::zero();
            for col in 0..=window {
                acc += matrix[[row, col]] * amps[base | (col << start)];
            }
            acc
        })
        .collect();
    StateVector::from_parts(next, state.wire_count())
}

/// Diagonal phase gradient: indices with the wire at `start + width` set pick
/// up a phase proportional to the value of the `width` wires below it.
#[allow(clippy::cast_precision_loss)] // reason="Values fit in the mantissa; width is bounded by the wire ceiling."
fn apply_phase_gradient(
    state: &StateVector,
    width: usize,
    sign: f64,
    start: usize,
    mask: &ControlMask,
) -> StateVector {
    let ctl_bit = 1_usize << (start + width);
    let low_mask = (1_usize << width) - 1;
    let step = sign * PI / (1_usize << width) as f64;
    let amps = state.amplitudes();
    let next = (0..amps.len())
        .into_par_iter()
        .map(|index| {
            if mask.admits(index) && index & ctl_bit != 0 {
                let low = (index >> start) & low_mask;
                amps[index] * Complex64::from_polar(1.0, step * low as f64)
            } else {
                amps[index]
            }
        })
        .collect();
    StateVector::from_parts(next, state.wire_count())
}

/// Permutation reversing the bit order of the `span` wires at `start`. The
/// control mask only ever references wires outside the span, so the
/// permutation maps admitted indices to admitted indices.
fn apply_reversal(
    state: &StateVector,
    span: usize,
    start: usize,
    mask: &ControlMask,
) -> StateVector {
    let window = (1_usize << span) - 1;
    let shift = usize::BITS as usize - span;
    let amps = state.amplitudes();
    let next = (0..amps.len())
        .into_par_iter()
        .map(|index| {
            if !mask.admits(index) {
                return amps[index];
            }
            let bits = (index >> start) & window;
            let reversed = bits.reverse_bits() >> shift;
            amps[(index & !(window << start)) | (reversed << start)]
        })
        .collect();
    StateVector::from_parts(next, state.wire_count())
}
