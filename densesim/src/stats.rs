// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use num_complex::Complex64;
use num_traits::Zero;

use crate::evaluate::NORM_TOLERANCE;
use crate::state::StateVector;

/// Bloch-sphere coordinates of one wire's reduced density matrix: the
/// expectation values of the X, Y, and Z operators on that wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlochVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Immutable display statistics derived from one amplitude vector.
///
/// A snapshot is read-only once produced; edits to the circuit produce a new
/// snapshot that supersedes this one wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitStats {
    wire_count: usize,
    probabilities: Vec<f64>,
    bloch: Vec<BlochVector>,
    total_probability: f64,
    norm_drifted: bool,
}

impl CircuitStats {
    /// Number of wires the snapshot covers.
    #[must_use]
    pub fn wire_count(&self) -> usize {
        self.wire_count
    }

    /// Marginal probability of measuring one on each wire, normalized for
    /// display.
    #[must_use]
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Marginal probability of measuring one on a single wire.
    #[must_use]
    pub fn probability_of_one(&self, wire: usize) -> f64 {
        self.probabilities[wire]
    }

    /// Bloch vector of each wire's reduced density matrix.
    #[must_use]
    pub fn bloch(&self) -> &[BlochVector] {
        &self.bloch
    }

    /// Raw total probability of the underlying vector, before the defensive
    /// normalization applied to the displayed values.
    #[must_use]
    pub fn total_probability(&self) -> f64 {
        self.total_probability
    }

    /// Whether the total probability had drifted beyond tolerance when the
    /// snapshot was taken.
    #[must_use]
    pub fn norm_drifted(&self) -> bool {
        self.norm_drifted
    }
}

/// Reduces an amplitude vector into per-wire display statistics.
///
/// All reductions are read-only folds. Vectors whose total probability is not
/// one (after non-unitary intermediate operations) are normalized defensively
/// for display only; the underlying vector is never mutated.
#[must_use]
pub fn extract_statistics(state: &StateVector) -> CircuitStats {
    let total = state.total_probability();
    let norm_drifted = (total - 1.0).abs() > NORM_TOLERANCE;
    let scale = if total > f64::EPSILON { 1.0 / total } else { 0.0 };

    let amps = state.amplitudes();
    let wire_count = state.wire_count();
    let mut probabilities = Vec::with_capacity(wire_count);
    let mut bloch = Vec::with_capacity(wire_count);
    for wire in 0..wire_count {
        let bit = 1_usize << wire;
        let mut p_one = 0.0;
        // Off-diagonal of the reduced density matrix for this wire:
        // sum over pairs of amplitudes differing only in the wire's bit.
        let mut coherence = Complex64::zero();
        for (index, amp) in amps.iter().enumerate() {
            if index & bit == 0 {
                coherence += amp * amps[index | bit].conj();
            } else {
                p_one += amp.norm_sqr();
            }
        }
        probabilities.push(p_one * scale);
        bloch.push(BlochVector {
            x: 2.0 * coherence.re * scale,
            y: -2.0 * coherence.im * scale,
            z: (total - 2.0 * p_one) * scale,
        });
    }

    CircuitStats {
        wire_count,
        probabilities,
        bloch,
        total_probability: total,
        norm_drifted,
    }
}
