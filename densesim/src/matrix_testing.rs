// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Utilities for realizing gate actions as explicit dense matrices, used to
//! check algebraic properties that are awkward to state against the
//! data-parallel kernels directly.

use ndarray::Array2;
use num_complex::Complex64;
use num_traits::{One, Zero};
use std::f64::consts::PI;

use crate::apply::apply_action;
use crate::control::ControlSet;
use crate::gate::{GateAction, GateSet};
use crate::state::StateVector;

/// Realizes an action as the dense matrix it induces on `span` wires, by
/// applying it to each basis vector and reading the columns back out.
fn realize(action: &GateAction, span: usize) -> Array2<Complex64> {
    let dim = 1_usize << span;
    let mask = ControlSet::none().compile();
    let mut matrix = Array2::zeros((dim, dim));
    for col in 0..dim {
        let mut amps = vec![Complex64::zero(); dim];
        amps[col] = Complex64::one();
        let basis = StateVector::from_amplitudes(amps).expect("span within capacity");
        let out = apply_action(&basis, action, 0, &mask);
        for row in 0..dim {
            matrix[[row, col]] = out.amplitude(row);
        }
    }
    matrix
}

fn adjoint(matrix: &Array2<Complex64>) -> Array2<Complex64> {
    matrix.t().mapv(|value| value.conj())
}

fn max_deviation_from_identity(matrix: &Array2<Complex64>) -> f64 {
    let mut max = 0.0_f64;
    for ((row, col), value) in matrix.indexed_iter() {
        let expected = if row == col {
            Complex64::one()
        } else {
            Complex64::zero()
        };
        max = max.max((value - expected).norm());
    }
    max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_unitary_family_realizes_a_unitary_matrix() {
        let gates = GateSet::standard();
        for family in gates.families().filter(|family| family.is_unitary()) {
            for span in 1..=4 {
                if !family.supports_span(span) {
                    continue;
                }
                let action = family.action(span).expect("supported span");
                let matrix = realize(&action, span);
                let product = adjoint(&matrix).dot(&matrix);
                let deviation = max_deviation_from_identity(&product);
                assert!(
                    deviation < 1e-9,
                    "family '{}' at span {span} deviates from unitary by {deviation}",
                    family.id()
                );
            }
        }
    }

    #[test]
    fn fourier_transform_matches_its_generator_matrix() {
        let gates = GateSet::standard();
        let action = gates
            .resolve("QFT")
            .expect("QFT is registered")
            .action(2)
            .expect("span 2 supported");
        let matrix = realize(&action, 2);
        for row in 0..4 {
            for col in 0..4 {
                #[allow(clippy::cast_precision_loss)]
                let expected = Complex64::from_polar(0.5, 2.0 * PI * (row * col) as f64 / 4.0);
                assert!(
                    (matrix[[row, col]] - expected).norm() < 1e-12,
                    "entry ({row}, {col}) was {}, expected {expected}",
                    matrix[[row, col]]
                );
            }
        }
    }

    #[test]
    fn fourier_transform_spreads_the_ground_state_uniformly() {
        let gates = GateSet::standard();
        let action = gates
            .resolve("QFT")
            .expect("QFT is registered")
            .action(3)
            .expect("span 3 supported");
        let matrix = realize(&action, 3);
        let expected = 1.0 / (8.0_f64).sqrt();
        for row in 0..8 {
            assert!((matrix[[row, 0]] - Complex64::new(expected, 0.0)).norm() < 1e-12);
        }
    }

    #[test]
    fn fourier_adjoint_inverts_the_fourier_transform() {
        let gates = GateSet::standard();
        for span in 1..=4 {
            let forward = realize(
                &gates
                    .resolve("QFT")
                    .expect("QFT is registered")
                    .action(span)
                    .expect("supported span"),
                span,
            );
            let backward = realize(
                &gates
                    .resolve("QFTdg")
                    .expect("QFTdg is registered")
                    .action(span)
                    .expect("supported span"),
                span,
            );
            let product = backward.dot(&forward);
            assert!(
                max_deviation_from_identity(&product) < 1e-9,
                "QFTdg * QFT is not the identity at span {span}"
            );
        }
    }

    #[test]
    fn fourier_adjoint_matches_the_conjugate_transpose() {
        let gates = GateSet::standard();
        let forward = realize(
            &gates
                .resolve("QFT")
                .expect("QFT is registered")
                .action(3)
                .expect("span 3 supported"),
            3,
        );
        let backward = realize(
            &gates
                .resolve("QFTdg")
                .expect("QFTdg is registered")
                .action(3)
                .expect("span 3 supported"),
            3,
        );
        let expected = adjoint(&forward);
        for ((row, col), value) in backward.indexed_iter() {
            assert!((value - expected[[row, col]]).norm() < 1e-12);
        }
    }
}
