// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use tracing::warn;

use crate::apply::apply_action;
use crate::circuit::{Circuit, GateColumn};
use crate::error::{CapacityError, DefinitionError, Error};
use crate::gate::GateSet;
use crate::state::StateVector;
use crate::MAX_WIRES;

/// Tolerance on total probability drift before a warning is reported.
pub const NORM_TOLERANCE: f64 = 1e-9;

/// Options for a single evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// Caller-specified starting state. Defaults to the all-zero basis state.
    pub initial: Option<StateVector>,
    /// Apply only the first `n` columns when set.
    pub up_to_column: Option<usize>,
    /// Return the vector after every applied column, for step-through
    /// inspection.
    pub keep_intermediates: bool,
}

/// Result of an evaluation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// State after the last applied column.
    pub output: StateVector,
    /// Per-column states, present when requested through
    /// [`EvalOptions::keep_intermediates`].
    pub intermediates: Option<Vec<StateVector>>,
}

struct CacheEntry {
    wire_count: usize,
    columns: Vec<GateColumn>,
    states: Vec<StateVector>,
}

/// Sequences gate applications across the ordered columns of a circuit.
///
/// The evaluator owns the amplitude buffers for the duration of a pass and
/// keeps the per-column states of the most recent pass so that an edit
/// touching only a suffix of the circuit resumes from the last shared
/// intermediate state instead of recomputing from scratch.
pub struct Evaluator {
    gates: GateSet,
    cache: Option<CacheEntry>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(GateSet::standard())
    }
}

impl Evaluator {
    /// Creates an evaluator over the given gate set.
    #[must_use]
    pub fn new(gates: GateSet) -> Self {
        Self { gates, cache: None }
    }

    /// The gate set circuit references resolve against.
    #[must_use]
    pub fn gates(&self) -> &GateSet {
        &self.gates
    }

    /// Evaluates a circuit, starting from the all-zero basis state unless the
    /// options supply one.
    ///
    /// # Errors
    ///
    /// Returns a `CapacityError` before any allocation when the wire count
    /// exceeds [`MAX_WIRES`], and a `DefinitionError` when a placement names
    /// an unknown family, an unsupported span, or wires outside the circuit.
    ///
    /// # Panics
    ///
    /// Panics when the supplied initial state spans a different number of
    /// wires than the circuit; that is a caller contract violation.
    pub fn evaluate(
        &mut self,
        circuit: &Circuit,
        options: &EvalOptions,
    ) -> Result<Evaluation, Error> {
        if circuit.wire_count > MAX_WIRES {
            return Err(CapacityError {
                wire_count: circuit.wire_count,
            }
            .into());
        }

        let cutoff = options
            .up_to_column
            .map_or(circuit.columns().len(), |upto| {
                upto.min(circuit.columns().len())
            });
        let columns = &circuit.columns()[..cutoff];

        // Resolve every gate reference up front so a bad suffix cannot leave
        // a half-applied pass behind.
        for column in columns {
            for placement in column.placements() {
                let family = self.gates.resolve(&placement.gate)?;
                if !family.supports_span(placement.span) {
                    return Err(DefinitionError::UnsupportedSpan {
                        gate: placement.gate.clone(),
                        span: placement.span,
                    }
                    .into());
                }
                let out_of_range = placement
                    .target_wires()
                    .chain(placement.controls.wires())
                    .find(|&wire| wire >= circuit.wire_count);
                if let Some(wire) = out_of_range {
                    return Err(DefinitionError::PlacementOutOfRange {
                        gate: placement.gate.clone(),
                        wire,
                    }
                    .into());
                }
            }
        }

        let cacheable = options.initial.is_none();
        let reusable = if cacheable {
            self.shared_prefix(circuit.wire_count, columns)
        } else {
            0
        };

        let mut states: Vec<StateVector> = Vec::with_capacity(columns.len());
        if let Some(cache) = &self.cache {
            states.extend_from_slice(&cache.states[..reusable]);
        }

        let mut current = match (&options.initial, states.last()) {
            (_, Some(resumed)) => resumed.clone(),
            (Some(initial), None) => {
                assert_eq!(
                    initial.wire_count(),
                    circuit.wire_count,
                    "initial state must span the circuit's wires"
                );
                initial.clone()
            }
            (None, None) => StateVector::zero_state(circuit.wire_count)?,
        };

        for column in &columns[reusable..] {
            current = self.apply_column(current, column);
            states.push(current.clone());
        }

        let total = current.total_probability();
        if (total - 1.0).abs() > NORM_TOLERANCE {
            warn!(total_probability = total, "total probability drifted beyond tolerance");
        }

        if cacheable {
            self.cache = Some(CacheEntry {
                wire_count: circuit.wire_count,
                columns: columns.to_vec(),
                states: states.clone(),
            });
        }

        Ok(Evaluation {
            output: current,
            intermediates: options.keep_intermediates.then_some(states),
        })
    }

    /// Number of leading columns whose cached output can be reused.
    fn shared_prefix(&self, wire_count: usize, columns: &[GateColumn]) -> usize {
        self.cache.as_ref().map_or(0, |cache| {
            if cache.wire_count != wire_count {
                return 0;
            }
            cache
                .columns
                .iter()
                .zip(columns)
                .take_while(|(cached, requested)| cached == requested)
                .count()
        })
    }

    /// Applies one column. Placements apply sequentially; disjoint wires make
    /// the order irrelevant, so the result is the column's combined operator.
    fn apply_column(&self, state: StateVector, column: &GateColumn) -> StateVector {
        let mut current = state;
        for placement in column.placements() {
            let family = self
                .gates
                .resolve(&placement.gate)
                .expect("gate references are resolved before application");
            if !family.affects_state() {
                continue;
            }
            let action = family
                .action(placement.span)
                .expect("spans are validated before application");
            let mask = placement.controls.compile();
            current = apply_action(&current, &action, placement.wire, &mask);
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::GatePlacement;
    use crate::control::{ControlSet, ControlState};
    use num_complex::Complex64;

    fn column(placements: Vec<GatePlacement>) -> GateColumn {
        GateColumn::new(placements).expect("test columns are disjoint")
    }

    fn bell_circuit() -> Circuit {
        Circuit::new(2)
            .with_column(column(vec![GatePlacement::new("H", 0)]))
            .with_column(column(vec![GatePlacement::new("X", 1)
                .with_controls(ControlSet::none().with_control(0, ControlState::On))]))
    }

    #[test]
    fn empty_circuit_yields_the_zero_state() {
        let mut evaluator = Evaluator::default();
        let result = evaluator
            .evaluate(&Circuit::new(2), &EvalOptions::default())
            .expect("empty circuit evaluates");
        assert_eq!(result.output.amplitude(0), Complex64::new(1.0, 0.0));
    }

    #[test]
    fn bell_circuit_entangles_both_wires() {
        let mut evaluator = Evaluator::default();
        let result = evaluator
            .evaluate(&bell_circuit(), &EvalOptions::default())
            .expect("bell circuit evaluates");
        let amps = result.output.amplitudes();
        assert!((amps[0b00].norm_sqr() - 0.5).abs() < 1e-12);
        assert!((amps[0b11].norm_sqr() - 0.5).abs() < 1e-12);
        assert!(amps[0b01].norm() < 1e-12);
        assert!(amps[0b10].norm() < 1e-12);
    }

    #[test]
    fn column_cutoff_stops_early() {
        let mut evaluator = Evaluator::default();
        let options = EvalOptions {
            up_to_column: Some(1),
            ..EvalOptions::default()
        };
        let result = evaluator
            .evaluate(&bell_circuit(), &options)
            .expect("prefix evaluates");
        // Only the Hadamard applied; the control column did not.
        let amps = result.output.amplitudes();
        assert!((amps[0b00].re - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
        assert!((amps[0b01].re - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn intermediates_track_every_column() {
        let mut evaluator = Evaluator::default();
        let options = EvalOptions {
            keep_intermediates: true,
            ..EvalOptions::default()
        };
        let result = evaluator
            .evaluate(&bell_circuit(), &options)
            .expect("bell circuit evaluates");
        let steps = result.intermediates.expect("intermediates were requested");
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1], result.output);
    }

    #[test]
    fn caller_supplied_initial_state_is_used() {
        let mut evaluator = Evaluator::default();
        let initial = {
            let mut amps = vec![Complex64::new(0.0, 0.0); 4];
            amps[0b11] = Complex64::new(1.0, 0.0);
            StateVector::from_amplitudes(amps).expect("within capacity")
        };
        let circuit = Circuit::new(2).with_column(column(vec![GatePlacement::new("X", 0)]));
        let options = EvalOptions {
            initial: Some(initial),
            ..EvalOptions::default()
        };
        let result = evaluator.evaluate(&circuit, &options).expect("evaluates");
        assert_eq!(result.output.amplitude(0b10), Complex64::new(1.0, 0.0));
    }

    #[test]
    fn excess_wires_fail_before_allocation() {
        let mut evaluator = Evaluator::default();
        let err = evaluator
            .evaluate(&Circuit::new(MAX_WIRES + 1), &EvalOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            Error::Capacity(CapacityError {
                wire_count: MAX_WIRES + 1
            })
        );
    }

    #[test]
    fn unknown_gate_fails_the_whole_pass() {
        let mut evaluator = Evaluator::default();
        let circuit = Circuit::new(1).with_column(column(vec![GatePlacement::new("Bogus", 0)]));
        let err = evaluator.evaluate(&circuit, &EvalOptions::default()).unwrap_err();
        assert_eq!(
            err,
            Error::Definition(DefinitionError::UnknownGate("Bogus".to_string()))
        );
    }

    #[test]
    fn placement_past_the_last_wire_is_rejected() {
        let mut evaluator = Evaluator::default();
        let circuit = Circuit::new(2)
            .with_column(column(vec![GatePlacement::new("QFT", 1).with_span(3)]));
        let err = evaluator.evaluate(&circuit, &EvalOptions::default()).unwrap_err();
        assert_eq!(
            err,
            Error::Definition(DefinitionError::PlacementOutOfRange {
                gate: "QFT".to_string(),
                wire: 2
            })
        );
    }

    #[test]
    fn cached_prefix_resume_matches_cold_evaluation() {
        let mut warm = Evaluator::default();
        let base = bell_circuit();
        let _ = warm
            .evaluate(&base, &EvalOptions::default())
            .expect("first pass evaluates");

        // Change only the suffix: add a column and replace the second one.
        let edited = Circuit::new(2)
            .with_column(column(vec![GatePlacement::new("H", 0)]))
            .with_column(column(vec![GatePlacement::new("Z", 1)]))
            .with_column(column(vec![GatePlacement::new("H", 1)]));
        let resumed = warm
            .evaluate(&edited, &EvalOptions::default())
            .expect("edited circuit evaluates");

        let mut cold = Evaluator::default();
        let fresh = cold
            .evaluate(&edited, &EvalOptions::default())
            .expect("cold evaluation succeeds");
        assert_eq!(resumed.output, fresh.output);
    }

    #[test]
    fn unitary_circuits_preserve_total_probability() {
        for wires in 1..=10 {
            let mut circuit = Circuit::new(wires);
            let mut hadamards = Vec::new();
            for wire in 0..wires {
                hadamards.push(GatePlacement::new("H", wire));
            }
            circuit.push_column(column(hadamards));
            circuit.push_column(column(vec![GatePlacement::new("T", 0)]));
            circuit.push_column(column(vec![
                GatePlacement::new("QFT", 0).with_span(wires.min(4))
            ]));

            let mut evaluator = Evaluator::default();
            let result = evaluator
                .evaluate(&circuit, &EvalOptions::default())
                .expect("unitary circuit evaluates");
            assert!(
                (result.output.total_probability() - 1.0).abs() < 1e-9,
                "probability drifted on {wires} wires"
            );
        }
    }

    #[test]
    fn spacer_columns_change_nothing() {
        let mut evaluator = Evaluator::default();
        let with_spacer = bell_circuit()
            .with_column(column(vec![GatePlacement::new("...", 0).with_span(2)]));
        let plain = evaluator
            .evaluate(&bell_circuit(), &EvalOptions::default())
            .expect("bell circuit evaluates");
        let mut evaluator = Evaluator::default();
        let spaced = evaluator
            .evaluate(&with_spacer, &EvalOptions::default())
            .expect("spacer circuit evaluates");
        assert_eq!(plain.output, spaced.output);
    }
}
