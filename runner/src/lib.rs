// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod cli;
pub mod parse;
pub use cli::main;

use quantum_dense_sim::{
    extract_statistics, CircuitStats, EvalOptions, Evaluator, GateSet,
};
use std::{io::Write, path::Path};

/// Runs a circuit description file and writes per-wire statistics.
///
/// # Errors
///
/// Will return `Err` if
/// - `path` does not exist or the user does not have permission to read it.
/// - the file is not a valid circuit description.
/// - the circuit references unknown gates, unsupported spans, wires outside
///   its declared width, or more wires than the simulator supports.
pub fn run_file(
    path: impl AsRef<Path>,
    up_to: Option<usize>,
    steps: bool,
    output_writer: &mut impl Write,
) -> Result<(), String> {
    let source = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    run_source(&source, up_to, steps, output_writer)
}

/// Runs a circuit description and writes per-wire statistics.
///
/// With `steps` set, statistics are written after every applied column;
/// otherwise only the final state is reported. `up_to` truncates evaluation
/// to the columns before the given index.
///
/// # Errors
///
/// Will return `Err` on a malformed description or a failed evaluation.
pub fn run_source(
    source: &str,
    up_to: Option<usize>,
    steps: bool,
    output_writer: &mut impl Write,
) -> Result<(), String> {
    let gates = GateSet::standard();
    let circuit = parse::parse_circuit(source, &gates)?;
    let mut evaluator = Evaluator::new(gates);
    let options = EvalOptions {
        up_to_column: up_to,
        keep_intermediates: steps,
        ..EvalOptions::default()
    };
    let evaluation = evaluator
        .evaluate(&circuit, &options)
        .map_err(|e| e.to_string())?;

    if let Some(intermediates) = evaluation.intermediates {
        for (column, state) in intermediates.iter().enumerate() {
            writeln!(output_writer, "after column {column}:").map_err(|e| e.to_string())?;
            write_stats(&extract_statistics(state), output_writer)?;
        }
        if intermediates.is_empty() {
            write_stats(&extract_statistics(&evaluation.output), output_writer)?;
        }
    } else {
        write_stats(&extract_statistics(&evaluation.output), output_writer)?;
    }
    Ok(())
}

fn write_stats(stats: &CircuitStats, output_writer: &mut impl Write) -> Result<(), String> {
    for wire in 0..stats.wire_count() {
        let bloch = stats.bloch()[wire];
        writeln!(
            output_writer,
            "wire {wire}: p(1) = {:.5}, bloch = ({:.5}, {:.5}, {:.5})",
            stats.probability_of_one(wire),
            bloch.x,
            bloch.y,
            bloch.z
        )
        .map_err(|e| e.to_string())?;
    }
    if stats.norm_drifted() {
        writeln!(
            output_writer,
            "warning: total probability drifted to {:.5}",
            stats.total_probability()
        )
        .map_err(|e| e.to_string())?;
    }
    Ok(())
}
