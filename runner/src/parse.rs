// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Parser for the line-based circuit description format.
//!
//! The first significant line declares the width as `wires N`. Every
//! following line is one column of simultaneous placements, written as
//! whitespace-separated `GATE@wire` tokens. Sized families append their span
//! to the gate name, as in `QFT3@0`. A token starting with `+` or `-`
//! attaches a control to the placement before it: `+2` requires wire 2 on,
//! `-2` requires it off, and `+{2,5}` requires at least one of the listed
//! wires on. Text after `#` is a comment.

use quantum_dense_sim::{Circuit, ControlSet, ControlState, GatePlacement, GateSet};

/// Parses a circuit description against the given gate set.
///
/// # Errors
///
/// Returns a message naming the offending line when the header is missing,
/// a token is malformed, a gate is unknown, or a column reuses a wire.
pub fn parse_circuit(source: &str, gates: &GateSet) -> Result<Circuit, String> {
    let mut circuit: Option<Circuit> = None;
    for (index, raw) in source.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let Some(circuit) = circuit.as_mut() else {
            circuit = Some(parse_header(line, line_number)?);
            continue;
        };

        let mut placements: Vec<GatePlacement> = Vec::new();
        for token in line.split_whitespace() {
            if token.starts_with('+') || token.starts_with('-') {
                let placement = placements.last_mut().ok_or_else(|| {
                    format!("line {line_number}: control '{token}' has no gate to attach to")
                })?;
                attach_control(placement, token, line_number)?;
            } else {
                placements.push(parse_placement(token, gates, line_number)?);
            }
        }
        let column = quantum_dense_sim::GateColumn::new(placements)
            .map_err(|e| format!("line {line_number}: {e}"))?;
        circuit.push_column(column);
    }
    circuit.ok_or_else(|| "missing 'wires N' header".to_string())
}

fn parse_header(line: &str, line_number: usize) -> Result<Circuit, String> {
    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some("wires"), Some(count), None) => {
            let wire_count = count
                .parse::<usize>()
                .map_err(|_| format!("line {line_number}: invalid wire count '{count}'"))?;
            Ok(Circuit::new(wire_count))
        }
        _ => Err(format!(
            "line {line_number}: expected 'wires N' header, found '{line}'"
        )),
    }
}

fn parse_placement(
    token: &str,
    gates: &GateSet,
    line_number: usize,
) -> Result<GatePlacement, String> {
    let (name, wire) = token
        .split_once('@')
        .ok_or_else(|| format!("line {line_number}: expected GATE@wire, found '{token}'"))?;
    let wire = wire
        .parse::<usize>()
        .map_err(|_| format!("line {line_number}: invalid wire in '{token}'"))?;

    // A bare id uses the family's smallest span; trailing digits select one
    // for the sized families, as in QFT3.
    if let Ok(family) = gates.resolve(name) {
        return Ok(GatePlacement::new(name, wire).with_span(family.min_span()));
    }
    let split = name.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let (base, digits) = name.split_at(split);
    if base.is_empty() || digits.is_empty() {
        return Err(format!("line {line_number}: unknown gate '{name}'"));
    }
    let family = gates
        .resolve(base)
        .map_err(|_| format!("line {line_number}: unknown gate '{name}'"))?;
    let span = digits
        .parse::<usize>()
        .map_err(|_| format!("line {line_number}: invalid span in '{token}'"))?;
    Ok(GatePlacement::new(family.id(), wire).with_span(span))
}

fn attach_control(
    placement: &mut GatePlacement,
    token: &str,
    line_number: usize,
) -> Result<(), String> {
    let controls = std::mem::replace(&mut placement.controls, ControlSet::none());
    let body = &token[1..];
    placement.controls = if let Some(group) = body.strip_prefix('{') {
        if !token.starts_with('+') {
            return Err(format!(
                "line {line_number}: any-of groups use '+', found '{token}'"
            ));
        }
        let group = group
            .strip_suffix('}')
            .ok_or_else(|| format!("line {line_number}: unterminated group in '{token}'"))?;
        let wires = group
            .split(',')
            .map(|wire| {
                wire.trim()
                    .parse::<usize>()
                    .map_err(|_| format!("line {line_number}: invalid wire in '{token}'"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if wires.is_empty() {
            return Err(format!("line {line_number}: empty group in '{token}'"));
        }
        controls.with_any_of(wires)
    } else {
        let wire = body
            .parse::<usize>()
            .map_err(|_| format!("line {line_number}: invalid control '{token}'"))?;
        let state = if token.starts_with('+') {
            ControlState::On
        } else {
            ControlState::Off
        };
        controls.with_control(wire, state)
    };
    Ok(())
}
