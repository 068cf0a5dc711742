// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use rustc_hash::FxHashSet;

use crate::control::ControlSet;
use crate::error::DefinitionError;

/// One gate family instance bound to a starting wire and a control set.
///
/// A placement of span `k` acts on wires `wire..wire + k`; its controls must
/// reference wires outside that range.
#[derive(Debug, Clone, PartialEq)]
pub struct GatePlacement {
    /// Id of the gate family, resolved against a [`crate::gate::GateSet`] at
    /// evaluation time.
    pub gate: String,
    /// Number of consecutive wires the member acts on.
    pub span: usize,
    /// First target wire.
    pub wire: usize,
    /// Control requirements gating the operator's action.
    pub controls: ControlSet,
}

impl GatePlacement {
    /// Span-1, uncontrolled placement of the named family.
    #[must_use]
    pub fn new(gate: impl Into<String>, wire: usize) -> Self {
        Self {
            gate: gate.into(),
            span: 1,
            wire,
            controls: ControlSet::none(),
        }
    }

    /// Sets the span for a sized family member.
    #[must_use]
    pub fn with_span(mut self, span: usize) -> Self {
        self.span = span;
        self
    }

    /// Attaches control requirements.
    #[must_use]
    pub fn with_controls(mut self, controls: ControlSet) -> Self {
        self.controls = controls;
        self
    }

    /// The consecutive wires this placement targets.
    #[must_use]
    pub fn target_wires(&self) -> std::ops::Range<usize> {
        self.wire..self.wire + self.span
    }
}

/// An ordered set of placements applied simultaneously as one combined step.
///
/// Simultaneity is only sound when no two placements share a wire, so the
/// constructor enforces disjointness across every target and control wire in
/// the column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GateColumn {
    placements: Vec<GatePlacement>,
}

impl GateColumn {
    /// Validates and assembles a column.
    ///
    /// # Errors
    ///
    /// Returns `DefinitionError::OverlappingWires` when two placements (or a
    /// placement's own controls and targets) claim the same wire.
    pub fn new(placements: Vec<GatePlacement>) -> Result<Self, DefinitionError> {
        let mut used = FxHashSet::default();
        for placement in &placements {
            for wire in placement.target_wires() {
                if !used.insert(wire) {
                    return Err(DefinitionError::OverlappingWires { wire });
                }
            }
            for wire in placement.controls.wires() {
                if !used.insert(wire) {
                    return Err(DefinitionError::OverlappingWires { wire });
                }
            }
        }
        Ok(Self { placements })
    }

    /// The placements in application order.
    #[must_use]
    pub fn placements(&self) -> &[GatePlacement] {
        &self.placements
    }
}

/// An ordered sequence of gate columns over a fixed number of wires.
///
/// Columns compose with the accumulated state via matrix-vector action; the
/// full circuit operator is never materialized.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    /// Number of wires; the amplitude vector is exponential in this.
    pub wire_count: usize,
    columns: Vec<GateColumn>,
}

impl Circuit {
    /// An empty circuit on the given wires.
    #[must_use]
    pub fn new(wire_count: usize) -> Self {
        Self {
            wire_count,
            columns: Vec::new(),
        }
    }

    /// Appends a column, builder style.
    #[must_use]
    pub fn with_column(mut self, column: GateColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends a column in place.
    pub fn push_column(&mut self, column: GateColumn) {
        self.columns.push(column);
    }

    /// The columns in application order.
    #[must_use]
    pub fn columns(&self) -> &[GateColumn] {
        &self.columns
    }
}
