// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ndarray::{array, Array2};
use num_complex::Complex64;
use num_traits::{One, Zero};
use rustc_hash::FxHashMap;
use std::f64::consts::FRAC_1_SQRT_2;

use crate::error::DefinitionError;
use crate::MAX_WIRES;

/// The linear action a gate family member defines on its span.
///
/// Small fixed gates carry an explicit dense unitary. Families whose operator
/// grows exponentially with span decompose into a sequence of primitive
/// sub-steps instead, so the full matrix is never materialized. Placeholder
/// families carry no action at all and are exempt from application.
#[derive(Debug, Clone, PartialEq)]
pub enum GateAction {
    /// Explicit dense unitary on the `2^span` dimensional subspace.
    Matrix(Array2<Complex64>),
    /// Composed sub-steps applied in order, each under the placement's
    /// control mask.
    Sequence(Vec<SubOp>),
    /// No effect on the state vector.
    None,
}

/// Primitive steps a procedural gate family decomposes into.
#[derive(Debug, Clone, PartialEq)]
pub enum SubOp {
    /// Dense operator applied at a wire offset inside the family's span.
    Matrix {
        offset: usize,
        matrix: Array2<Complex64>,
    },
    /// Diagonal phase `exp(sign * i * pi * low / 2^width)` applied to indices
    /// where the wire just above the `width` low wires of the span is set,
    /// with `low` read from those low wires.
    PhaseGradient { width: usize, sign: f64 },
    /// Reverses the bit order of the low `span` wires of the placement.
    ReverseWires { span: usize },
}

/// How a family produces its action for a concrete span.
#[derive(Debug, Clone)]
enum FamilyKind {
    Fixed(fn() -> Array2<Complex64>),
    Procedural(fn(usize) -> Vec<SubOp>),
    Inert,
}

/// A parameterized gate generator keyed by span.
///
/// Capability tags are explicit: `affects_state` gates participate in
/// application, and `is_unitary` gates are subject to the unitarity checks in
/// the test suite. A structural placeholder is neither.
#[derive(Debug, Clone)]
pub struct GateFamily {
    id: &'static str,
    symbol: &'static str,
    min_span: usize,
    max_span: usize,
    affects_state: bool,
    is_unitary: bool,
    kind: FamilyKind,
}

impl GateFamily {
    /// Identifier circuit descriptions use to reference this family.
    #[must_use]
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// Display symbol for UI collaborators.
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    /// Whether applying this family can change the state vector.
    #[must_use]
    pub fn affects_state(&self) -> bool {
        self.affects_state
    }

    /// Whether this family promises a unitary operator for every span.
    #[must_use]
    pub fn is_unitary(&self) -> bool {
        self.is_unitary
    }

    /// Smallest span the family generates a member for.
    #[must_use]
    pub fn min_span(&self) -> usize {
        self.min_span
    }

    /// Whether the family generates a member for the given span.
    #[must_use]
    pub fn supports_span(&self, span: usize) -> bool {
        (self.min_span..=self.max_span).contains(&span)
    }

    /// Serialization key for a concrete member, e.g. `QFT3` for the span-3
    /// Fourier transform. Fixed-span families serialize as their bare id.
    #[must_use]
    pub fn serialized_id(&self, span: usize) -> String {
        if self.min_span == self.max_span {
            self.id.to_string()
        } else {
            format!("{}{span}", self.id)
        }
    }

    /// Renders the family's action for the given span.
    ///
    /// # Errors
    ///
    /// Returns `DefinitionError::UnsupportedSpan` when the span is outside the
    /// family's range.
    pub fn action(&self, span: usize) -> Result<GateAction, DefinitionError> {
        if !self.supports_span(span) {
            return Err(DefinitionError::UnsupportedSpan {
                gate: self.id.to_string(),
                span,
            });
        }
        Ok(match &self.kind {
            FamilyKind::Fixed(matrix) => GateAction::Matrix(matrix()),
            FamilyKind::Procedural(steps) => GateAction::Sequence(steps(span)),
            FamilyKind::Inert => GateAction::None,
        })
    }
}

/// Registry of gate families addressable from circuit descriptions.
#[derive(Debug, Clone)]
pub struct GateSet {
    families: FxHashMap<&'static str, GateFamily>,
}

impl Default for GateSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl GateSet {
    /// The built-in families: the fixed single- and two-wire gates, the
    /// span-sized Fourier transform pair, and the spacer placeholder.
    #[must_use]
    pub fn standard() -> Self {
        let mut families = FxHashMap::default();
        for family in [
            fixed("H", "H", h_matrix),
            fixed("X", "X", x_matrix),
            fixed("Y", "Y", y_matrix),
            fixed("Z", "Z", z_matrix),
            fixed("S", "S", s_matrix),
            fixed("Sdg", "S^-1", sdg_matrix),
            fixed("T", "T", t_matrix),
            fixed("Tdg", "T^-1", tdg_matrix),
            fixed_two("Swap", "Swap", swap_matrix),
            sized("QFT", "QFT", qft_steps),
            sized("QFTdg", "QFT^-1", qft_adj_steps),
            spacer(),
        ] {
            families.insert(family.id, family);
        }
        Self { families }
    }

    /// Looks up a family by id.
    ///
    /// # Errors
    ///
    /// Returns `DefinitionError::UnknownGate` when the id is not registered.
    pub fn resolve(&self, id: &str) -> Result<&GateFamily, DefinitionError> {
        self.families
            .get(id)
            .ok_or_else(|| DefinitionError::UnknownGate(id.to_string()))
    }

    /// Every registered family, in no particular order.
    pub fn families(&self) -> impl Iterator<Item = &GateFamily> {
        self.families.values()
    }
}

fn fixed(id: &'static str, symbol: &'static str, matrix: fn() -> Array2<Complex64>) -> GateFamily {
    GateFamily {
        id,
        symbol,
        min_span: 1,
        max_span: 1,
        affects_state: true,
        is_unitary: true,
        kind: FamilyKind::Fixed(matrix),
    }
}

fn fixed_two(
    id: &'static str,
    symbol: &'static str,
    matrix: fn() -> Array2<Complex64>,
) -> GateFamily {
    GateFamily {
        min_span: 2,
        max_span: 2,
        ..fixed(id, symbol, matrix)
    }
}

fn sized(id: &'static str, symbol: &'static str, steps: fn(usize) -> Vec<SubOp>) -> GateFamily {
    GateFamily {
        id,
        symbol,
        min_span: 1,
        max_span: MAX_WIRES,
        affects_state: true,
        is_unitary: true,
        kind: FamilyKind::Procedural(steps),
    }
}

fn spacer() -> GateFamily {
    GateFamily {
        id: "...",
        symbol: "...",
        min_span: 1,
        max_span: MAX_WIRES,
        affects_state: false,
        is_unitary: false,
        kind: FamilyKind::Inert,
    }
}

fn h_matrix() -> Array2<Complex64> {
    array![
        [Complex64::one(), Complex64::one()],
        [Complex64::one(), -Complex64::one()]
    ] * FRAC_1_SQRT_2
}

fn x_matrix() -> Array2<Complex64> {
    array![
        [Complex64::zero(), Complex64::one()],
        [Complex64::one(), Complex64::zero()]
    ]
}

fn y_matrix() -> Array2<Complex64> {
    array![
        [Complex64::zero(), -Complex64::i()],
        [Complex64::i(), Complex64::zero()]
    ]
}

fn z_matrix() -> Array2<Complex64> {
    array![
        [Complex64::one(), Complex64::zero()],
        [Complex64::zero(), -Complex64::one()]
    ]
}

fn s_matrix() -> Array2<Complex64> {
    array![
        [Complex64::one(), Complex64::zero()],
        [Complex64::zero(), Complex64::i()]
    ]
}

fn sdg_matrix() -> Array2<Complex64> {
    array![
        [Complex64::one(), Complex64::zero()],
        [Complex64::zero(), -Complex64::i()]
    ]
}

fn t_matrix() -> Array2<Complex64> {
    array![
        [Complex64::one(), Complex64::zero()],
        [
            Complex64::zero(),
            Complex64::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2)
        ]
    ]
}

fn tdg_matrix() -> Array2<Complex64> {
    array![
        [Complex64::one(), Complex64::zero()],
        [
            Complex64::zero(),
            Complex64::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2)
        ]
    ]
}

fn swap_matrix() -> Array2<Complex64> {
    let mut m = Array2::zeros((4, 4));
    m[[0, 0]] = Complex64::one();
    m[[1, 2]] = Complex64::one();
    m[[2, 1]] = Complex64::one();
    m[[3, 3]] = Complex64::one();
    m
}

/// Forward Fourier transform as a composed sequence: reverse the wire order,
/// then for each wire apply the phase gradient conditioned on it followed by
/// a Hadamard. Matches the generator `F[r][c] = 2^(-span/2) * exp(2*pi*i*r*c / 2^span)`.
fn qft_steps(span: usize) -> Vec<SubOp> {
    let mut steps = Vec::new();
    if span > 1 {
        steps.push(SubOp::ReverseWires { span });
    }
    for i in 0..span {
        if i > 0 {
            steps.push(SubOp::PhaseGradient {
                width: i,
                sign: 1.0,
            });
        }
        steps.push(SubOp::Matrix {
            offset: i,
            matrix: h_matrix(),
        });
    }
    steps
}

/// Adjoint of [`qft_steps`]: each sub-step adjointed, in reverse order.
fn qft_adj_steps(span: usize) -> Vec<SubOp> {
    let mut steps = Vec::new();
    for i in (0..span).rev() {
        steps.push(SubOp::Matrix {
            offset: i,
            matrix: h_matrix(),
        });
        if i > 0 {
            steps.push(SubOp::PhaseGradient {
                width: i,
                sign: -1.0,
            });
        }
    }
    if span > 1 {
        steps.push(SubOp::ReverseWires { span });
    }
    steps
}
