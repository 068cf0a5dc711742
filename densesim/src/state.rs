// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use num_complex::Complex64;
use num_traits::{One, Zero};

use crate::error::CapacityError;
use crate::MAX_WIRES;

/// Dense amplitude vector over all `2^n` basis states of an `n`-wire register.
///
/// Bit `i` of a basis index is the value of wire `i`, so index 5 on a three
/// wire register is the state where wires 0 and 2 read one and wire 1 reads
/// zero. The vector carries its amplitudes as given; nothing in this type
/// renormalizes, so non-unitary states stay representable.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    amps: Vec<Complex64>,
    wire_count: usize,
}

impl StateVector {
    /// Creates the all-zero computational basis state on the given number of
    /// wires.
    ///
    /// # Errors
    ///
    /// Returns a `CapacityError` without allocating when `wire_count` exceeds
    /// [`MAX_WIRES`].
    pub fn zero_state(wire_count: usize) -> Result<Self, CapacityError> {
        if wire_count > MAX_WIRES {
            return Err(CapacityError { wire_count });
        }
        let mut amps = vec![Complex64::zero(); 1 << wire_count];
        amps[0] = Complex64::one();
        Ok(Self { amps, wire_count })
    }

    /// Builds a state from raw amplitudes, one per basis index.
    ///
    /// # Errors
    ///
    /// Returns a `CapacityError` when the amplitudes describe more than
    /// [`MAX_WIRES`] wires.
    ///
    /// # Panics
    ///
    /// Panics if the amplitude count is not a power of two; that is a
    /// construction-time contract violation, not a recoverable condition.
    pub fn from_amplitudes(amps: Vec<Complex64>) -> Result<Self, CapacityError> {
        assert!(
            amps.len().is_power_of_two(),
            "amplitude count must be a power of two, got {}",
            amps.len()
        );
        let wire_count = amps.len().trailing_zeros() as usize;
        if wire_count > MAX_WIRES {
            return Err(CapacityError { wire_count });
        }
        Ok(Self { amps, wire_count })
    }

    /// Assembles a state from parts already known to be in range. Used by the
    /// application engine when writing the output of a pass.
    pub(crate) fn from_parts(amps: Vec<Complex64>, wire_count: usize) -> Self {
        debug_assert_eq!(amps.len(), 1 << wire_count);
        Self { amps, wire_count }
    }

    /// Number of wires this state spans.
    #[must_use]
    pub fn wire_count(&self) -> usize {
        self.wire_count
    }

    /// All amplitudes, indexed by basis state.
    #[must_use]
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amps
    }

    /// Amplitude of a single basis state.
    #[must_use]
    pub fn amplitude(&self, index: usize) -> Complex64 {
        self.amps[index]
    }

    /// Sum of squared magnitudes over the whole vector. Equals one within
    /// numerical tolerance after every unitary step.
    #[must_use]
    pub fn total_probability(&self) -> f64 {
        self.amps.iter().map(Complex64::norm_sqr).sum()
    }
}
