// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Required classical value of a single control wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    /// The control wire must read one.
    On,
    /// The control wire must read zero (an anti-control).
    Off,
}

/// The control requirements attached to one gate placement.
///
/// Single-wire requirements combine as a conjunction. Each any-of group is a
/// disjunction ("at least one of these wires is on") that must hold alongside
/// every other requirement. An empty set resolves to "always active", making
/// the gate unconditional.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControlSet {
    singles: Vec<(usize, ControlState)>,
    any_of: Vec<Vec<usize>>,
}

impl ControlSet {
    /// The empty, always-active control set.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Adds a single-wire requirement.
    #[must_use]
    pub fn with_control(mut self, wire: usize, state: ControlState) -> Self {
        self.singles.push((wire, state));
        self
    }

    /// Adds an any-of group satisfied when at least one member wire is on.
    ///
    /// # Panics
    ///
    /// Panics on an empty group, which could never be satisfied.
    #[must_use]
    pub fn with_any_of(mut self, wires: Vec<usize>) -> Self {
        assert!(!wires.is_empty(), "an any-of control group cannot be empty");
        self.any_of.push(wires);
        self
    }

    /// Whether this set places no condition at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.singles.is_empty() && self.any_of.is_empty()
    }

    /// Every wire referenced by this set, with repeats preserved so column
    /// validation can detect overlap.
    pub fn wires(&self) -> impl Iterator<Item = usize> + '_ {
        self.singles
            .iter()
            .map(|(wire, _)| *wire)
            .chain(self.any_of.iter().flatten().copied())
    }

    /// Resolves the requirements into bit masks checked per basis index.
    #[must_use]
    pub fn compile(&self) -> ControlMask {
        let mut on = 0_usize;
        let mut off = 0_usize;
        for &(wire, state) in &self.singles {
            match state {
                ControlState::On => on |= 1 << wire,
                ControlState::Off => off |= 1 << wire,
            }
        }
        let any = self
            .any_of
            .iter()
            .map(|group| group.iter().fold(0_usize, |mask, wire| mask | (1 << wire)))
            .collect();
        ControlMask { on, off, any }
    }
}

/// Compiled activation predicate for one placement, resolved against basis
/// indices during a gate application pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlMask {
    on: usize,
    off: usize,
    any: Vec<usize>,
}

impl ControlMask {
    /// Whether the amplitude at the given basis index participates in the
    /// operator's action.
    #[inline]
    #[must_use]
    pub fn admits(&self, index: usize) -> bool {
        index & self.on == self.on
            && index & self.off == 0
            && self.any.iter().all(|mask| index & mask != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_admits_every_index() {
        let mask = ControlSet::none().compile();
        assert!((0..16).all(|i| mask.admits(i)));
    }

    #[test]
    fn on_and_off_controls_conjoin() {
        let mask = ControlSet::none()
            .with_control(0, ControlState::On)
            .with_control(2, ControlState::Off)
            .compile();
        assert!(mask.admits(0b001));
        assert!(mask.admits(0b011));
        assert!(!mask.admits(0b000), "wire 0 must be on");
        assert!(!mask.admits(0b101), "wire 2 must be off");
    }

    #[test]
    fn any_of_group_is_a_disjunction() {
        let mask = ControlSet::none().with_any_of(vec![1, 2]).compile();
        assert!(mask.admits(0b010));
        assert!(mask.admits(0b100));
        assert!(mask.admits(0b110));
        assert!(!mask.admits(0b001));
    }

    #[test]
    fn groups_conjoin_with_singles() {
        let mask = ControlSet::none()
            .with_control(0, ControlState::On)
            .with_any_of(vec![1, 2])
            .compile();
        assert!(mask.admits(0b011));
        assert!(!mask.admits(0b010), "wire 0 requirement still applies");
        assert!(!mask.admits(0b001), "group still applies");
    }

    #[test]
    #[should_panic(expected = "an any-of control group cannot be empty")]
    fn empty_group_is_rejected() {
        let _ = ControlSet::none().with_any_of(Vec::new());
    }
}
