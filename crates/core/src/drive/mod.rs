//! Differential drive state
//!
//! [`DriveState`] holds two signed counters that inputs add to and subtract
//! from. After every mutation [`Tank`] resolves each counter by sign onto its
//! motor: positive drives forward, negative drives backward, zero stops.
//! Magnitude only matters for how many opposing inputs it takes to cancel.

use crate::motor::{HardwareFault, Motor};

/// Per-side signed drive counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriveState {
    pub left: i32,
    pub right: i32,
}

impl DriveState {
    /// Both sides at rest
    pub const ZERO: Self = Self { left: 0, right: 0 };

    pub const fn new(left: i32, right: i32) -> Self {
        Self { left, right }
    }

    fn add(&mut self, left: i32, right: i32) {
        self.left = self.left.saturating_add(left);
        self.right = self.right.saturating_add(right);
    }
}

/// Direction a side resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Stopped,
}

impl Direction {
    /// Resolve a counter by its sign
    pub fn from_counter(value: i32) -> Self {
        match value.signum() {
            1 => Direction::Forward,
            -1 => Direction::Backward,
            _ => Direction::Stopped,
        }
    }
}

/// Two motors plus the drive state that commands them
///
/// Owned by exactly one consumer; every `apply_*` call writes the resolved
/// directions to both motors before returning.
pub struct Tank<L: Motor, R: Motor> {
    left: L,
    right: R,
    state: DriveState,
}

impl<L: Motor, R: Motor> Tank<L, R> {
    /// Wrap two motors with a zeroed drive state
    ///
    /// Nothing is written to the motors until the first mutation.
    pub fn new(left: L, right: R) -> Self {
        Self {
            left,
            right,
            state: DriveState::ZERO,
        }
    }

    pub fn state(&self) -> DriveState {
        self.state
    }

    pub fn left(&self) -> &L {
        &self.left
    }

    pub fn right(&self) -> &R {
        &self.right
    }

    /// `left += l; right += r`
    ///
    /// # Errors
    ///
    /// Returns the first `HardwareFault` raised while resolving.
    pub fn apply_forward(&mut self, left: i32, right: i32) -> Result<(), HardwareFault> {
        self.state.add(left, right);
        self.resolve()
    }

    /// Shorthand for `apply_forward(-1, -1)`
    ///
    /// # Errors
    ///
    /// Returns the first `HardwareFault` raised while resolving.
    pub fn apply_backward(&mut self) -> Result<(), HardwareFault> {
        self.apply_forward(-1, -1)
    }

    /// `left -= m; right += m`
    ///
    /// # Errors
    ///
    /// Returns the first `HardwareFault` raised while resolving.
    pub fn apply_left_rotate(&mut self, magnitude: i32) -> Result<(), HardwareFault> {
        self.state.add(magnitude.saturating_neg(), magnitude);
        self.resolve()
    }

    /// `left += m; right -= m`
    ///
    /// # Errors
    ///
    /// Returns the first `HardwareFault` raised while resolving.
    pub fn apply_right_rotate(&mut self, magnitude: i32) -> Result<(), HardwareFault> {
        self.state.add(magnitude, magnitude.saturating_neg());
        self.resolve()
    }

    /// `right += m`
    ///
    /// # Errors
    ///
    /// Returns the first `HardwareFault` raised while resolving.
    pub fn apply_strafe_left(&mut self, magnitude: i32) -> Result<(), HardwareFault> {
        self.state.add(0, magnitude);
        self.resolve()
    }

    /// `left += m`
    ///
    /// # Errors
    ///
    /// Returns the first `HardwareFault` raised while resolving.
    pub fn apply_strafe_right(&mut self, magnitude: i32) -> Result<(), HardwareFault> {
        self.state.add(magnitude, 0);
        self.resolve()
    }

    /// Reset both counters to zero, stopping both sides
    ///
    /// This is a hard reset: releasing one of two held inputs halts the
    /// robot rather than subtracting only that input's contribution.
    ///
    /// # Errors
    ///
    /// Returns the first `HardwareFault` raised while resolving.
    pub fn stop(&mut self) -> Result<(), HardwareFault> {
        self.state = DriveState::ZERO;
        self.resolve()
    }

    /// Write the current state to both motors, left first
    ///
    /// # Errors
    ///
    /// Returns the first `HardwareFault`; the right side is not written if
    /// the left side failed.
    pub fn resolve(&mut self) -> Result<(), HardwareFault> {
        apply_direction(&mut self.left, Direction::from_counter(self.state.left))?;
        apply_direction(&mut self.right, Direction::from_counter(self.state.right))
    }
}

fn apply_direction<M: Motor>(motor: &mut M, direction: Direction) -> Result<(), HardwareFault> {
    match direction {
        Direction::Forward => motor.drive_forward(),
        Direction::Backward => motor.drive_backward(),
        Direction::Stopped => motor.stop(),
    }
}
