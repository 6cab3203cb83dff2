//! Operator input events and their mapping onto the drive
//!
//! Input backends decode device-specific reports into [`InputEvent`]s. The
//! [`InputMapper`] turns each event into one [`MappedAction`] and applies it
//! to a [`Tank`]. The mapping is total: events with no drive meaning map to
//! [`MappedAction::Ignored`].
//!
//! # Mapping
//!
//! | Event                             | Action                       |
//! |-----------------------------------|------------------------------|
//! | D-pad Up / Down press             | forward `(inv, inv)` / `(-inv, -inv)` |
//! | D-pad Left / L1 press             | rotate left `inv`            |
//! | D-pad Right / R1 press            | rotate right `inv`           |
//! | D-pad, L1, R1 release             | stop                         |
//! | Right stick vertical deflect      | strafe left `inv`            |
//! | Right stick horizontal deflect    | strafe right `inv`           |
//! | Right stick rest                  | stop                         |
//! | Cross / Triangle / Square press   | stop                         |
//! | Circle press / release            | inversion on / off           |
//!
//! `inv` is `-1` while inversion is held, `1` otherwise.

use core::fmt;

use crate::drive::Tank;
use crate::motor::{HardwareFault, Motor};

/// Controller buttons (DualShock 4 naming)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Cross,
    Circle,
    Triangle,
    Square,
    L1,
    R1,
    L2,
    R2,
    Share,
    Options,
    Ps,
    L3,
    R3,
    /// Button number the layout does not name
    Other(u8),
}

/// Directional pad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HatDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Analog stick axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
}

/// Side of center a stick was pushed to
///
/// Negative is up on a vertical axis and left on a horizontal one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deflection {
    Negative,
    Positive,
}

/// One decoded operator input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    ButtonPress(Button),
    ButtonRelease(Button),
    DirectionalPress(HatDirection),
    DirectionalRelease(HatDirection),
    StickDeflect(StickAxis, Deflection),
    StickRest(StickAxis),
}

/// Drive operation chosen for one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappedAction {
    /// `apply_forward(m, m)`
    Forward(i32),
    /// `apply_left_rotate(m)`
    RotateLeft(i32),
    /// `apply_right_rotate(m)`
    RotateRight(i32),
    /// `apply_strafe_left(m)`
    StrafeLeft(i32),
    /// `apply_strafe_right(m)`
    StrafeRight(i32),
    /// Hard reset of the drive state
    Stop,
    /// Inversion flag set (`true`) or cleared (`false`)
    Invert(bool),
    /// Event has no drive meaning
    Ignored,
}

impl fmt::Display for MappedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappedAction::Forward(m) => write!(f, "forward({m}, {m})"),
            MappedAction::RotateLeft(m) => write!(f, "rotate_left({m})"),
            MappedAction::RotateRight(m) => write!(f, "rotate_right({m})"),
            MappedAction::StrafeLeft(m) => write!(f, "strafe_left({m})"),
            MappedAction::StrafeRight(m) => write!(f, "strafe_right({m})"),
            MappedAction::Stop => write!(f, "stop"),
            MappedAction::Invert(true) => write!(f, "inversion on"),
            MappedAction::Invert(false) => write!(f, "inversion off"),
            MappedAction::Ignored => write!(f, "ignored"),
        }
    }
}

/// Maps input events onto drive operations
///
/// Owns the inversion flag; the flag only changes on Circle press/release.
#[derive(Debug, Default)]
pub struct InputMapper {
    inverted: bool,
}

impl InputMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether inversion is currently held
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Magnitude issued for the current inversion state
    pub fn magnitude(&self) -> i32 {
        if self.inverted {
            -1
        } else {
            1
        }
    }

    /// Choose the action for `event`, updating the inversion flag
    pub fn map(&mut self, event: InputEvent) -> MappedAction {
        let inv = self.magnitude();

        match event {
            InputEvent::DirectionalPress(HatDirection::Up) => MappedAction::Forward(inv),
            InputEvent::DirectionalPress(HatDirection::Down) => MappedAction::Forward(-inv),
            InputEvent::DirectionalPress(HatDirection::Left) => MappedAction::RotateLeft(inv),
            InputEvent::DirectionalPress(HatDirection::Right) => MappedAction::RotateRight(inv),
            InputEvent::DirectionalRelease(_) => MappedAction::Stop,

            InputEvent::ButtonPress(Button::L1) => MappedAction::RotateLeft(inv),
            InputEvent::ButtonPress(Button::R1) => MappedAction::RotateRight(inv),
            InputEvent::ButtonRelease(Button::L1 | Button::R1) => MappedAction::Stop,

            InputEvent::ButtonPress(Button::Circle) => {
                self.inverted = true;
                MappedAction::Invert(true)
            }
            InputEvent::ButtonRelease(Button::Circle) => {
                self.inverted = false;
                MappedAction::Invert(false)
            }

            InputEvent::ButtonPress(Button::Cross | Button::Triangle | Button::Square) => {
                MappedAction::Stop
            }

            InputEvent::StickDeflect(StickAxis::RightY, _) => MappedAction::StrafeLeft(inv),
            InputEvent::StickDeflect(StickAxis::RightX, _) => MappedAction::StrafeRight(inv),
            InputEvent::StickRest(StickAxis::RightX | StickAxis::RightY) => MappedAction::Stop,

            InputEvent::ButtonPress(_)
            | InputEvent::ButtonRelease(_)
            | InputEvent::StickDeflect(_, _)
            | InputEvent::StickRest(_) => MappedAction::Ignored,
        }
    }

    /// Map `event` and apply the resulting action to `tank`
    ///
    /// # Errors
    ///
    /// Returns `HardwareFault` if resolving the new drive state fails. The
    /// inversion flag is updated even then.
    pub fn handle<L: Motor, R: Motor>(
        &mut self,
        event: InputEvent,
        tank: &mut Tank<L, R>,
    ) -> Result<MappedAction, HardwareFault> {
        let action = self.map(event);
        apply(action, tank)?;
        Ok(action)
    }
}

/// Apply one mapped action to the tank
///
/// # Errors
///
/// Returns `HardwareFault` if resolving the new drive state fails.
pub fn apply<L: Motor, R: Motor>(
    action: MappedAction,
    tank: &mut Tank<L, R>,
) -> Result<(), HardwareFault> {
    match action {
        MappedAction::Forward(m) => tank.apply_forward(m, m),
        MappedAction::RotateLeft(m) => tank.apply_left_rotate(m),
        MappedAction::RotateRight(m) => tank.apply_right_rotate(m),
        MappedAction::StrafeLeft(m) => tank.apply_strafe_left(m),
        MappedAction::StrafeRight(m) => tank.apply_strafe_right(m),
        MappedAction::Stop => tank.stop(),
        MappedAction::Invert(_) | MappedAction::Ignored => Ok(()),
    }
}
