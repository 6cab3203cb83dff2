//! GPIO capability consumed by the motor channels.
//!
//! The drive core never talks to silicon directly. A backend only has to
//! configure a pin as an output with an initial level and then set its
//! level. Pin numbering (board, kernel line, simulated) is whatever the
//! backend and its configuration agree on.

use core::fmt;

/// Opaque pin identifier understood by a [`GpioBackend`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId(pub u16);

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pin {}", self.0)
    }
}

/// Logic level of an output line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    #[default]
    Low,
    High,
}

impl Level {
    /// Returns `true` for [`Level::High`]
    pub fn is_high(self) -> bool {
        self == Level::High
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Reasons a backend can reject a pin operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioError {
    /// Pin number is not valid for this backend
    InvalidPin,
    /// Pin was not configured as an output
    InvalidMode,
    /// Pin already claimed by another owner
    PinInUse,
    /// Underlying device I/O failed
    Io,
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpioError::InvalidPin => write!(f, "invalid pin"),
            GpioError::InvalidMode => write!(f, "pin not configured as output"),
            GpioError::PinInUse => write!(f, "pin already in use"),
            GpioError::Io => write!(f, "device I/O failed"),
        }
    }
}

/// GPIO output capability
///
/// Methods take `&self` so both motor channels can share one backend; an
/// implementation that keeps state uses interior mutability.
///
/// # Safety Invariants
///
/// - A pin must be configured before its level is set
/// - A pin is claimed by at most one configuration
pub trait GpioBackend {
    /// Configure `pin` as a push-pull output driven to `initial`
    ///
    /// # Errors
    ///
    /// Returns `GpioError::PinInUse` if the pin is already claimed and
    /// `GpioError::InvalidPin` if the backend does not know the pin.
    fn configure_output(&self, pin: PinId, initial: Level) -> Result<(), GpioError>;

    /// Drive an already configured output pin to `level`
    ///
    /// # Errors
    ///
    /// Returns `GpioError::InvalidMode` if the pin was never configured.
    fn set_level(&self, pin: PinId, level: Level) -> Result<(), GpioError>;
}

impl<T: GpioBackend + ?Sized> GpioBackend for &T {
    fn configure_output(&self, pin: PinId, initial: Level) -> Result<(), GpioError> {
        (**self).configure_output(pin, initial)
    }

    fn set_level(&self, pin: PinId, level: Level) -> Result<(), GpioError> {
        (**self).set_level(pin, level)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::format;

    use super::*;

    #[test]
    fn test_level_from_bool() {
        assert_eq!(Level::from(true), Level::High);
        assert_eq!(Level::from(false), Level::Low);
        assert!(Level::High.is_high());
        assert!(!Level::default().is_high());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PinId(37)), "pin 37");
        assert_eq!(format!("{}", GpioError::PinInUse), "pin already in use");
    }
}
