//! Motor channel abstraction
//!
//! One [`MotorChannel`] drives one side of the tank through an H-bridge with
//! an enable line and two direction lines (L298N style, on/off only).
//!
//! # H-Bridge Truth Table
//!
//! | EN | FWD | REV | Motor State                      |
//! |----|-----|-----|----------------------------------|
//! | 0  | x   | x   | Unpowered                        |
//! | 1  | 0   | 0   | Stopped (coast)                  |
//! | 1  | 1   | 0   | Forward                          |
//! | 1  | 0   | 1   | Backward                         |
//! | 1  | 1   | 1   | Shoot-through, never driven      |
//!
//! # Design
//!
//! Direction changes always deassert the opposing line before asserting the
//! new one, so FWD and REV are never high at the same time. There are no
//! retries: the first rejected pin write is returned as a [`HardwareFault`].

use core::fmt;

use crate::traits::{GpioBackend, GpioError, Level, PinId};

/// Pin-level failures surfaced by a motor channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareFault {
    /// Backend rejected configuring a pin as output
    Configure {
        /// Pin that was rejected
        pin: PinId,
        /// Backend reason
        cause: GpioError,
    },
    /// Backend rejected a level change
    SetLevel {
        /// Pin that was rejected
        pin: PinId,
        /// Level that was requested
        level: Level,
        /// Backend reason
        cause: GpioError,
    },
    /// Actuation requested on a channel that is not acquired
    NotAcquired,
}

impl fmt::Display for HardwareFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardwareFault::Configure { pin, cause } => {
                write!(f, "Failed to configure {} as output: {}", pin, cause)
            }
            HardwareFault::SetLevel { pin, level, cause } => {
                write!(f, "Failed to drive {} {:?}: {}", pin, level, cause)
            }
            HardwareFault::NotAcquired => write!(f, "Motor channel not acquired"),
        }
    }
}

/// Discrete actuation contract for one drive side
///
/// Implemented by [`MotorChannel`]; tests substitute recording motors.
pub trait Motor {
    /// Deassert both direction lines
    ///
    /// # Errors
    ///
    /// Returns `HardwareFault` if a pin write is rejected.
    fn stop(&mut self) -> Result<(), HardwareFault>;

    /// Deassert reverse, then assert forward
    ///
    /// # Errors
    ///
    /// Returns `HardwareFault` if a pin write is rejected.
    fn drive_forward(&mut self) -> Result<(), HardwareFault>;

    /// Deassert forward, then assert reverse
    ///
    /// # Errors
    ///
    /// Returns `HardwareFault` if a pin write is rejected.
    fn drive_backward(&mut self) -> Result<(), HardwareFault>;
}

impl<M: Motor + ?Sized> Motor for &mut M {
    fn stop(&mut self) -> Result<(), HardwareFault> {
        (**self).stop()
    }

    fn drive_forward(&mut self) -> Result<(), HardwareFault> {
        (**self).drive_forward()
    }

    fn drive_backward(&mut self) -> Result<(), HardwareFault> {
        (**self).drive_backward()
    }
}

/// Pin assignment of one H-bridge channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelPins {
    /// Enable (ENA/ENB) line
    pub enable: PinId,
    /// Line asserted for forward rotation
    pub forward: PinId,
    /// Line asserted for backward rotation
    pub reverse: PinId,
}

impl ChannelPins {
    /// Build a pin assignment from raw pin numbers
    pub const fn new(enable: u16, forward: u16, reverse: u16) -> Self {
        Self {
            enable: PinId(enable),
            forward: PinId(forward),
            reverse: PinId(reverse),
        }
    }

    fn all(&self) -> [PinId; 3] {
        [self.enable, self.forward, self.reverse]
    }
}

impl fmt::Display for ChannelPins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EN={} FWD={} REV={}",
            self.enable.0, self.forward.0, self.reverse.0
        )
    }
}

/// Lifecycle of a motor channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Pins not (fully) configured; nothing was ever enabled
    Unconfigured,
    /// Pins configured and enable asserted
    Engaged,
    /// Enable and direction lines driven low at teardown
    Released,
}

/// GPIO-backed H-bridge channel
///
/// Dropping an engaged channel releases it, so the lines go low on every
/// exit path. Callers that need to see release failures call
/// [`MotorChannel::release`] explicitly first.
pub struct MotorChannel<G: GpioBackend> {
    gpio: G,
    pins: ChannelPins,
    state: ChannelState,
}

impl<G: GpioBackend> MotorChannel<G> {
    /// Create an unconfigured channel; no pin is touched until [`acquire`](Self::acquire)
    pub fn new(gpio: G, pins: ChannelPins) -> Self {
        Self {
            gpio,
            pins,
            state: ChannelState::Unconfigured,
        }
    }

    /// Pin assignment of this channel
    pub fn pins(&self) -> ChannelPins {
        self.pins
    }

    /// Current lifecycle state
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Whether the pins are configured and enable is asserted
    pub fn is_configured(&self) -> bool {
        self.state == ChannelState::Engaged
    }

    /// Configure all three pins as outputs (low), then assert enable
    ///
    /// Acquiring an engaged channel is a no-op. Acquiring a released channel
    /// only re-asserts enable, since its pins are still configured.
    ///
    /// # Errors
    ///
    /// Returns `HardwareFault::Configure` if the backend rejects a pin. Pins
    /// configured before the failure stay low and the channel stays
    /// unconfigured, so a later [`release`](Self::release) is a no-op.
    pub fn acquire(&mut self) -> Result<(), HardwareFault> {
        match self.state {
            ChannelState::Engaged => return Ok(()),
            ChannelState::Released => {
                self.state = ChannelState::Engaged;
                return self.write(self.pins.enable, Level::High);
            }
            ChannelState::Unconfigured => {}
        }

        for pin in self.pins.all() {
            self.gpio
                .configure_output(pin, Level::Low)
                .map_err(|cause| HardwareFault::Configure { pin, cause })?;
        }

        // Engaged before enable goes high: if that write fails the level is
        // unknown and release must still drive it low.
        self.state = ChannelState::Engaged;
        self.write(self.pins.enable, Level::High)
    }

    /// Deassert enable and both direction lines
    ///
    /// Idempotent and safe after a failed [`acquire`](Self::acquire). All
    /// three writes are attempted even if one fails.
    ///
    /// # Errors
    ///
    /// Returns the first `HardwareFault` among the three writes.
    pub fn release(&mut self) -> Result<(), HardwareFault> {
        if self.state != ChannelState::Engaged {
            return Ok(());
        }
        self.state = ChannelState::Released;

        let mut first_fault = None;
        for pin in self.pins.all() {
            if let Err(fault) = self.write(pin, Level::Low) {
                first_fault.get_or_insert(fault);
            }
        }

        match first_fault {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    fn ensure_engaged(&self) -> Result<(), HardwareFault> {
        if self.state == ChannelState::Engaged {
            Ok(())
        } else {
            Err(HardwareFault::NotAcquired)
        }
    }

    fn write(&self, pin: PinId, level: Level) -> Result<(), HardwareFault> {
        self.gpio
            .set_level(pin, level)
            .map_err(|cause| HardwareFault::SetLevel { pin, level, cause })
    }
}

impl<G: GpioBackend> Motor for MotorChannel<G> {
    #[inline]
    fn stop(&mut self) -> Result<(), HardwareFault> {
        self.ensure_engaged()?;
        self.write(self.pins.forward, Level::Low)?;
        self.write(self.pins.reverse, Level::Low)
    }

    #[inline]
    fn drive_forward(&mut self) -> Result<(), HardwareFault> {
        self.ensure_engaged()?;
        self.write(self.pins.reverse, Level::Low)?;
        self.write(self.pins.forward, Level::High)
    }

    #[inline]
    fn drive_backward(&mut self) -> Result<(), HardwareFault> {
        self.ensure_engaged()?;
        self.write(self.pins.forward, Level::Low)?;
        self.write(self.pins.reverse, Level::High)
    }
}

impl<G: GpioBackend> Drop for MotorChannel<G> {
    fn drop(&mut self) {
        // Errors cannot surface from drop; explicit release reports them.
        let _ = self.release();
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::format;
    use std::vec::Vec;

    use super::*;

    /// Mock backend recording every write (no hardware dependencies)
    #[derive(Default)]
    struct MockBackend {
        levels: RefCell<BTreeMap<u16, Level>>,
        writes: RefCell<Vec<(u16, Level)>>,
        reject_configure: Option<u16>,
        reject_set: RefCell<Option<u16>>,
    }

    impl MockBackend {
        fn level(&self, pin: u16) -> Option<Level> {
            self.levels.borrow().get(&pin).copied()
        }
    }

    impl GpioBackend for MockBackend {
        fn configure_output(&self, pin: PinId, initial: Level) -> Result<(), GpioError> {
            if self.reject_configure == Some(pin.0) {
                return Err(GpioError::PinInUse);
            }
            self.levels.borrow_mut().insert(pin.0, initial);
            Ok(())
        }

        fn set_level(&self, pin: PinId, level: Level) -> Result<(), GpioError> {
            if *self.reject_set.borrow() == Some(pin.0) {
                return Err(GpioError::Io);
            }
            let mut levels = self.levels.borrow_mut();
            match levels.get_mut(&pin.0) {
                Some(current) => *current = level,
                None => return Err(GpioError::InvalidMode),
            }
            self.writes.borrow_mut().push((pin.0, level));
            Ok(())
        }
    }

    const PINS: ChannelPins = ChannelPins::new(37, 33, 35);

    #[test]
    fn test_acquire_configures_low_then_enables() {
        let gpio = MockBackend::default();
        let mut channel = MotorChannel::new(&gpio, PINS);
        assert_eq!(channel.state(), ChannelState::Unconfigured);

        channel.acquire().unwrap();

        assert!(channel.is_configured());
        assert_eq!(gpio.level(37), Some(Level::High));
        assert_eq!(gpio.level(33), Some(Level::Low));
        assert_eq!(gpio.level(35), Some(Level::Low));
        assert_eq!(*gpio.writes.borrow(), [(37, Level::High)]);
    }

    #[test]
    fn test_drive_forward_and_backward() {
        let gpio = MockBackend::default();
        let mut channel = MotorChannel::new(&gpio, PINS);
        channel.acquire().unwrap();

        channel.drive_forward().unwrap();
        assert_eq!(gpio.level(33), Some(Level::High));
        assert_eq!(gpio.level(35), Some(Level::Low));

        channel.drive_backward().unwrap();
        assert_eq!(gpio.level(33), Some(Level::Low));
        assert_eq!(gpio.level(35), Some(Level::High));

        channel.stop().unwrap();
        assert_eq!(gpio.level(33), Some(Level::Low));
        assert_eq!(gpio.level(35), Some(Level::Low));
    }

    #[test]
    fn test_direction_lines_never_both_high() {
        let gpio = MockBackend::default();
        let mut channel = MotorChannel::new(&gpio, PINS);
        channel.acquire().unwrap();

        channel.drive_forward().unwrap();
        channel.drive_backward().unwrap();
        channel.drive_forward().unwrap();
        channel.stop().unwrap();
        channel.drive_backward().unwrap();

        // Replay the write log and check the invariant after every write
        let mut fwd = Level::Low;
        let mut rev = Level::Low;
        for &(pin, level) in gpio.writes.borrow().iter() {
            match pin {
                33 => fwd = level,
                35 => rev = level,
                _ => {}
            }
            assert!(!(fwd.is_high() && rev.is_high()));
        }
    }

    #[test]
    fn test_actuation_before_acquire_fails() {
        let gpio = MockBackend::default();
        let mut channel = MotorChannel::new(&gpio, PINS);

        assert_eq!(channel.drive_forward(), Err(HardwareFault::NotAcquired));
        assert_eq!(channel.stop(), Err(HardwareFault::NotAcquired));
        assert!(gpio.writes.borrow().is_empty());
    }

    #[test]
    fn test_acquire_failure_reports_pin() {
        let gpio = MockBackend {
            reject_configure: Some(35),
            ..Default::default()
        };
        let mut channel = MotorChannel::new(&gpio, PINS);

        let result = channel.acquire();
        assert_eq!(
            result,
            Err(HardwareFault::Configure {
                pin: PinId(35),
                cause: GpioError::PinInUse
            })
        );
        assert!(!channel.is_configured());
        // Enable never asserted
        assert_eq!(gpio.level(37), Some(Level::Low));
    }

    #[test]
    fn test_release_after_failed_acquire_is_noop() {
        let gpio = MockBackend {
            reject_configure: Some(33),
            ..Default::default()
        };
        let mut channel = MotorChannel::new(&gpio, PINS);
        assert!(channel.acquire().is_err());

        assert!(channel.release().is_ok());
        assert!(channel.release().is_ok());
        assert!(gpio.writes.borrow().is_empty());
    }

    #[test]
    fn test_release_is_idempotent() {
        let gpio = MockBackend::default();
        let mut channel = MotorChannel::new(&gpio, PINS);
        channel.acquire().unwrap();
        channel.drive_forward().unwrap();

        assert!(channel.release().is_ok());
        assert_eq!(channel.state(), ChannelState::Released);
        assert_eq!(gpio.level(37), Some(Level::Low));
        assert_eq!(gpio.level(33), Some(Level::Low));
        assert_eq!(gpio.level(35), Some(Level::Low));

        let writes_after_first = gpio.writes.borrow().len();
        assert!(channel.release().is_ok());
        assert_eq!(gpio.writes.borrow().len(), writes_after_first);
    }

    #[test]
    fn test_release_attempts_all_lines_on_failure() {
        let gpio = MockBackend::default();
        let mut channel = MotorChannel::new(&gpio, PINS);
        channel.acquire().unwrap();
        channel.drive_forward().unwrap();

        *gpio.reject_set.borrow_mut() = Some(37);
        let result = channel.release();

        assert_eq!(
            result,
            Err(HardwareFault::SetLevel {
                pin: PinId(37),
                level: Level::Low,
                cause: GpioError::Io
            })
        );
        // Direction lines still driven low
        assert_eq!(gpio.level(33), Some(Level::Low));
        assert_eq!(gpio.level(35), Some(Level::Low));
    }

    #[test]
    fn test_drop_releases_engaged_channel() {
        let gpio = MockBackend::default();
        {
            let mut channel = MotorChannel::new(&gpio, PINS);
            channel.acquire().unwrap();
            channel.drive_backward().unwrap();
        }
        assert_eq!(gpio.level(37), Some(Level::Low));
        assert_eq!(gpio.level(35), Some(Level::Low));
    }

    #[test]
    fn test_reacquire_after_release() {
        let gpio = MockBackend::default();
        let mut channel = MotorChannel::new(&gpio, PINS);
        channel.acquire().unwrap();
        channel.release().unwrap();

        channel.acquire().unwrap();
        assert!(channel.is_configured());
        assert_eq!(gpio.level(37), Some(Level::High));
    }

    #[test]
    fn test_hardware_fault_display() {
        let fault = HardwareFault::Configure {
            pin: PinId(36),
            cause: GpioError::PinInUse,
        };
        assert_eq!(
            format!("{}", fault),
            "Failed to configure pin 36 as output: pin already in use"
        );
        assert_eq!(
            format!("{}", HardwareFault::NotAcquired),
            "Motor channel not acquired"
        );
        assert_eq!(format!("{}", PINS), "EN=37 FWD=33 REV=35");
    }
}
