//! GPIO backends
//!
//! Host implementations of [`GpioBackend`]. All hardware-specific code is
//! isolated to this module.

pub mod sim;
pub mod sysfs;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use sim::SimGpio;
pub use sysfs::SysfsGpio;

use tank_drive_core::traits::{GpioBackend, GpioError, Level, PinId};

use crate::config::BackendKind;

/// Backend chosen at startup
#[derive(Debug)]
pub enum Gpio {
    Sim(SimGpio),
    Sysfs(SysfsGpio),
}

impl Gpio {
    pub fn new(kind: BackendKind) -> Self {
        match kind {
            BackendKind::Sim => Gpio::Sim(SimGpio::new()),
            BackendKind::Sysfs => Gpio::Sysfs(SysfsGpio::new()),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Gpio::Sim(_) => BackendKind::Sim,
            Gpio::Sysfs(_) => BackendKind::Sysfs,
        }
    }
}

impl GpioBackend for Gpio {
    fn configure_output(&self, pin: PinId, initial: Level) -> Result<(), GpioError> {
        match self {
            Gpio::Sim(gpio) => gpio.configure_output(pin, initial),
            Gpio::Sysfs(gpio) => gpio.configure_output(pin, initial),
        }
    }

    fn set_level(&self, pin: PinId, level: Level) -> Result<(), GpioError> {
        match self {
            Gpio::Sim(gpio) => gpio.set_level(pin, level),
            Gpio::Sysfs(gpio) => gpio.set_level(pin, level),
        }
    }
}
