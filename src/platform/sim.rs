//! Simulated GPIO backend
//!
//! Tracks claimed pins and their levels in memory so the tank can run
//! without hardware. Every level change is logged at debug level.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use tank_drive_core::traits::{GpioBackend, GpioError, Level, PinId};

use crate::{log_debug, log_trace};

/// Highest pin number on a 40-pin header
pub const MAX_HEADER_PIN: u16 = 40;

/// In-process GPIO with claim tracking
#[derive(Debug)]
pub struct SimGpio {
    max_pin: u16,
    /// Claimed output pins and their current level
    pins: Mutex<BTreeMap<PinId, Level>>,
}

impl Default for SimGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl SimGpio {
    /// Create a backend accepting pins `1..=40`
    pub fn new() -> Self {
        Self::with_max_pin(MAX_HEADER_PIN)
    }

    /// Create a backend accepting pins `1..=max_pin`
    pub fn with_max_pin(max_pin: u16) -> Self {
        Self {
            max_pin,
            pins: Mutex::new(BTreeMap::new()),
        }
    }

    /// Current level of a claimed pin
    pub fn level(&self, pin: PinId) -> Option<Level> {
        self.pins
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&pin)
            .copied()
    }

    /// Pins claimed so far, in ascending order
    pub fn claimed(&self) -> Vec<PinId> {
        self.pins
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect()
    }
}

impl GpioBackend for SimGpio {
    fn configure_output(&self, pin: PinId, initial: Level) -> Result<(), GpioError> {
        if pin.0 == 0 || pin.0 > self.max_pin {
            return Err(GpioError::InvalidPin);
        }

        let mut pins = self.pins.lock().unwrap_or_else(PoisonError::into_inner);
        if pins.contains_key(&pin) {
            return Err(GpioError::PinInUse);
        }
        pins.insert(pin, initial);
        log_trace!("sim gpio: {} output, initial {:?}", pin, initial);
        Ok(())
    }

    fn set_level(&self, pin: PinId, level: Level) -> Result<(), GpioError> {
        let mut pins = self.pins.lock().unwrap_or_else(PoisonError::into_inner);
        let current = pins.get_mut(&pin).ok_or(GpioError::InvalidMode)?;
        if *current != level {
            log_debug!("sim gpio: {} {:?} -> {:?}", pin, *current, level);
        }
        *current = level;
        Ok(())
    }
}
