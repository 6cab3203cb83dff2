//! Mock GPIO implementation for testing

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tank_drive_core::traits::{GpioBackend, GpioError, Level, PinId};

/// One call made against the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioOp {
    Configure(PinId, Level),
    Set(PinId, Level),
}

#[derive(Debug, Default)]
struct Inner {
    levels: BTreeMap<PinId, Level>,
    ops: Vec<GpioOp>,
    configure_faults: BTreeMap<PinId, GpioError>,
    set_faults: BTreeMap<PinId, GpioError>,
}

/// Mock GPIO implementation
///
/// Records every successful call in order and tracks pin levels for test
/// verification. Faults can be injected per pin for either operation;
/// rejected calls are not recorded.
#[derive(Debug, Default)]
pub struct MockGpio {
    inner: Mutex<Inner>,
}

impl MockGpio {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `configure_output(pin, _)` fail with `error`
    pub fn fail_configure(&self, pin: PinId, error: GpioError) {
        self.inner().configure_faults.insert(pin, error);
    }

    /// Make `set_level(pin, _)` fail with `error`
    pub fn fail_set(&self, pin: PinId, error: GpioError) {
        self.inner().set_faults.insert(pin, error);
    }

    /// Remove every injected fault
    pub fn clear_faults(&self) {
        let mut inner = self.inner();
        inner.configure_faults.clear();
        inner.set_faults.clear();
    }

    /// Current level of a configured pin
    pub fn level(&self, pin: PinId) -> Option<Level> {
        self.inner().levels.get(&pin).copied()
    }

    pub fn is_configured(&self, pin: PinId) -> bool {
        self.inner().levels.contains_key(&pin)
    }

    /// Every recorded call, oldest first
    pub fn ops(&self) -> Vec<GpioOp> {
        self.inner().ops.clone()
    }

    /// Whether every configured pin is currently low
    pub fn all_low(&self) -> bool {
        self.inner().levels.values().all(|level| !level.is_high())
    }
}

impl GpioBackend for MockGpio {
    fn configure_output(&self, pin: PinId, initial: Level) -> Result<(), GpioError> {
        let mut inner = self.inner();
        if let Some(&error) = inner.configure_faults.get(&pin) {
            return Err(error);
        }
        if inner.levels.contains_key(&pin) {
            return Err(GpioError::PinInUse);
        }
        inner.levels.insert(pin, initial);
        inner.ops.push(GpioOp::Configure(pin, initial));
        Ok(())
    }

    fn set_level(&self, pin: PinId, level: Level) -> Result<(), GpioError> {
        let mut inner = self.inner();
        if let Some(&error) = inner.set_faults.get(&pin) {
            return Err(error);
        }
        match inner.levels.get_mut(&pin) {
            Some(current) => *current = level,
            None => return Err(GpioError::InvalidMode),
        }
        inner.ops.push(GpioOp::Set(pin, level));
        Ok(())
    }
}
