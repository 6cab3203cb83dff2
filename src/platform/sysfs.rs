//! Linux sysfs GPIO backend
//!
//! Drives pins through `/sys/class/gpio`. Pin ids are kernel GPIO numbers,
//! not header positions. Pins exported by this backend are unexported when
//! it is dropped, leaving them as inputs.
//!
//! Configuration writes `low`/`high` to `direction`, which makes the pin an
//! output and sets its initial level in one step, so it never glitches high.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tank_drive_core::traits::{GpioBackend, GpioError, Level, PinId};

use crate::{log_debug, log_warn};

/// Default sysfs GPIO class directory
pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// GPIO through the legacy sysfs interface
#[derive(Debug)]
pub struct SysfsGpio {
    root: PathBuf,
    exported: Mutex<Vec<PinId>>,
}

impl Default for SysfsGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl SysfsGpio {
    pub fn new() -> Self {
        Self::with_root(SYSFS_GPIO_ROOT)
    }

    /// Use a different class directory (tests point this at a scratch tree)
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exported: Mutex::new(Vec::new()),
        }
    }

    fn pin_dir(&self, pin: PinId) -> PathBuf {
        self.root.join(format!("gpio{}", pin.0))
    }

    fn write(&self, path: &Path, value: &str) -> Result<(), GpioError> {
        fs::write(path, value).map_err(|e| {
            log_warn!("sysfs gpio: write {:?} to {} failed: {}", value, path.display(), e);
            map_io_error(&e)
        })
    }
}

/// EBUSY on Linux
const EBUSY: i32 = 16;

fn map_io_error(err: &io::Error) -> GpioError {
    if err.raw_os_error() == Some(EBUSY) {
        return GpioError::PinInUse;
    }
    match err.kind() {
        io::ErrorKind::NotFound => GpioError::InvalidPin,
        _ => GpioError::Io,
    }
}

fn direction_value(initial: Level) -> &'static str {
    match initial {
        Level::Low => "low",
        Level::High => "high",
    }
}

fn level_value(level: Level) -> &'static str {
    match level {
        Level::Low => "0",
        Level::High => "1",
    }
}

impl GpioBackend for SysfsGpio {
    fn configure_output(&self, pin: PinId, initial: Level) -> Result<(), GpioError> {
        let mut exported = self
            .exported
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if exported.contains(&pin) {
            return Err(GpioError::PinInUse);
        }

        // The kernel answers EBUSY if another owner already exported it
        self.write(&self.root.join("export"), &pin.0.to_string())?;
        exported.push(pin);

        self.write(&self.pin_dir(pin).join("direction"), direction_value(initial))?;
        log_debug!("sysfs gpio: exported {} as output {:?}", pin, initial);
        Ok(())
    }

    fn set_level(&self, pin: PinId, level: Level) -> Result<(), GpioError> {
        let exported = self
            .exported
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !exported.contains(&pin) {
            return Err(GpioError::InvalidMode);
        }
        self.write(&self.pin_dir(pin).join("value"), level_value(level))
    }
}

impl Drop for SysfsGpio {
    fn drop(&mut self) {
        let exported = self
            .exported
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        let unexport = self.root.join("unexport");
        for pin in exported.drain(..) {
            if let Err(e) = fs::write(&unexport, pin.0.to_string()) {
                log_warn!("sysfs gpio: unexport {} failed: {}", pin, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static SCRATCH_ID: AtomicUsize = AtomicUsize::new(0);

    /// Fake class directory; `export` and `unexport` end up as plain files
    /// and tests create the pin directories the kernel would.
    struct ScratchRoot(PathBuf);

    impl ScratchRoot {
        fn new() -> Self {
            let id = SCRATCH_ID.fetch_add(1, Ordering::Relaxed);
            let path = std::env::temp_dir().join(format!(
                "tank_drive_sysfs_{}_{}",
                std::process::id(),
                id
            ));
            let _ = fs::remove_dir_all(&path);
            fs::create_dir_all(&path).unwrap();
            Self(path)
        }

        fn read(&self, rel: &str) -> String {
            fs::read_to_string(self.0.join(rel)).unwrap()
        }
    }

    impl Drop for ScratchRoot {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn test_configure_exports_and_sets_direction() {
        let root = ScratchRoot::new();
        // Kernel would create gpio17 on export
        fs::create_dir_all(root.0.join("gpio17")).unwrap();
        let gpio = SysfsGpio::with_root(&root.0);

        gpio.configure_output(PinId(17), Level::Low).unwrap();
        assert_eq!(root.read("export"), "17");
        assert_eq!(root.read("gpio17/direction"), "low");

        assert_eq!(
            gpio.configure_output(PinId(17), Level::Low),
            Err(GpioError::PinInUse)
        );
    }

    #[test]
    fn test_missing_pin_dir_after_export_is_invalid() {
        let root = ScratchRoot::new();
        let gpio = SysfsGpio::with_root(&root.0);

        assert_eq!(
            gpio.configure_output(PinId(22), Level::Low),
            Err(GpioError::InvalidPin)
        );
    }

    #[test]
    fn test_busy_maps_to_pin_in_use() {
        let busy = io::Error::from_raw_os_error(EBUSY);
        assert_eq!(map_io_error(&busy), GpioError::PinInUse);
        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(map_io_error(&denied), GpioError::Io);
    }

    #[test]
    fn test_set_level_writes_value() {
        let root = ScratchRoot::new();
        let gpio = SysfsGpio::with_root(&root.0);
        // Pretend the pin was exported by this backend
        gpio.exported.lock().unwrap().push(PinId(5));
        fs::create_dir_all(root.0.join("gpio5")).unwrap();

        gpio.set_level(PinId(5), Level::High).unwrap();
        assert_eq!(root.read("gpio5/value"), "1");
        gpio.set_level(PinId(5), Level::Low).unwrap();
        assert_eq!(root.read("gpio5/value"), "0");
    }

    #[test]
    fn test_set_level_unexported_rejected() {
        let root = ScratchRoot::new();
        let gpio = SysfsGpio::with_root(&root.0);
        assert_eq!(
            gpio.set_level(PinId(5), Level::High),
            Err(GpioError::InvalidMode)
        );
    }

    #[test]
    fn test_drop_unexports() {
        let root = ScratchRoot::new();
        {
            let gpio = SysfsGpio::with_root(&root.0);
            gpio.exported.lock().unwrap().push(PinId(26));
        }
        assert_eq!(root.read("unexport"), "26");
    }

    #[test]
    fn test_direction_and_level_values() {
        assert_eq!(direction_value(Level::Low), "low");
        assert_eq!(direction_value(Level::High), "high");
        assert_eq!(level_value(Level::High), "1");
    }
}
