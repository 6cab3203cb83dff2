//! Mock platform implementation for testing
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled
//!
//! # Example
//!
//! ```
//! use tank_drive::platform::mock::MockGpio;
//! use tank_drive_core::traits::{GpioBackend, Level, PinId};
//!
//! let gpio = MockGpio::new();
//! gpio.configure_output(PinId(37), Level::Low).unwrap();
//! assert_eq!(gpio.level(PinId(37)), Some(Level::Low));
//! ```

#![cfg(any(test, feature = "mock"))]

mod gpio;

pub use gpio::{GpioOp, MockGpio};
