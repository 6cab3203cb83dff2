//! Capability traits the drive core consumes.
//!
//! # Design
//!
//! - Trait definitions are pure and have no feature gates
//! - Backends (simulated, sysfs, mocks) live in the host crate

pub mod gpio;

pub use gpio::{GpioBackend, GpioError, Level, PinId};
