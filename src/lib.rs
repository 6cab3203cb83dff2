//! tank_drive - Game-controller tank drive for a two-motor skid-steer robot
//!
//! This library wires the pure drive logic from `tank_drive_core` to host
//! GPIO backends and gilrs gamepad input, and supervises a drive session
//! from pin acquisition to teardown.
//!
//! # Modules
//!
//! - [`core`]: Logging macros and subscriber setup
//! - [`config`]: Wiring defaults and command-line parsing
//! - [`platform`]: GPIO backends (simulated, sysfs, mock)
//! - [`input`]: Input sources (gilrs gamepad, scripted)
//! - [`supervisor`]: Session lifecycle and exit status

pub mod config;
pub mod core;
pub mod input;
pub mod platform;
pub mod supervisor;

#[doc(hidden)]
pub use tracing as __tracing;

pub use config::{BackendKind, CliCommand, ConfigError, TankConfig};
pub use input::{GamepadInput, InputError, InputSource};
pub use supervisor::{SessionReport, ShutdownCause, Side, Supervisor, SupervisorState};
