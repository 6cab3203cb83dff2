//! Input sources
//!
//! An [`InputSource`] yields decoded [`InputEvent`]s one at a time. Waiting
//! for the next event is the only suspension point of the drive loop.

pub mod gamepad;

#[cfg(any(test, feature = "mock"))]
pub mod scripted;

use std::io;

use async_trait::async_trait;

pub use gamepad::{GamepadDecoder, GamepadInput};
#[cfg(any(test, feature = "mock"))]
pub use scripted::ScriptedInput;
pub use tank_drive_core::input::InputEvent;

/// Input backend failures
///
/// Every variant ends the session as a disconnected input.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Gamepad backend error: {0}")]
    Backend(String),

    #[error("No gamepad connected")]
    NoGamepad,

    #[error("Gamepad {0} not connected")]
    GamepadNotFound(usize),

    #[error("Failed to start gamepad thread: {0}")]
    Thread(#[from] io::Error),
}

/// Source of operator input events
#[async_trait]
pub trait InputSource: Send {
    /// Wait for the next event
    ///
    /// Returns `Ok(None)` at end of stream.
    ///
    /// # Errors
    ///
    /// Returns `InputError` if the backend fails.
    async fn next_event(&mut self) -> Result<Option<InputEvent>, InputError>;
}
