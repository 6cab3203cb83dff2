//! Scripted input source for testing

use std::collections::VecDeque;

use async_trait::async_trait;

use super::{InputError, InputEvent, InputSource};

#[derive(Debug)]
enum Step {
    Event(InputEvent),
    Error(InputError),
}

/// What happens once the script runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exhausted {
    /// Report end of stream
    EndOfStream,
    /// Wait forever, like an idle controller
    Pending,
}

/// In-memory event queue implementing [`InputSource`]
#[derive(Debug)]
pub struct ScriptedInput {
    steps: VecDeque<Step>,
    exhausted: Exhausted,
    delivered: usize,
}

impl ScriptedInput {
    /// Script that yields `events` then reports end of stream
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            steps: events.into_iter().map(Step::Event).collect(),
            exhausted: Exhausted::EndOfStream,
            delivered: 0,
        }
    }

    /// Append a read failure after the queued events
    pub fn then_error(mut self, error: InputError) -> Self {
        self.steps.push_back(Step::Error(error));
        self
    }

    /// Block forever once the queue is drained
    pub fn then_pending(mut self) -> Self {
        self.exhausted = Exhausted::Pending;
        self
    }

    /// Events handed out so far
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

#[async_trait]
impl InputSource for ScriptedInput {
    async fn next_event(&mut self) -> Result<Option<InputEvent>, InputError> {
        match self.steps.pop_front() {
            Some(Step::Event(event)) => {
                self.delivered += 1;
                Ok(Some(event))
            }
            Some(Step::Error(error)) => Err(error),
            None => match self.exhausted {
                Exhausted::EndOfStream => Ok(None),
                Exhausted::Pending => std::future::pending().await,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tank_drive_core::input::{Button, HatDirection};

    #[tokio::test]
    async fn test_scripted_yields_in_order() {
        let mut input = ScriptedInput::new([
            InputEvent::DirectionalPress(HatDirection::Up),
            InputEvent::ButtonPress(Button::L1),
        ]);

        assert_eq!(
            input.next_event().await.unwrap(),
            Some(InputEvent::DirectionalPress(HatDirection::Up))
        );
        assert_eq!(
            input.next_event().await.unwrap(),
            Some(InputEvent::ButtonPress(Button::L1))
        );
        assert_eq!(input.next_event().await.unwrap(), None);
        assert_eq!(input.delivered(), 2);
    }

    #[tokio::test]
    async fn test_scripted_error() {
        let mut input = ScriptedInput::new([]).then_error(InputError::GamepadNotFound(2));
        assert!(matches!(
            input.next_event().await,
            Err(InputError::GamepadNotFound(2))
        ));
        assert_eq!(input.remaining(), 0);
    }
}
