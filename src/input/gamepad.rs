//! Gamepad input through gilrs
//!
//! `Gilrs` blocks while waiting for events, so it lives on its own thread
//! and forwards the selected gamepad's events over a tokio channel. The
//! drive loop only awaits the channel, which keeps cancellation with the
//! supervisor's `select!`.
//!
//! gilrs reports a DualShock 4 with the SDL layout:
//!
//! | gilrs             | Controller |
//! |-------------------|------------|
//! | South / East      | Cross / Circle |
//! | North / West      | Triangle / Square |
//! | LeftTrigger(2)    | L1 (L2)    |
//! | RightTrigger(2)   | R1 (R2)    |
//! | Select / Start / Mode | Share / Options / PS |
//! | LeftThumb / RightThumb | L3 / R3 |
//! | DPad*             | D-pad      |
//!
//! Pads without a D-pad mapping report it as `DPadX`/`DPadY` axes that go
//! back to 0 without saying which direction was released, so the decoder
//! remembers the last pressed direction per axis.

use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use gilrs::{Axis, EventType, GamepadId, Gilrs};
use tokio::sync::{mpsc, oneshot};

use tank_drive_core::input::{Button, Deflection, HatDirection, InputEvent, StickAxis};

use super::{InputError, InputSource};
use crate::{log_debug, log_info, log_trace};

/// How long the pump thread waits before checking the receiver is alive
const PUMP_POLL: Duration = Duration::from_millis(100);

/// Queued events between the pump thread and the drive loop
const EVENT_QUEUE: usize = 64;

fn button(button: gilrs::Button) -> Option<Button> {
    use gilrs::Button as G;

    Some(match button {
        G::South => Button::Cross,
        G::East => Button::Circle,
        G::North => Button::Triangle,
        G::West => Button::Square,
        G::LeftTrigger => Button::L1,
        G::RightTrigger => Button::R1,
        G::LeftTrigger2 => Button::L2,
        G::RightTrigger2 => Button::R2,
        G::Select => Button::Share,
        G::Start => Button::Options,
        G::Mode => Button::Ps,
        G::LeftThumb => Button::L3,
        G::RightThumb => Button::R3,
        _ => return None,
    })
}

fn dpad(button: gilrs::Button) -> Option<HatDirection> {
    use gilrs::Button as G;

    match button {
        G::DPadUp => Some(HatDirection::Up),
        G::DPadDown => Some(HatDirection::Down),
        G::DPadLeft => Some(HatDirection::Left),
        G::DPadRight => Some(HatDirection::Right),
        _ => None,
    }
}

/// Stateful gamepad event decoder
#[derive(Debug, Default)]
pub struct GamepadDecoder {
    /// Last pressed direction on the D-pad X and Y axes
    hat: [Option<HatDirection>; 2],
}

impl GamepadDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one gilrs event
    ///
    /// Returns `None` for events with no drive meaning: analog trigger
    /// changes, repeats, connection changes and unmapped buttons.
    pub fn decode(&mut self, event: EventType) -> Option<InputEvent> {
        match event {
            EventType::ButtonPressed(b, _) => self.button(b, true),
            EventType::ButtonReleased(b, _) => self.button(b, false),
            EventType::AxisChanged(axis, value, _) => self.axis(axis, value),
            _ => None,
        }
    }

    /// Decode a button edge
    pub fn button(&mut self, b: gilrs::Button, pressed: bool) -> Option<InputEvent> {
        if let Some(direction) = dpad(b) {
            return Some(if pressed {
                InputEvent::DirectionalPress(direction)
            } else {
                InputEvent::DirectionalRelease(direction)
            });
        }
        let b = button(b)?;
        Some(if pressed {
            InputEvent::ButtonPress(b)
        } else {
            InputEvent::ButtonRelease(b)
        })
    }

    /// Decode an axis position in `[-1.0, 1.0]`
    ///
    /// gilrs reports up as positive on vertical axes; [`Deflection`] uses
    /// negative for up, so vertical values are flipped.
    pub fn axis(&mut self, axis: Axis, value: f32) -> Option<InputEvent> {
        let (stick, vertical) = match axis {
            Axis::LeftStickX => (StickAxis::LeftX, false),
            Axis::LeftStickY => (StickAxis::LeftY, true),
            Axis::RightStickX => (StickAxis::RightX, false),
            Axis::RightStickY => (StickAxis::RightY, true),
            Axis::DPadX => return self.hat(0, value, HatDirection::Right, HatDirection::Left),
            Axis::DPadY => return self.hat(1, value, HatDirection::Up, HatDirection::Down),
            _ => return None,
        };

        // gilrs' deadzone filter snaps rest to exactly zero
        if value == 0.0 {
            return Some(InputEvent::StickRest(stick));
        }
        let negative = (value < 0.0) != vertical;
        Some(InputEvent::StickDeflect(
            stick,
            if negative {
                Deflection::Negative
            } else {
                Deflection::Positive
            },
        ))
    }

    fn hat(
        &mut self,
        slot: usize,
        value: f32,
        positive: HatDirection,
        negative: HatDirection,
    ) -> Option<InputEvent> {
        if value == 0.0 {
            return self.hat[slot].take().map(InputEvent::DirectionalRelease);
        }
        let direction = if value > 0.0 { positive } else { negative };
        self.hat[slot] = Some(direction);
        Some(InputEvent::DirectionalPress(direction))
    }
}

/// Pick the gamepad to drive from
///
/// With an index, only the gamepad whose gilrs id converts to that index
/// matches; without one, the first connected gamepad is used.
fn select_gamepad(
    connected: impl IntoIterator<Item = usize>,
    wanted: Option<usize>,
) -> Result<usize, InputError> {
    let mut connected = connected.into_iter();
    match wanted {
        Some(index) => connected
            .find(|&id| id == index)
            .ok_or(InputError::GamepadNotFound(index)),
        None => connected.next().ok_or(InputError::NoGamepad),
    }
}

/// Gamepad read through gilrs on a pump thread
#[derive(Debug)]
pub struct GamepadInput {
    index: usize,
    name: String,
    events: mpsc::Receiver<EventType>,
    decoder: GamepadDecoder,
}

impl GamepadInput {
    /// Start gilrs and attach to a gamepad
    ///
    /// `index` selects a gamepad by its gilrs id; `None` takes the first
    /// connected one.
    ///
    /// # Errors
    ///
    /// Returns `InputError` if gilrs cannot start, the pump thread cannot
    /// be spawned, or no matching gamepad is connected.
    pub async fn open(index: Option<usize>) -> Result<Self, InputError> {
        let (ready_tx, ready_rx) = oneshot::channel();
        let (event_tx, events) = mpsc::channel(EVENT_QUEUE);

        thread::Builder::new()
            .name("gamepad".into())
            .spawn(move || pump(index, ready_tx, event_tx))?;

        let (index, name) = ready_rx
            .await
            .map_err(|_| InputError::Backend("gamepad thread exited".into()))??;
        log_info!("Gamepad {}: {}", index, name);

        Ok(Self {
            index,
            name,
            events,
            decoder: GamepadDecoder::new(),
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

type Ready = Result<(usize, String), InputError>;

/// Pump thread body: owns `Gilrs` and forwards the selected pad's events
fn pump(wanted: Option<usize>, ready: oneshot::Sender<Ready>, events: mpsc::Sender<EventType>) {
    let mut gilrs = match Gilrs::new() {
        Ok(gilrs) => gilrs,
        Err(e) => {
            let _ = ready.send(Err(InputError::Backend(e.to_string())));
            return;
        }
    };

    let connected: Vec<usize> = gilrs.gamepads().map(|(id, _)| usize::from(id)).collect();
    let selected: GamepadId = match select_gamepad(connected, wanted) {
        Ok(index) => match gilrs.gamepads().find(|(id, _)| usize::from(*id) == index) {
            Some((id, _)) => id,
            None => {
                let _ = ready.send(Err(InputError::GamepadNotFound(index)));
                return;
            }
        },
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    let name = gilrs.gamepad(selected).name().to_string();
    if ready.send(Ok((usize::from(selected), name))).is_err() {
        return;
    }

    while !events.is_closed() {
        let Some(event) = gilrs.next_event_blocking(Some(PUMP_POLL)) else {
            continue;
        };
        if event.id != selected {
            continue;
        }
        let disconnected = event.event == EventType::Disconnected;
        if events.blocking_send(event.event).is_err() || disconnected {
            break;
        }
    }
    log_debug!("gamepad thread stopped");
}

#[async_trait]
impl InputSource for GamepadInput {
    async fn next_event(&mut self) -> Result<Option<InputEvent>, InputError> {
        loop {
            // Channel closes when the pump thread stops
            let Some(raw) = self.events.recv().await else {
                return Ok(None);
            };
            log_trace!("gamepad {} {:?}", self.index, raw);
            if raw == EventType::Disconnected {
                return Ok(None);
            }
            if let Some(event) = self.decoder.decode(raw) {
                return Ok(Some(event));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gilrs::Button as G;

    #[test]
    fn test_face_and_shoulder_buttons() {
        let mut decoder = GamepadDecoder::new();
        assert_eq!(
            decoder.button(G::East, true),
            Some(InputEvent::ButtonPress(Button::Circle))
        );
        assert_eq!(
            decoder.button(G::South, false),
            Some(InputEvent::ButtonRelease(Button::Cross))
        );
        assert_eq!(
            decoder.button(G::LeftTrigger, true),
            Some(InputEvent::ButtonPress(Button::L1))
        );
        assert_eq!(
            decoder.button(G::RightTrigger, false),
            Some(InputEvent::ButtonRelease(Button::R1))
        );
        assert_eq!(
            decoder.button(G::Start, true),
            Some(InputEvent::ButtonPress(Button::Options))
        );
    }

    #[test]
    fn test_unmapped_buttons_dropped() {
        let mut decoder = GamepadDecoder::new();
        assert_eq!(decoder.button(G::C, true), None);
        assert_eq!(decoder.button(G::Unknown, false), None);
    }

    #[test]
    fn test_dpad_buttons() {
        let mut decoder = GamepadDecoder::new();
        assert_eq!(
            decoder.button(G::DPadUp, true),
            Some(InputEvent::DirectionalPress(HatDirection::Up))
        );
        assert_eq!(
            decoder.button(G::DPadUp, false),
            Some(InputEvent::DirectionalRelease(HatDirection::Up))
        );
        assert_eq!(
            decoder.button(G::DPadLeft, true),
            Some(InputEvent::DirectionalPress(HatDirection::Left))
        );
    }

    #[test]
    fn test_right_stick() {
        let mut decoder = GamepadDecoder::new();
        // Pushed up
        assert_eq!(
            decoder.axis(Axis::RightStickY, 0.8),
            Some(InputEvent::StickDeflect(StickAxis::RightY, Deflection::Negative))
        );
        assert_eq!(
            decoder.axis(Axis::RightStickX, 0.5),
            Some(InputEvent::StickDeflect(StickAxis::RightX, Deflection::Positive))
        );
        assert_eq!(
            decoder.axis(Axis::RightStickX, -0.5),
            Some(InputEvent::StickDeflect(StickAxis::RightX, Deflection::Negative))
        );
        assert_eq!(
            decoder.axis(Axis::RightStickY, 0.0),
            Some(InputEvent::StickRest(StickAxis::RightY))
        );
    }

    #[test]
    fn test_trigger_axes_ignored() {
        let mut decoder = GamepadDecoder::new();
        assert_eq!(decoder.axis(Axis::LeftZ, 1.0), None);
        assert_eq!(decoder.axis(Axis::RightZ, -1.0), None);
    }

    #[test]
    fn test_dpad_axis_release_reports_pressed_direction() {
        let mut decoder = GamepadDecoder::new();
        assert_eq!(
            decoder.axis(Axis::DPadY, 1.0),
            Some(InputEvent::DirectionalPress(HatDirection::Up))
        );
        assert_eq!(
            decoder.axis(Axis::DPadX, 1.0),
            Some(InputEvent::DirectionalPress(HatDirection::Right))
        );
        assert_eq!(
            decoder.axis(Axis::DPadY, 0.0),
            Some(InputEvent::DirectionalRelease(HatDirection::Up))
        );
        assert_eq!(
            decoder.axis(Axis::DPadX, 0.0),
            Some(InputEvent::DirectionalRelease(HatDirection::Right))
        );
        // Nothing held any more
        assert_eq!(decoder.axis(Axis::DPadX, 0.0), None);
    }

    #[test]
    fn test_select_gamepad() {
        assert!(matches!(select_gamepad([2, 5], None), Ok(2)));
        assert!(matches!(select_gamepad([2, 5], Some(5)), Ok(5)));
        assert!(matches!(
            select_gamepad([2, 5], Some(1)),
            Err(InputError::GamepadNotFound(1))
        ));
        assert!(matches!(
            select_gamepad(Vec::<usize>::new(), None),
            Err(InputError::NoGamepad)
        ));
    }

    #[tokio::test]
    async fn test_disconnect_is_end_of_stream() {
        let (tx, events) = mpsc::channel(EVENT_QUEUE);
        let mut input = GamepadInput {
            index: 0,
            name: "test pad".into(),
            events,
            decoder: GamepadDecoder::new(),
        };

        // Connection events carry no drive meaning and are skipped
        tx.send(EventType::Connected).await.unwrap();
        tx.send(EventType::Disconnected).await.unwrap();
        assert_eq!(input.next_event().await.unwrap(), None);

        drop(tx);
        assert_eq!(input.next_event().await.unwrap(), None);
        assert_eq!(input.index(), 0);
        assert_eq!(input.name(), "test pad");
    }
}
