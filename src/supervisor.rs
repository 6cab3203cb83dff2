//! Session supervisor
//!
//! Owns one drive session from pin acquisition to teardown:
//!
//! ```text
//! Idle -> Acquiring -> Running -> ShuttingDown -> Terminated
//!             |                        ^
//!             +------------------------+  (acquisition failed)
//! ```
//!
//! Running ends on interrupt, input end of stream, input read failure, or a
//! hardware fault while resolving the drive state. ShuttingDown releases
//! both channels independently, so a failing release never skips the
//! other one.

use std::fmt;
use std::future::Future;

use tank_drive_core::drive::Tank;
use tank_drive_core::input::InputMapper;
use tank_drive_core::motor::{ChannelPins, HardwareFault, Motor, MotorChannel};
use tank_drive_core::traits::GpioBackend;

use crate::config::TankConfig;
use crate::input::InputSource;
use crate::{log_debug, log_error, log_info, log_warn};

/// Exit status for a clean interrupt
pub const EXIT_OK: i32 = 0;
/// Exit status for an acquisition or run-time hardware fault
pub const EXIT_HARDWARE_FAULT: i32 = 1;
/// Exit status when the input backend went away
pub const EXIT_INPUT_DISCONNECTED: i32 = 2;
/// Exit status when only teardown failed
pub const EXIT_RELEASE_FAULT: i32 = 3;

/// Drive side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Supervisor lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Acquiring,
    Running,
    ShuttingDown,
    Terminated,
}

/// Why a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownCause {
    /// Shutdown future completed
    Interrupted,
    /// Input source reported end of stream
    InputEnded,
    /// Input source failed to read
    InputFailed(String),
    /// A channel could not be acquired
    AcquireFault { side: Side, fault: HardwareFault },
    /// Resolving the drive state failed while running
    RunFault(HardwareFault),
}

impl ShutdownCause {
    pub fn is_hardware_fault(&self) -> bool {
        matches!(
            self,
            ShutdownCause::AcquireFault { .. } | ShutdownCause::RunFault(_)
        )
    }

    pub fn is_input_disconnected(&self) -> bool {
        matches!(
            self,
            ShutdownCause::InputEnded | ShutdownCause::InputFailed(_)
        )
    }
}

impl fmt::Display for ShutdownCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownCause::Interrupted => write!(f, "interrupted"),
            ShutdownCause::InputEnded => write!(f, "input disconnected (end of stream)"),
            ShutdownCause::InputFailed(reason) => write!(f, "input disconnected ({reason})"),
            ShutdownCause::AcquireFault { side, fault } => {
                write!(f, "failed to acquire {side} motor: {fault}")
            }
            ShutdownCause::RunFault(fault) => write!(f, "hardware fault: {fault}"),
        }
    }
}

/// A release that failed during teardown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseFault {
    pub side: Side,
    pub fault: HardwareFault,
}

impl fmt::Display for ReleaseFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to release {} motor: {}", self.side, self.fault)
    }
}

/// Outcome of one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub cause: ShutdownCause,
    pub release_faults: Vec<ReleaseFault>,
    pub events_processed: usize,
    /// Every state entered, in order, starting with `Idle`
    pub states: Vec<SupervisorState>,
}

impl SessionReport {
    /// Process exit status for this outcome
    ///
    /// Hardware faults and input disconnects keep their own status even if
    /// teardown also failed; a release fault only shows on an interrupt.
    pub fn exit_code(&self) -> i32 {
        if self.cause.is_hardware_fault() {
            EXIT_HARDWARE_FAULT
        } else if self.cause.is_input_disconnected() {
            EXIT_INPUT_DISCONNECTED
        } else if !self.release_faults.is_empty() {
            EXIT_RELEASE_FAULT
        } else {
            EXIT_OK
        }
    }

    /// Whether the session ever reached `Running`
    pub fn reached_running(&self) -> bool {
        self.states.contains(&SupervisorState::Running)
    }
}

/// Runs one drive session
#[derive(Debug)]
pub struct Supervisor {
    left_pins: ChannelPins,
    right_pins: ChannelPins,
    state: SupervisorState,
    states: Vec<SupervisorState>,
    events_processed: usize,
}

impl Supervisor {
    pub fn new(left_pins: ChannelPins, right_pins: ChannelPins) -> Self {
        Self {
            left_pins,
            right_pins,
            state: SupervisorState::Idle,
            states: vec![SupervisorState::Idle],
            events_processed: 0,
        }
    }

    pub fn from_config(config: &TankConfig) -> Self {
        Self::new(config.left, config.right)
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    fn transition(&mut self, next: SupervisorState) {
        log_debug!("supervisor: {:?} -> {:?}", self.state, next);
        self.state = next;
        self.states.push(next);
    }

    /// Acquire both channels, drive from `input` until a shutdown cause
    /// occurs, then release both channels
    ///
    /// `shutdown` is polled before every input read, so once it completes
    /// no further event is applied.
    pub async fn run<G, I, F>(mut self, gpio: &G, input: &mut I, shutdown: F) -> SessionReport
    where
        G: GpioBackend + ?Sized,
        I: InputSource + ?Sized,
        F: Future<Output = ()>,
    {
        self.transition(SupervisorState::Acquiring);
        log_info!("Left motor: {}", self.left_pins);
        log_info!("Right motor: {}", self.right_pins);

        let mut left = MotorChannel::new(gpio, self.left_pins);
        let mut right = MotorChannel::new(gpio, self.right_pins);

        let acquired =
            acquire(&mut left, Side::Left).and_then(|()| acquire(&mut right, Side::Right));
        let cause = match acquired {
            Ok(()) => {
                self.transition(SupervisorState::Running);
                log_info!("Tank is ready for the action!");
                let mut tank = Tank::new(&mut left, &mut right);
                self.drive(&mut tank, input, shutdown).await
            }
            Err(cause) => cause,
        };

        match &cause {
            ShutdownCause::Interrupted => log_info!("Shut down!"),
            ShutdownCause::InputEnded | ShutdownCause::InputFailed(_) => {
                log_warn!("Shutting down: {}", cause)
            }
            _ => log_error!("Shutting down: {}", cause),
        }

        self.transition(SupervisorState::ShuttingDown);
        let mut release_faults = Vec::new();
        for (side, channel) in [(Side::Left, &mut left), (Side::Right, &mut right)] {
            match channel.release() {
                Ok(()) => log_debug!("{} motor released", side),
                Err(fault) => {
                    let fault = ReleaseFault { side, fault };
                    log_error!("{}", fault);
                    release_faults.push(fault);
                }
            }
        }
        self.transition(SupervisorState::Terminated);

        SessionReport {
            cause,
            release_faults,
            events_processed: self.events_processed,
            states: self.states,
        }
    }

    async fn drive<L, R, I, F>(
        &mut self,
        tank: &mut Tank<L, R>,
        input: &mut I,
        shutdown: F,
    ) -> ShutdownCause
    where
        L: Motor,
        R: Motor,
        I: InputSource + ?Sized,
        F: Future<Output = ()>,
    {
        let mut mapper = InputMapper::new();
        tokio::pin!(shutdown);

        loop {
            let next = tokio::select! {
                biased;
                _ = &mut shutdown => return ShutdownCause::Interrupted,
                next = input.next_event() => next,
            };

            let event = match next {
                Ok(Some(event)) => event,
                Ok(None) => return ShutdownCause::InputEnded,
                Err(e) => return ShutdownCause::InputFailed(e.to_string()),
            };

            self.events_processed += 1;
            match mapper.handle(event, tank) {
                Ok(action) => log_debug!("{:?} -> {} {:?}", event, action, tank.state()),
                Err(fault) => return ShutdownCause::RunFault(fault),
            }
        }
    }
}

fn acquire<G: GpioBackend>(channel: &mut MotorChannel<G>, side: Side) -> Result<(), ShutdownCause> {
    channel.acquire().map_err(|fault| ShutdownCause::AcquireFault { side, fault })?;
    log_info!("{} motor acquired", side);
    Ok(())
}
