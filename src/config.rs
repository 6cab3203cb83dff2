//! Runtime configuration and command-line parsing
//!
//! Defaults reproduce the reference wiring in BOARD numbering:
//!
//! | Channel | EN | FWD | REV |
//! |---------|----|-----|-----|
//! | Right   | 37 | 33  | 35  |
//! | Left    | 36 | 40  | 38  |
//!
//! The sysfs backend addresses kernel GPIO numbers, which differ from BOARD
//! numbers, so it only runs with explicit `--left-pins` and `--right-pins`.

use std::fmt;
use std::str::FromStr;

use tank_drive_core::motor::ChannelPins;
use tank_drive_core::traits::PinId;

/// Default left channel wiring
pub const DEFAULT_LEFT_PINS: ChannelPins = ChannelPins::new(36, 40, 38);

/// Default right channel wiring
pub const DEFAULT_RIGHT_PINS: ChannelPins = ChannelPins::new(37, 33, 35);

/// Command-line errors
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("--{0} requires a value")]
    MissingValue(&'static str),

    #[error("Invalid value for --{option}: {value} (expected EN,FWD,REV)")]
    InvalidPins { option: &'static str, value: String },

    #[error("Invalid gamepad index: {0}")]
    InvalidGamepad(String),

    #[error("Invalid backend: {0} (expected sim or sysfs)")]
    InvalidBackend(String),

    #[error("Pin {0} assigned more than once")]
    DuplicatePin(u16),

    #[error("--backend sysfs needs --left-pins and --right-pins (kernel GPIO numbers)")]
    SysfsPinsRequired,
}

/// GPIO backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// In-process simulated GPIO
    #[default]
    Sim,
    /// Linux `/sys/class/gpio`
    Sysfs,
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sim" => Ok(BackendKind::Sim),
            "sysfs" => Ok(BackendKind::Sysfs),
            other => Err(ConfigError::InvalidBackend(other.to_string())),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Sim => write!(f, "sim"),
            BackendKind::Sysfs => write!(f, "sysfs"),
        }
    }
}

/// Everything the binary needs to start a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TankConfig {
    /// gilrs gamepad id; `None` takes the first connected gamepad
    pub gamepad: Option<usize>,
    pub left: ChannelPins,
    pub right: ChannelPins,
    pub backend: BackendKind,
    pub verbose: bool,
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            gamepad: None,
            left: DEFAULT_LEFT_PINS,
            right: DEFAULT_RIGHT_PINS,
            backend: BackendKind::default(),
            verbose: false,
        }
    }
}

impl TankConfig {
    /// Reject wiring that assigns one pin to two lines
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DuplicatePin` with the first repeated pin.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pins = [
            self.left.enable,
            self.left.forward,
            self.left.reverse,
            self.right.enable,
            self.right.forward,
            self.right.reverse,
        ];
        for (i, pin) in pins.iter().enumerate() {
            if pins[..i].contains(pin) {
                return Err(ConfigError::DuplicatePin(pin.0));
            }
        }
        Ok(())
    }
}

/// What the command line asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Run(TankConfig),
    Help,
}

/// Parse arguments (without the program name)
///
/// # Errors
///
/// Returns `ConfigError` for unknown options, missing or malformed values,
/// duplicate pin assignments, and a sysfs backend left on default wiring.
pub fn parse_args<I>(args: I) -> Result<CliCommand, ConfigError>
where
    I: IntoIterator<Item = String>,
{
    let mut config = TankConfig::default();
    let mut args = args.into_iter();
    let mut left_given = false;
    let mut right_given = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--gamepad" => {
                let value = required(&mut args, "gamepad")?;
                config.gamepad = Some(
                    value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidGamepad(value))?,
                );
            }
            "--left-pins" => {
                config.left = parse_pins(&required(&mut args, "left-pins")?, "left-pins")?;
                left_given = true;
            }
            "--right-pins" => {
                config.right = parse_pins(&required(&mut args, "right-pins")?, "right-pins")?;
                right_given = true;
            }
            "--backend" => {
                config.backend = required(&mut args, "backend")?.parse()?;
            }
            "-v" | "--verbose" => config.verbose = true,
            "-h" | "--help" => return Ok(CliCommand::Help),
            other => return Err(ConfigError::UnknownOption(other.to_string())),
        }
    }

    if config.backend == BackendKind::Sysfs && !(left_given && right_given) {
        return Err(ConfigError::SysfsPinsRequired);
    }
    config.validate()?;
    Ok(CliCommand::Run(config))
}

fn required<I>(args: &mut I, name: &'static str) -> Result<String, ConfigError>
where
    I: Iterator<Item = String>,
{
    args.next().ok_or(ConfigError::MissingValue(name))
}

fn parse_pins(value: &str, option: &'static str) -> Result<ChannelPins, ConfigError> {
    let invalid = || ConfigError::InvalidPins {
        option,
        value: value.to_string(),
    };

    let pins: Vec<u16> = value
        .split(',')
        .map(|part| part.trim().parse::<u16>())
        .collect::<Result<_, _>>()
        .map_err(|_| invalid())?;

    match pins.as_slice() {
        &[enable, forward, reverse] => Ok(ChannelPins {
            enable: PinId(enable),
            forward: PinId(forward),
            reverse: PinId(reverse),
        }),
        _ => Err(invalid()),
    }
}

/// Help text printed for `-h/--help` and after argument errors
pub fn usage() -> &'static str {
    "Usage: tank_drive [OPTIONS]\n\
     \n\
     Options:\n\
     \x20 --gamepad <INDEX>         Gamepad id (default: first connected)\n\
     \x20 --left-pins EN,FWD,REV    Left channel pins (default: 36,40,38)\n\
     \x20 --right-pins EN,FWD,REV   Right channel pins (default: 37,33,35)\n\
     \x20 --backend <sim|sysfs>     GPIO backend (default: sim; sysfs needs both pin options)\n\
     \x20 -v, --verbose             Debug logging (overrides RUST_LOG)\n\
     \x20 -h, --help                Show this help"
}
