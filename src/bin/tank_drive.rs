//! Tank drive from a DualShock 4 controller.
//!
//! Acquires both motor channels, drives from gamepad events until the
//! controller disconnects or Ctrl+C is pressed, then leaves every motor line
//! low.
//!
//! Usage:
//!   cargo run --bin tank_drive -- [OPTIONS]
//!
//! Options:
//!   --gamepad <INDEX>         Gamepad id (default: first connected)
//!   --left-pins EN,FWD,REV    Left channel pins (default: 36,40,38)
//!   --right-pins EN,FWD,REV   Right channel pins (default: 37,33,35)
//!   --backend <sim|sysfs>     GPIO backend (default: sim; sysfs needs both pin options)
//!   -v, --verbose             Debug logging

use std::env;
use std::process;

use tank_drive::config::{self, CliCommand};
use tank_drive::platform::Gpio;
use tank_drive::supervisor::EXIT_INPUT_DISCONNECTED;
use tank_drive::{log_error, log_info, GamepadInput, Supervisor};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = match config::parse_args(env::args().skip(1)) {
        Ok(CliCommand::Run(config)) => config,
        Ok(CliCommand::Help) => {
            eprintln!("{}", config::usage());
            process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{}", config::usage());
            process::exit(1);
        }
    };

    tank_drive::core::logging::init(config.verbose);

    log_info!("=== tank_drive ===");
    match config.gamepad {
        Some(index) => log_info!("Backend: {}, gamepad: {}", config.backend, index),
        None => log_info!("Backend: {}, gamepad: first connected", config.backend),
    }

    let gpio = Gpio::new(config.backend);

    let mut input = match GamepadInput::open(config.gamepad).await {
        Ok(gamepad) => gamepad,
        Err(e) => {
            log_error!("{}", e);
            process::exit(EXIT_INPUT_DISCONNECTED);
        }
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log_error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let report = Supervisor::from_config(&config)
        .run(&gpio, &mut input, shutdown)
        .await;

    log_info!(
        "Session ended: {}, {} events, {} release faults",
        report.cause,
        report.events_processed,
        report.release_faults.len()
    );

    // Unexport sysfs pins before exiting
    drop(gpio);
    process::exit(report.exit_code());
}
