//! Logging abstraction
//!
//! Provides the `log_*!` macro family used throughout the host crate. All
//! macros forward to `tracing`, so any subscriber can collect them:
//! - Binary: `tracing-subscriber` fmt layer filtered by [`init`]
//! - Tests: nothing installed, macros are cheap no-ops
//!
//! The drive core does not log; it returns values and faults which the
//! supervisor logs through these macros.

use tracing_subscriber::EnvFilter;

/// Default filter when neither `RUST_LOG` nor `--verbose` is given
pub const DEFAULT_FILTER: &str = "info";

/// Filter installed by `--verbose`
pub const VERBOSE_FILTER: &str = "debug";

/// Build the filter for the given verbosity
///
/// `--verbose` wins over `RUST_LOG`; otherwise `RUST_LOG` wins over the
/// default.
pub fn filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new(VERBOSE_FILTER);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global fmt subscriber
///
/// Calling it twice is harmless; the second install is ignored.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_target(false)
        .try_init();
}

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        $crate::__tracing::info!($($arg)*);
    }};
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        $crate::__tracing::warn!($($arg)*);
    }};
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        $crate::__tracing::error!($($arg)*);
    }};
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        $crate::__tracing::debug!($($arg)*);
    }};
}

/// Log trace message
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {{
        $crate::__tracing::trace!($($arg)*);
    }};
}
