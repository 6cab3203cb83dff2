//! Core host infrastructure
//!
//! Logging macros and subscriber setup shared by the library and the
//! binary.

pub mod logging;
