//! tank_drive_core - Pure no_std drive logic for tank_drive
//!
//! This crate contains the platform-agnostic part of the tank: motor
//! channels, the differential drive state, and the input-to-drive mapping.
//! Everything here is testable on the host without hardware.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies
//! - **Trait abstractions**: GPIO injected via [`traits::GpioBackend`]
//!
//! # Modules
//!
//! - [`traits`]: GPIO capability consumed by the motor channels
//! - [`motor`]: H-bridge motor channel and the `Motor` contract
//! - [`drive`]: Drive state accumulator and the `Tank`
//! - [`input`]: Input events and the `InputMapper`

#![no_std]

pub mod drive;
pub mod input;
pub mod motor;
pub mod traits;
