//! Peripheral abstraction layer for the BadgePoint attendance endpoint.
//!
//! This crate defines trait interfaces for the four peripherals the device
//! logic touches: the RFID card reader, the two manual trigger buttons, the
//! tri-color indicator LED, and a system monitor for heartbeat counters.
//! The traits keep the controller independent of real hardware; mock
//! implementations in [`mock`] stand in for drivers during development and
//! testing.
//!
//! # Design
//!
//! - All I/O methods are native `async fn` in traits (edition 2024 RPITIT);
//!   no `async_trait` macro.
//! - Reads are non-blocking polls. The controller runs a cooperative loop
//!   and must never stall on an idle peripheral, so [`RfidReader::poll_card`]
//!   returns `Ok(None)` when no card is in the field instead of waiting.
//! - Buttons report level, not edges. Edge detection (released-to-pressed)
//!   belongs to the controller, which owns the previous-state memory.
//! - All operations return [`Result<T>`][error::Result] with
//!   [`HardwareError`] detail.

#![allow(async_fn_in_trait)]

pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

pub use error::{HardwareError, Result};
pub use traits::{RfidReader, StatusLed, SystemMonitor, TriggerButton};
pub use types::LedColor;
