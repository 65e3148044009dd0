//! Device controller for the BadgePoint attendance endpoint.
//!
//! Ties the pure decision components from `badgepoint-core`, the peripheral
//! traits from `badgepoint-hardware`, and the broker seams from
//! `badgepoint-mqtt` into one cooperative, single-task control loop.

pub mod controller;
pub mod error;
pub mod indicator;

pub use controller::{ControllerConfig, DeviceController, DeviceIdentity, StepOutcome};
pub use error::{ControllerError, Result};
pub use indicator::{IndicatorState, StatusIndicator};
