//! Mock peripheral implementations for testing and development.
//!
//! Each mock comes as a (device, handle) pair: the device half implements the
//! peripheral trait and is handed to the controller, while the handle stays
//! with the test or simulator and drives the "physical" side (presenting
//! cards, pressing buttons, inspecting the LED).

mod button;
mod led;
mod monitor;
mod rfid;

pub use button::{MockButton, MockButtonHandle};
pub use led::{MockLed, MockLedHandle};
pub use monitor::{MockSystemMonitor, MockSystemMonitorHandle};
pub use rfid::{MockRfid, MockRfidHandle};
