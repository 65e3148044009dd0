//! Mock indicator LED.

use crate::{Result, traits::StatusLed, types::LedColor};
use tokio::sync::watch;

/// Mock tri-color LED with an observable color.
///
/// The displayed color is published through a watch channel so tests can
/// assert on it after the device half has been moved into the controller.
#[derive(Debug)]
pub struct MockLed {
    color_tx: watch::Sender<LedColor>,
}

impl MockLed {
    /// Create a mock LED, initially off.
    pub fn new() -> (Self, MockLedHandle) {
        let (color_tx, color_rx) = watch::channel(LedColor::Off);
        (Self { color_tx }, MockLedHandle { color_rx })
    }

    /// Get the currently displayed color.
    pub fn color(&self) -> LedColor {
        *self.color_tx.borrow()
    }
}

impl StatusLed for MockLed {
    async fn set_color(&mut self, color: LedColor) -> Result<()> {
        // send_replace never fails even with no receivers
        self.color_tx.send_replace(color);
        Ok(())
    }
}

/// Handle for observing a [`MockLed`].
#[derive(Debug, Clone)]
pub struct MockLedHandle {
    color_rx: watch::Receiver<LedColor>,
}

impl MockLedHandle {
    /// Get the currently displayed color.
    pub fn color(&self) -> LedColor {
        *self.color_rx.borrow()
    }
}
