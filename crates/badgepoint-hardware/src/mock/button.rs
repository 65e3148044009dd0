//! Mock trigger button.

use crate::{Result, traits::TriggerButton};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Mock momentary button backed by a shared level flag.
///
/// The handle sets the level; the device half reports it. Edge detection is
/// the controller's job, so a held button keeps reading `true` until
/// released, exactly like a real input pin.
#[derive(Debug)]
pub struct MockButton {
    pressed: Arc<AtomicBool>,
    name: String,
}

impl MockButton {
    /// Create a mock button with the given name, initially released.
    pub fn new(name: impl Into<String>) -> (Self, MockButtonHandle) {
        let pressed = Arc::new(AtomicBool::new(false));
        let name = name.into();

        let button = Self {
            pressed: Arc::clone(&pressed),
            name: name.clone(),
        };

        let handle = MockButtonHandle { pressed, name };

        (button, handle)
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl TriggerButton for MockButton {
    async fn is_pressed(&mut self) -> Result<bool> {
        Ok(self.pressed.load(Ordering::SeqCst))
    }
}

/// Handle for driving a [`MockButton`].
#[derive(Debug, Clone)]
pub struct MockButtonHandle {
    pressed: Arc<AtomicBool>,
    name: String,
}

impl MockButtonHandle {
    /// Press and hold the button.
    pub fn press(&self) {
        self.pressed.store(true, Ordering::SeqCst);
    }

    /// Release the button.
    pub fn release(&self) {
        self.pressed.store(false, Ordering::SeqCst);
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
