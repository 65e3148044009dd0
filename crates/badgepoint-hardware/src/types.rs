//! Common types shared across peripheral implementations.

use serde::{Deserialize, Serialize};

/// Colors of the tri-color indicator LED.
///
/// The indicator shows exactly one color at a time; setting a color fully
/// replaces the previous one, never blends with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedColor {
    /// LED off.
    Off,

    /// Red: rejection or failure.
    Red,

    /// Green: success.
    Green,

    /// Blue: initialization.
    Blue,
}

impl LedColor {
    /// Get the RGB components of the LED color.
    #[must_use]
    pub fn as_rgb(&self) -> (u8, u8, u8) {
        match self {
            Self::Off => (0, 0, 0),
            Self::Red => (255, 0, 0),
            Self::Green => (0, 255, 0),
            Self::Blue => (0, 0, 255),
        }
    }
}
