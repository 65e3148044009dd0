//! Peripheral trait definitions.
//!
//! These traits establish the contract between the device controller and its
//! peripherals, enabling substitution between mock and real hardware
//! implementations. See the crate docs for the non-blocking poll and
//! level-vs-edge conventions.

use crate::error::Result;
use crate::types::LedColor;
use badgepoint_core::RfidTag;

/// Proximity card reader abstraction.
///
/// # Examples
///
/// ```no_run
/// use badgepoint_hardware::traits::RfidReader;
/// use badgepoint_hardware::error::Result;
///
/// async fn drain_reader<R: RfidReader>(reader: &mut R) -> Result<u32> {
///     let mut scans = 0;
///     while let Some(tag) = reader.poll_card().await? {
///         println!("scanned {tag}");
///         scans += 1;
///     }
///     Ok(scans)
/// }
/// ```
pub trait RfidReader: Send + Sync {
    /// Poll for a card in the reader field.
    ///
    /// Returns `Ok(Some(tag))` if a card was read since the last poll,
    /// `Ok(None)` if the field is empty. Never blocks waiting for a card.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader is disconnected or the read produced
    /// data that does not form a valid UID.
    async fn poll_card(&mut self) -> Result<Option<RfidTag>>;
}

/// Momentary push button abstraction.
///
/// Reports the current level. The physical inputs are active-low; drivers
/// are expected to normalize so that `true` always means "pressed".
pub trait TriggerButton: Send + Sync {
    /// Read the current button level.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read.
    async fn is_pressed(&mut self) -> Result<bool>;
}

/// Tri-color indicator LED abstraction.
pub trait StatusLed: Send + Sync {
    /// Set the displayed color, replacing the previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be driven.
    async fn set_color(&mut self, color: LedColor) -> Result<()>;
}

/// System counters used to populate heartbeat reports.
pub trait SystemMonitor: Send + Sync {
    /// Free memory in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the counter cannot be sampled.
    async fn free_memory(&mut self) -> Result<u64>;
}
