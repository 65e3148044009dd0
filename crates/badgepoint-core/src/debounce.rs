//! Scan debouncing.
//!
//! An RFID reader in presence-poll mode reports the same card repeatedly
//! while it sits on the antenna. The debouncer collapses those repeats into a
//! single accepted scan per cooldown window. It works on raw tags and knows
//! nothing about authorization: an unauthorized card is debounced exactly
//! like an authorized one.

use crate::{constants::SCAN_COOLDOWN_MS, types::RfidTag, types::Ticks};

/// Suppresses repeated reads of the same tag inside a cooldown window.
///
/// Owns the scan memory (last tag + last accepted time). State is volatile;
/// after a restart the first scan always passes.
#[derive(Debug, Clone)]
pub struct ScanDebouncer {
    cooldown_ms: u64,
    last_tag: Option<RfidTag>,
    last_scan_at: Ticks,
}

impl ScanDebouncer {
    /// Create a debouncer with the default cooldown.
    #[must_use]
    pub fn new() -> Self {
        Self::with_cooldown(SCAN_COOLDOWN_MS)
    }

    /// Create a debouncer with a custom cooldown in milliseconds.
    #[must_use]
    pub fn with_cooldown(cooldown_ms: u64) -> Self {
        Self {
            cooldown_ms,
            last_tag: None,
            last_scan_at: Ticks::ZERO,
        }
    }

    /// Decide whether a scan should be processed.
    ///
    /// Returns `false` iff `tag` equals the last accepted tag and less than
    /// the cooldown has elapsed since it was accepted. On acceptance the
    /// scan memory is updated to `(tag, now)`.
    pub fn accept(&mut self, tag: &RfidTag, now: Ticks) -> bool {
        if let Some(last) = &self.last_tag
            && last == tag
            && now.since(self.last_scan_at) < self.cooldown_ms
        {
            return false;
        }

        self.last_tag = Some(tag.clone());
        self.last_scan_at = now;
        true
    }

    /// The last accepted tag, if any.
    #[must_use]
    pub fn last_tag(&self) -> Option<&RfidTag> {
        self.last_tag.as_ref()
    }
}

impl Default for ScanDebouncer {
    fn default() -> Self {
        Self::new()
    }
}
