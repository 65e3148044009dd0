//! Attendance action classification.

use crate::types::{AttendanceAction, Ticks};

/// Derives an attendance action from the time of day.
///
/// The rule is a coarse heuristic inherited from the deployment: scans in the
/// first half of the synthetic day (hours 0-11) are check-ins, scans in the
/// second half (hours 12-23) are check-outs. It is not a presence model and
/// will misclassify, for example, an afternoon arrival. The trigger buttons
/// exist to let an operator override it.
///
/// Because the device clock is monotonic and unsynchronized, "hour of day"
/// here means hour of the synthetic 24-hour cycle since boot, not local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionClassifier;

impl ActionClassifier {
    /// Create a classifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Classify an instant into an attendance action.
    #[must_use]
    pub fn classify(&self, now: Ticks) -> AttendanceAction {
        if now.is_afternoon() {
            AttendanceAction::CheckOut
        } else {
            AttendanceAction::CheckIn
        }
    }
}
