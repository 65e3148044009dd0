use crate::{
    Result,
    constants::{CHECKOUT_HOUR, MAX_TAG_LENGTH, MIN_TAG_LENGTH, MS_PER_HOUR},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// RFID tag UID (4-10 bytes).
///
/// The canonical text form is uppercase colon-separated hex, e.g.
/// `04:52:F3:2A`. Parsing accepts lowercase hex and missing colons, so every
/// representation a reader driver might hand us normalizes to the same value.
///
/// # Security
/// This type implements constant-time comparison so that directory lookups do
/// not leak how much of a presented tag matched an authorized one.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RfidTag(Vec<u8>);

impl RfidTag {
    /// Create a tag from raw UID bytes with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidTagFormat` if the UID length is outside the
    /// 4-10 byte range allowed by ISO 14443.
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        let len = bytes.len();
        if !(MIN_TAG_LENGTH..=MAX_TAG_LENGTH).contains(&len) {
            return Err(Error::InvalidTagFormat(format!(
                "UID must be {MIN_TAG_LENGTH}-{MAX_TAG_LENGTH} bytes, got {len}"
            )));
        }
        Ok(RfidTag(bytes))
    }

    /// Get the raw UID bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Render the canonical uppercase colon-separated hex form.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.0
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(":")
    }
}

impl fmt::Display for RfidTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

impl std::str::FromStr for RfidTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let hex: String = s
            .trim()
            .chars()
            .filter(|c| *c != ':' && !c.is_whitespace())
            .collect();

        if hex.is_empty() || hex.len() % 2 != 0 {
            return Err(Error::InvalidTagFormat(format!(
                "Expected whole hex bytes, got '{s}'"
            )));
        }

        let bytes = (0..hex.len())
            .step_by(2)
            .map(|i| {
                u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| {
                    Error::InvalidTagFormat(format!("Non-hex byte '{}' in '{s}'", &hex[i..i + 2]))
                })
            })
            .collect::<Result<Vec<u8>>>()?;

        RfidTag::new(bytes)
    }
}

impl TryFrom<String> for RfidTag {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<RfidTag> for String {
    fn from(tag: RfidTag) -> String {
        tag.canonical()
    }
}

/// Constant-time comparison implementation for RfidTag.
impl PartialEq for RfidTag {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl std::hash::Hash for RfidTag {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// Attendance action derived from a scan or forced by a trigger button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceAction {
    #[serde(rename = "CHECK_IN")]
    CheckIn,
    #[serde(rename = "CHECK_OUT")]
    CheckOut,
}

impl AttendanceAction {
    /// Get the wire name used in published payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceAction::CheckIn => "CHECK_IN",
            AttendanceAction::CheckOut => "CHECK_OUT",
        }
    }
}

impl fmt::Display for AttendanceAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AttendanceAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CHECK_IN" => Ok(AttendanceAction::CheckIn),
            "CHECK_OUT" => Ok(AttendanceAction::CheckOut),
            other => Err(Error::InvalidAction(other.to_string())),
        }
    }
}

/// Monotonic device time in milliseconds since boot.
///
/// The endpoint has no wall-clock source, so device time is folded into a
/// synthetic 24-hour cycle for anything that needs an "hour of day". This is
/// an explicit design constraint of the deployment environment, not an
/// oversight: see [`ActionClassifier`](crate::ActionClassifier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticks(u64);

impl Ticks {
    /// Device time zero (boot).
    pub const ZERO: Ticks = Ticks(0);

    /// Create from milliseconds since boot.
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Ticks(ms)
    }

    /// Milliseconds since boot.
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since an earlier instant, saturating at zero.
    #[must_use]
    pub const fn since(self, earlier: Ticks) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Hour of the synthetic 24-hour day, in `0..24`.
    #[must_use]
    pub const fn hour_of_day(self) -> u64 {
        (self.0 / MS_PER_HOUR) % 24
    }

    /// Whether this instant falls in the check-out half of the synthetic day.
    #[must_use]
    pub const fn is_afternoon(self) -> bool {
        self.hour_of_day() >= CHECKOUT_HOUR
    }

    /// Render the synthetic time of day as zero-padded `HH:MM:SS`.
    #[must_use]
    pub fn time_of_day(self) -> String {
        let total_secs = self.0 / 1000;
        let hours = (total_secs / 3600) % 24;
        let minutes = (total_secs / 60) % 60;
        let seconds = total_secs % 60;
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// A single attendance registration, built once and published at most once.
///
/// Events are never queued or persisted: if publication fails or the device
/// is offline, the event is dropped. Loss-tolerant telemetry is a deliberate
/// property of this system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceEvent {
    /// Tag that produced the event.
    pub tag: RfidTag,

    /// Check-in or check-out.
    pub action: AttendanceAction,

    /// Device-local time of the triggering scan or button press.
    pub timestamp: Ticks,

    /// Identifier of this endpoint.
    pub device_id: String,

    /// Installation location label.
    pub location: String,
}

/// Periodic liveness report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartbeatEvent {
    /// Identifier of this endpoint.
    pub device_id: String,

    /// Device-local time of emission.
    pub timestamp: Ticks,

    /// Free memory in bytes, as reported by the system monitor capability.
    pub free_memory: u64,

    /// Milliseconds since boot.
    pub uptime_ms: u64,
}
