//! Wire payloads.
//!
//! Field names follow the backend's JSON contract (camelCase, string
//! timestamps) and must not drift: the server side deserializes these by
//! name.

use badgepoint_core::{AttendanceAction, AttendanceEvent, HeartbeatEvent};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Attendance payload published on the attendance topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceMessage {
    /// Canonical tag text, e.g. `04:52:F3:2A`.
    pub rfid_tag: String,

    /// `CHECK_IN` or `CHECK_OUT`.
    pub action: AttendanceAction,

    /// Device-local time of day, `HH:MM:SS`.
    pub timestamp: String,

    /// Endpoint identifier.
    pub device_id: String,

    /// Installation location label.
    pub location: String,
}

impl From<&AttendanceEvent> for AttendanceMessage {
    fn from(event: &AttendanceEvent) -> Self {
        Self {
            rfid_tag: event.tag.canonical(),
            action: event.action,
            timestamp: event.timestamp.time_of_day(),
            device_id: event.device_id.clone(),
            location: event.location.clone(),
        }
    }
}

/// Heartbeat payload published on the heartbeat topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatMessage {
    /// Endpoint identifier.
    pub device_id: String,

    /// Always `"online"`: a heartbeat that reaches the broker is by
    /// definition from an online device.
    pub status: String,

    /// Device-local time of day, `HH:MM:SS`.
    pub timestamp: String,

    /// Free memory in bytes.
    pub free_heap: u64,

    /// Milliseconds since boot.
    pub uptime: u64,
}

impl From<&HeartbeatEvent> for HeartbeatMessage {
    fn from(event: &HeartbeatEvent) -> Self {
        Self {
            device_id: event.device_id.clone(),
            status: "online".to_string(),
            timestamp: event.timestamp.time_of_day(),
            free_heap: event.free_memory,
            uptime: event.uptime_ms,
        }
    }
}

/// Inbound payload on the commands topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMessage {
    /// Command name; unrecognized names are ignored.
    pub command: String,
}

/// Commands the device acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    /// Restart the device immediately, without draining in-flight work.
    Reboot,
}

impl DeviceCommand {
    /// Parse a raw command payload.
    ///
    /// Returns `None` for malformed JSON and for unrecognized command names;
    /// both are ignored silently apart from a debug log, per the command
    /// channel contract.
    #[must_use]
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let message: CommandMessage = match serde_json::from_slice(payload) {
            Ok(m) => m,
            Err(e) => {
                debug!("Ignoring malformed command payload: {e}");
                return None;
            }
        };

        match message.command.as_str() {
            "reboot" => Some(DeviceCommand::Reboot),
            other => {
                debug!("Ignoring unrecognized command '{other}'");
                None
            }
        }
    }
}
