//! Broker connectivity and event publication for the BadgePoint endpoint.
//!
//! This crate owns everything MQTT: wire payloads, topic naming, the link
//! state machine with its retry policy, and the best-effort publisher.
//!
//! # Architecture
//!
//! ```text
//! DeviceController
//!     │
//!     ├─> MqttLink <──(notifications)── pump task ──(rumqttc EventLoop)──> broker
//!     │      │  connection state machine, inbound commands
//!     │      └─> watch::channel(LinkState)
//!     │                    │
//!     └─> EventPublisher ──┴──(rumqttc AsyncClient)─> attendance / heartbeat
//! ```
//!
//! # Delivery model
//!
//! Attendance and heartbeat telemetry is at-most-once: a publish gets exactly
//! one attempt, offline publishes are skipped, and failed ones are dropped.
//! Nothing is queued or retried. This loss tolerance is a deliberate property
//! of the system, matched by QoS 0 on the wire.
//!
//! # Non-blocking connectivity
//!
//! The rumqttc event loop runs in a background pump task; [`MqttLink::poll`]
//! only drains its notifications, so the controller loop keeps servicing the
//! reader and buttons while the broker is unreachable or a handshake is in
//! flight. The retry policy itself is fixed-interval and unbounded (retry
//! forever).
#![allow(async_fn_in_trait)]

pub mod connection;
pub mod messages;
pub mod publisher;
pub mod topics;

pub use connection::{LinkEvent, LinkState, MqttConfig, MqttLink, RetryPolicy};
pub use messages::{AttendanceMessage, CommandMessage, DeviceCommand, HeartbeatMessage};
pub use publisher::{EventPublisher, PublishOutcome};
pub use topics::TopicSet;

use badgepoint_core::{AttendanceEvent, HeartbeatEvent, Ticks};

/// Broker link seam used by the device controller.
///
/// [`MqttLink`] is the production implementation; tests substitute fakes so
/// controller behavior can be exercised without a broker.
pub trait Link: Send {
    /// Current connection state.
    fn state(&self) -> LinkState;

    /// Collect connectivity events that arrived since the last call.
    ///
    /// Never blocks: connection progress happens elsewhere, this only
    /// observes it.
    async fn poll(&mut self, now: Ticks) -> Vec<LinkEvent>;
}

/// Publication seam used by the device controller.
///
/// Publishing never fails with an error: every outcome, including "we are
/// offline, the event is dropped", is an ordinary [`PublishOutcome`].
pub trait Publisher: Send {
    /// Publish one attendance event, best effort, single attempt.
    async fn publish_attendance(&mut self, event: &AttendanceEvent) -> PublishOutcome;

    /// Publish one heartbeat, best effort, single attempt.
    async fn publish_heartbeat(&mut self, event: &HeartbeatEvent) -> PublishOutcome;
}
