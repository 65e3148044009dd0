//! Best-effort event publication.

use crate::connection::LinkState;
use crate::topics::TopicSet;
use badgepoint_core::{AttendanceEvent, HeartbeatEvent};
use rumqttc::{AsyncClient, QoS};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Result of a single publish attempt.
///
/// There is no error variant on purpose: every way a publish can go is an
/// ordinary outcome the controller maps to an indicator state (or, for
/// `SkippedOffline`, to nothing at all).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The transport accepted the message.
    Delivered,

    /// The transport rejected the message; the event is dropped.
    Failed,

    /// The link was not online; the event is dropped without an attempt.
    SkippedOffline,
}

/// Builds wire payloads and emits them with at-most-once semantics.
///
/// The publisher observes the link state through a watch channel fed by
/// [`MqttLink`](crate::MqttLink); it never initiates or repairs connections
/// itself. One attempt per event, no queueing, no retry.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    client: AsyncClient,
    topics: TopicSet,
    link_state: watch::Receiver<LinkState>,
}

impl EventPublisher {
    /// Create a publisher over an existing client.
    #[must_use]
    pub fn new(
        client: AsyncClient,
        topics: TopicSet,
        link_state: watch::Receiver<LinkState>,
    ) -> Self {
        Self {
            client,
            topics,
            link_state,
        }
    }

    /// Publish one attendance event.
    pub async fn publish_attendance(&self, event: &AttendanceEvent) -> PublishOutcome {
        let topic = self.topics.attendance.clone();
        let message = crate::messages::AttendanceMessage::from(event);
        let outcome = self.publish_json(topic, &message).await;
        if outcome == PublishOutcome::Delivered {
            info!(
                "Published {} for tag {} at {}",
                event.action,
                event.tag,
                event.timestamp.time_of_day()
            );
        }
        outcome
    }

    /// Publish one heartbeat.
    pub async fn publish_heartbeat(&self, event: &HeartbeatEvent) -> PublishOutcome {
        let topic = self.topics.heartbeat.clone();
        let message = crate::messages::HeartbeatMessage::from(event);
        self.publish_json(topic, &message).await
    }

    async fn publish_json<T: Serialize>(&self, topic: String, message: &T) -> PublishOutcome {
        if !self.link_state.borrow().is_online() {
            debug!("Link not online, dropping event for '{topic}'");
            return PublishOutcome::SkippedOffline;
        }

        let payload = match serde_json::to_vec(message) {
            Ok(p) => p,
            Err(e) => {
                warn!("Failed to encode payload for '{topic}': {e}");
                return PublishOutcome::Failed;
            }
        };

        match self
            .client
            .publish(topic.clone(), QoS::AtMostOnce, false, payload)
            .await
        {
            Ok(()) => PublishOutcome::Delivered,
            Err(e) => {
                warn!("Publish to '{topic}' failed: {e}");
                PublishOutcome::Failed
            }
        }
    }
}

impl crate::Publisher for EventPublisher {
    async fn publish_attendance(&mut self, event: &AttendanceEvent) -> PublishOutcome {
        EventPublisher::publish_attendance(self, event).await
    }

    async fn publish_heartbeat(&mut self, event: &HeartbeatEvent) -> PublishOutcome {
        EventPublisher::publish_heartbeat(self, event).await
    }
}
