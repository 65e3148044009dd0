//! Broker link state machine.
//!
//! # States
//!
//! - `TransportDown`: no network path to the broker host.
//! - `BrokerDown`: the transport reaches the host but the MQTT handshake is
//!   failing or was rejected.
//! - `Online`: connected, subscribed to the commands topic.
//!
//! Loss is detected from the event loop error on the next notification;
//! there is no separate keepalive watchdog here because rumqttc's own
//! keepalive surfaces as an event loop error when it trips.
//!
//! # Event loop pump
//!
//! The rumqttc event loop runs in a spawned task that forwards every
//! notification over a channel. A connection handshake therefore proceeds at
//! its own pace in the background; [`MqttLink::poll`] only drains whatever
//! notifications have already arrived and never blocks the control loop, not
//! even on a slow broker round trip.
//!
//! # Retry policy
//!
//! Reconnection is retry-forever on a fixed interval, paced inside the pump
//! task. The interval is carried by [`RetryPolicy`] rather than buried in
//! the pump, because "no backoff growth, no retry cap" is a policy decision
//! an installation may want to revisit.

use crate::messages::DeviceCommand;
use crate::publisher::EventPublisher;
use crate::topics::TopicSet;
use badgepoint_core::Ticks;
use badgepoint_core::constants::RETRY_INTERVAL_MS;
use rumqttc::{
    AsyncClient, ConnAck, ConnectReturnCode, ConnectionError, Event, EventLoop, MqttOptions,
    Packet, QoS,
};
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};

/// What the pump task forwards: an event or the error that ended a
/// connection attempt.
type Notification = std::result::Result<Event, ConnectionError>;

/// Bound on notifications queued between pump and control loop. When full
/// the pump waits, which is ordinary backpressure.
const NOTIFICATION_QUEUE_DEPTH: usize = 32;

/// Connection state of the broker link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Network transport is down.
    TransportDown,

    /// Transport is up but the broker handshake is failing.
    BrokerDown,

    /// Connected and subscribed to the commands topic.
    Online,
}

impl LinkState {
    /// Check whether a transition to `target` is meaningful.
    ///
    /// Any state change is allowed except a self-transition: the two down
    /// states can flip between each other as successive retry attempts fail
    /// differently, and loss can land in either of them.
    #[must_use]
    pub fn can_transition_to(&self, target: &LinkState) -> bool {
        self != target
    }

    /// Whether the link is usable for publishing.
    #[must_use]
    pub fn is_online(&self) -> bool {
        matches!(self, LinkState::Online)
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LinkState::TransportDown => "transport down",
            LinkState::BrokerDown => "broker down",
            LinkState::Online => "online",
        };
        write!(f, "{s}")
    }
}

/// Events produced by the link for the controller to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// The link came up and the command subscription was queued.
    Online,

    /// The link was lost; carries the state it degraded to.
    Lost(LinkState),

    /// A recognized command arrived on the commands topic.
    Command(DeviceCommand),
}

/// Reconnection policy: fixed interval, no cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Milliseconds between reconnection attempts.
    pub interval_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval_ms: RETRY_INTERVAL_MS,
        }
    }
}

/// Broker connection settings.
#[derive(Debug, Clone)]
pub struct MqttConfig {
    /// Broker host name or address.
    pub host: String,

    /// Broker port.
    pub port: u16,

    /// MQTT client identifier; conventionally the device id.
    pub client_id: String,

    /// Optional credentials.
    pub username: Option<String>,
    pub password: Option<String>,

    /// Keepalive interval in seconds.
    pub keep_alive_secs: u64,

    /// Optional topic prefix, see [`TopicSet`].
    pub topic_prefix: Option<String>,

    /// Reconnection policy.
    pub retry: RetryPolicy,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "badgepoint".to_string(),
            username: None,
            password: None,
            keep_alive_secs: 5,
            topic_prefix: None,
            retry: RetryPolicy::default(),
        }
    }
}

/// Connectivity manager over a rumqttc client/event-loop pair.
///
/// Owns the connection state. The event loop itself is driven by a spawned
/// pump task (see the module docs); the controller calls
/// [`poll`](MqttLink::poll) once per loop tick to drain the pump's
/// notifications and turn them into state transitions and [`LinkEvent`]s.
/// The current state is mirrored into a watch channel for the publisher.
pub struct MqttLink {
    client: AsyncClient,
    topics: TopicSet,
    state: LinkState,
    state_tx: watch::Sender<LinkState>,
    notifications: mpsc::Receiver<Notification>,
    pump: tokio::task::JoinHandle<()>,
}

impl MqttLink {
    /// Build the link and its paired publisher from one client, and start
    /// the event loop pump.
    pub fn new(config: &MqttConfig) -> (Self, EventPublisher) {
        let mut options = MqttOptions::new(
            config.client_id.clone(),
            config.host.clone(),
            config.port,
        );
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            options.set_credentials(username.clone(), password.clone());
        }

        let (client, event_loop) = AsyncClient::new(options, 10);
        let topics = TopicSet::new(config.topic_prefix.as_deref());
        let (state_tx, state_rx) = watch::channel(LinkState::TransportDown);

        let publisher = EventPublisher::new(client.clone(), topics.clone(), state_rx);

        let (notification_tx, notifications) = mpsc::channel(NOTIFICATION_QUEUE_DEPTH);
        let retry_interval = Duration::from_millis(config.retry.interval_ms);
        let pump = tokio::spawn(pump_event_loop(event_loop, notification_tx, retry_interval));

        let link = Self {
            client,
            topics,
            state: LinkState::TransportDown,
            state_tx,
            notifications,
            pump,
        };

        (link, publisher)
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Watch handle mirroring the connection state.
    #[must_use]
    pub fn state_watch(&self) -> watch::Receiver<LinkState> {
        self.state_tx.subscribe()
    }

    /// The topic set this link subscribes and publishes on.
    #[must_use]
    pub fn topics(&self) -> &TopicSet {
        &self.topics
    }

    /// Drain pending event loop notifications.
    ///
    /// Returns immediately once the queue is empty; connection attempts keep
    /// progressing in the pump task regardless of how often this is called.
    /// Returned events are in arrival order.
    pub async fn poll(&mut self, _now: Ticks) -> Vec<LinkEvent> {
        let mut events = Vec::new();

        loop {
            match self.notifications.try_recv() {
                Ok(notification) => self.handle_notification(notification, &mut events).await,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }

        events
    }

    async fn handle_notification(
        &mut self,
        notification: Notification,
        events: &mut Vec<LinkEvent>,
    ) {
        match notification {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => self.handle_connack(ack, events).await,
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                if publish.topic == self.topics.commands {
                    if let Some(command) = DeviceCommand::parse(&publish.payload) {
                        info!("Received device command: {command:?}");
                        events.push(LinkEvent::Command(command));
                    }
                } else {
                    trace!("Ignoring message on unexpected topic '{}'", publish.topic);
                }
            }
            Ok(Event::Incoming(Packet::SubAck(_))) => {
                debug!("Command subscription acknowledged");
            }
            Ok(_) => {}
            Err(error) => {
                let degraded = classify_disconnect(&error);
                warn!("Broker link error ({degraded}): {error}");
                self.degrade(degraded, events);
            }
        }
    }

    async fn handle_connack(&mut self, ack: ConnAck, events: &mut Vec<LinkEvent>) {
        if ack.code == ConnectReturnCode::Success {
            info!(
                "Connected to broker, subscribing to '{}'",
                self.topics.commands
            );
            if let Err(e) = self
                .client
                .subscribe(self.topics.commands.clone(), QoS::AtMostOnce)
                .await
            {
                warn!("Failed to queue command subscription: {e}");
            }
            self.transition(LinkState::Online, events);
        } else {
            warn!("Broker refused connection: {:?}", ack.code);
            self.degrade(LinkState::BrokerDown, events);
        }
    }

    fn transition(&mut self, to: LinkState, events: &mut Vec<LinkEvent>) {
        if !self.state.can_transition_to(&to) {
            return;
        }
        debug!("Link state: {} -> {}", self.state, to);
        self.state = to;
        self.state_tx.send_replace(to);
        if to == LinkState::Online {
            events.push(LinkEvent::Online);
        }
    }

    fn degrade(&mut self, to: LinkState, events: &mut Vec<LinkEvent>) {
        let was_online = self.state.is_online();
        self.transition(to, events);
        if was_online {
            events.push(LinkEvent::Lost(to));
        }
    }
}

impl Drop for MqttLink {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

impl crate::Link for MqttLink {
    fn state(&self) -> LinkState {
        self.state
    }

    async fn poll(&mut self, now: Ticks) -> Vec<LinkEvent> {
        MqttLink::poll(self, now).await
    }
}

/// Drive the event loop until the link is dropped.
///
/// A connection attempt runs to completion in here, however long its
/// handshake takes. After a failed attempt the pump sleeps out the retry
/// interval before the next call restarts the connection.
async fn pump_event_loop(
    mut event_loop: EventLoop,
    tx: mpsc::Sender<Notification>,
    retry_interval: Duration,
) {
    loop {
        match event_loop.poll().await {
            Ok(event) => {
                if tx.send(Ok(event)).await.is_err() {
                    return;
                }
            }
            Err(error) => {
                if tx.send(Err(error)).await.is_err() {
                    return;
                }
                tokio::time::sleep(retry_interval).await;
            }
        }
    }
}

/// Classify an event-loop error into the link state it leaves us in.
///
/// I/O-level failures (no route, refused socket, timeouts) mean the
/// transport is down; MQTT-level rejections mean the transport worked but
/// the broker is not accepting us.
fn classify_disconnect(error: &ConnectionError) -> LinkState {
    match error {
        ConnectionError::Io(_)
        | ConnectionError::NetworkTimeout
        | ConnectionError::FlushTimeout => LinkState::TransportDown,
        ConnectionError::MqttState(_)
        | ConnectionError::ConnectionRefused(_)
        | ConnectionError::NotConnAck(_) => LinkState::BrokerDown,
        _ => LinkState::TransportDown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_link_state_transitions() {
        assert!(LinkState::TransportDown.can_transition_to(&LinkState::Online));
        assert!(LinkState::TransportDown.can_transition_to(&LinkState::BrokerDown));
        assert!(LinkState::BrokerDown.can_transition_to(&LinkState::Online));
        assert!(LinkState::Online.can_transition_to(&LinkState::TransportDown));
        assert!(LinkState::Online.can_transition_to(&LinkState::BrokerDown));

        assert!(!LinkState::Online.can_transition_to(&LinkState::Online));
        assert!(!LinkState::TransportDown.can_transition_to(&LinkState::TransportDown));
    }

    #[tokio::test]
    async fn test_poll_never_blocks_while_disconnected() {
        let (mut link, _publisher) = MqttLink::new(&MqttConfig {
            host: "203.0.113.1".to_string(), // TEST-NET, never routable
            ..MqttConfig::default()
        });

        // The connection attempt hangs in the pump; draining must still
        // return immediately with nothing.
        let events = link.poll(Ticks::from_millis(1000)).await;
        assert!(events.is_empty());
        assert_eq!(link.state(), LinkState::TransportDown);
    }

    #[test]
    fn test_classify_io_error_as_transport() {
        let error = ConnectionError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "no route",
        ));
        assert_eq!(classify_disconnect(&error), LinkState::TransportDown);
    }

    #[test]
    fn test_classify_timeout_as_transport() {
        assert_eq!(
            classify_disconnect(&ConnectionError::NetworkTimeout),
            LinkState::TransportDown
        );
    }

    #[test]
    fn test_classify_refusal_as_broker() {
        let error = ConnectionError::ConnectionRefused(ConnectReturnCode::ServiceUnavailable);
        assert_eq!(classify_disconnect(&error), LinkState::BrokerDown);
    }

    #[tokio::test]
    async fn test_state_watch_mirrors_initial_state() {
        let (link, _publisher) = MqttLink::new(&MqttConfig::default());
        assert_eq!(*link.state_watch().borrow(), LinkState::TransportDown);
    }

    /// Minimal broker double: accepts TCP clients, reads the CONNECT,
    /// answers with an accepting CONNACK after `connack_delay`, then keeps
    /// the socket open and swallows whatever else arrives.
    async fn fake_broker(connack_delay: Duration) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    if socket.read(&mut buf).await.is_err() {
                        return;
                    }
                    tokio::time::sleep(connack_delay).await;
                    // CONNACK: session not present, connection accepted.
                    if socket.write_all(&[0x20, 0x02, 0x00, 0x00]).await.is_err() {
                        return;
                    }
                    loop {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(_) => {}
                        }
                    }
                });
            }
        });

        port
    }

    async fn poll_until_online(link: &mut MqttLink) -> bool {
        for i in 0..50u64 {
            let events = link.poll(Ticks::from_millis(i * 100)).await;
            if events.contains(&LinkEvent::Online) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_connects_through_immediate_handshake() {
        let port = fake_broker(Duration::ZERO).await;
        let (mut link, _publisher) = MqttLink::new(&MqttConfig {
            host: "127.0.0.1".to_string(),
            port,
            ..MqttConfig::default()
        });

        assert!(poll_until_online(&mut link).await);
        assert_eq!(link.state(), LinkState::Online);
        assert_eq!(*link.state_watch().borrow(), LinkState::Online);
    }

    #[tokio::test]
    async fn test_slow_handshake_still_connects() {
        // A broker whose CONNACK takes longer than any single control-loop
        // tick; the handshake must survive across poll calls.
        let port = fake_broker(Duration::from_millis(400)).await;
        let (mut link, _publisher) = MqttLink::new(&MqttConfig {
            host: "127.0.0.1".to_string(),
            port,
            ..MqttConfig::default()
        });

        assert!(poll_until_online(&mut link).await);
        assert_eq!(link.state(), LinkState::Online);
    }
}
