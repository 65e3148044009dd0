//! Topic naming.

/// The three topics the endpoint uses.
///
/// With no prefix configured the topics are the bare `attendance`,
/// `heartbeat` and `commands` names. A prefix scopes them for shared
/// brokers, e.g. prefix `site-a` yields `site-a/attendance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSet {
    /// Outbound attendance events.
    pub attendance: String,

    /// Outbound liveness reports.
    pub heartbeat: String,

    /// Inbound device commands.
    pub commands: String,
}

impl TopicSet {
    /// Build the topic set, optionally scoped under a prefix.
    #[must_use]
    pub fn new(prefix: Option<&str>) -> Self {
        let scoped = |name: &str| match prefix {
            Some(p) if !p.is_empty() => format!("{p}/{name}"),
            _ => name.to_string(),
        };

        Self {
            attendance: scoped("attendance"),
            heartbeat: scoped("heartbeat"),
            commands: scoped("commands"),
        }
    }
}

impl Default for TopicSet {
    fn default() -> Self {
        Self::new(None)
    }
}
