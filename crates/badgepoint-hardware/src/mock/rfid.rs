//! Mock RFID reader.

use crate::{HardwareError, Result, traits::RfidReader};
use badgepoint_core::RfidTag;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

/// Mock card reader driven through a channel.
///
/// Presented cards queue up in order and are returned one per
/// [`poll_card`](RfidReader::poll_card) call, which matches the discrete
/// read-event model of the real reader poll.
///
/// # Examples
///
/// ```
/// use badgepoint_hardware::mock::MockRfid;
/// use badgepoint_hardware::traits::RfidReader;
///
/// #[tokio::main]
/// async fn main() -> badgepoint_hardware::Result<()> {
///     let (mut reader, handle) = MockRfid::new();
///
///     assert_eq!(reader.poll_card().await?, None);
///
///     let tag = "04:52:F3:2A".parse().unwrap();
///     handle.present_card(tag).await?;
///
///     assert!(reader.poll_card().await?.is_some());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockRfid {
    event_rx: mpsc::Receiver<RfidTag>,
    name: String,
}

impl MockRfid {
    /// Create a mock reader with the default name.
    pub fn new() -> (Self, MockRfidHandle) {
        Self::with_name("Mock RFID Reader".to_string())
    }

    /// Create a mock reader with a custom name.
    pub fn with_name(name: String) -> (Self, MockRfidHandle) {
        let (event_tx, event_rx) = mpsc::channel(32);

        let reader = Self {
            event_rx,
            name: name.clone(),
        };

        let handle = MockRfidHandle { event_tx, name };

        (reader, handle)
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl RfidReader for MockRfid {
    async fn poll_card(&mut self) -> Result<Option<RfidTag>> {
        match self.event_rx.try_recv() {
            Ok(tag) => Ok(Some(tag)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                Err(HardwareError::disconnected("RFID event channel closed"))
            }
        }
    }
}

/// Handle for presenting cards to a [`MockRfid`].
#[derive(Debug, Clone)]
pub struct MockRfidHandle {
    event_tx: mpsc::Sender<RfidTag>,
    name: String,
}

impl MockRfidHandle {
    /// Present a card to the reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped and the channel is
    /// closed.
    pub async fn present_card(&self, tag: RfidTag) -> Result<()> {
        self.event_tx
            .send(tag)
            .await
            .map_err(|_| HardwareError::disconnected("RFID event channel closed"))
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(s: &str) -> RfidTag {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_poll_empty_field() {
        let (mut reader, _handle) = MockRfid::new();
        assert_eq!(reader.poll_card().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_present_and_poll() {
        let (mut reader, handle) = MockRfid::new();

        handle.present_card(tag("04:52:F3:2A")).await.unwrap();

        let read = reader.poll_card().await.unwrap();
        assert_eq!(read, Some(tag("04:52:F3:2A")));
        assert_eq!(reader.poll_card().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cards_queue_in_order() {
        let (mut reader, handle) = MockRfid::new();

        handle.present_card(tag("04:52:F3:2A")).await.unwrap();
        handle.present_card(tag("04:A1:B2:3C")).await.unwrap();

        assert_eq!(reader.poll_card().await.unwrap(), Some(tag("04:52:F3:2A")));
        assert_eq!(reader.poll_card().await.unwrap(), Some(tag("04:A1:B2:3C")));
    }

    #[tokio::test]
    async fn test_poll_after_handle_dropped() {
        let (mut reader, handle) = MockRfid::new();
        drop(handle);

        let result = reader.poll_card().await;
        assert!(matches!(result, Err(HardwareError::Disconnected { .. })));
    }
}
