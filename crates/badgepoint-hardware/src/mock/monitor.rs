//! Mock system monitor.

use crate::{Result, traits::SystemMonitor};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default free-memory figure reported by a fresh mock, in bytes.
const DEFAULT_FREE_MEMORY: u64 = 180_000;

/// Mock system counters with a settable free-memory figure.
#[derive(Debug)]
pub struct MockSystemMonitor {
    free_memory: Arc<AtomicU64>,
}

impl MockSystemMonitor {
    /// Create a mock monitor with the default free-memory figure.
    pub fn new() -> (Self, MockSystemMonitorHandle) {
        let free_memory = Arc::new(AtomicU64::new(DEFAULT_FREE_MEMORY));

        let monitor = Self {
            free_memory: Arc::clone(&free_memory),
        };

        (monitor, MockSystemMonitorHandle { free_memory })
    }
}

impl SystemMonitor for MockSystemMonitor {
    async fn free_memory(&mut self) -> Result<u64> {
        Ok(self.free_memory.load(Ordering::SeqCst))
    }
}

/// Handle for adjusting a [`MockSystemMonitor`].
#[derive(Debug, Clone)]
pub struct MockSystemMonitorHandle {
    free_memory: Arc<AtomicU64>,
}

impl MockSystemMonitorHandle {
    /// Set the reported free-memory figure in bytes.
    pub fn set_free_memory(&self, bytes: u64) {
        self.free_memory.store(bytes, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_figure() {
        let (mut monitor, _handle) = MockSystemMonitor::new();
        assert_eq!(monitor.free_memory().await.unwrap(), DEFAULT_FREE_MEMORY);
    }

    #[tokio::test]
    async fn test_handle_adjusts_figure() {
        let (mut monitor, handle) = MockSystemMonitor::new();
        handle.set_free_memory(42_000);
        assert_eq!(monitor.free_memory().await.unwrap(), 42_000);
    }
}
