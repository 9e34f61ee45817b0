use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use super::Publisher;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct PublishedEvent {
    pub channel: String,
    pub event: String,
    pub payload: Value,
}

/// Events kept for late readers, and the broadcast channel's capacity.
pub const DEFAULT_CAPACITY: usize = 256;

/// In-process publisher. Forwards each event to live broadcast subscribers
/// and keeps the most recent `capacity` events; older ones are dropped.
pub struct MemoryPublisher {
    tx: broadcast::Sender<PublishedEvent>,
    log: Mutex<VecDeque<PublishedEvent>>,
    capacity: usize,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            log: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.tx.subscribe()
    }

    /// Retained events, oldest first.
    pub fn events(&self) -> Vec<PublishedEvent> {
        self.log.lock().iter().cloned().collect()
    }

    pub fn events_on(&self, channel: &str) -> Vec<PublishedEvent> {
        self.log
            .lock()
            .iter()
            .filter(|e| e.channel == channel)
            .cloned()
            .collect()
    }
}

impl Default for MemoryPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Publisher for MemoryPublisher {
    async fn trigger(&self, channel: &str, event: &str, payload: &Value) -> Result<()> {
        let published = PublishedEvent {
            channel: channel.to_string(),
            event: event.to_string(),
            payload: payload.clone(),
        };
        debug!("[Realtime] {} -> {}", event, channel);
        {
            let mut log = self.log.lock();
            if log.len() == self.capacity {
                log.pop_front();
            }
            log.push_back(published.clone());
        }
        // No receivers is fine.
        let _ = self.tx.send(published);
        Ok(())
    }
}
