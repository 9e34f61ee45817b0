use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::{json, Value};
use tracing::debug;

use super::Publisher;
use crate::error::{Error, Result};

/// Publishes events with Redis `PUBLISH` on the raw channel name.
///
/// The message is a JSON envelope `{"event": ..., "data": ...}` so one Redis
/// channel can carry several event types.
#[derive(Clone)]
pub struct RedisPublisher {
    connection: ConnectionManager,
}

impl RedisPublisher {
    pub async fn connect(redis_url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let connection = client.get_connection_manager().await?;
        Ok(Self { connection })
    }

    pub fn envelope(event: &str, payload: &Value) -> Value {
        json!({
            "event": event,
            "data": payload,
        })
    }
}

#[async_trait]
impl Publisher for RedisPublisher {
    async fn trigger(&self, channel: &str, event: &str, payload: &Value) -> Result<()> {
        let message = Self::envelope(event, payload).to_string();
        let receivers: i64 = self
            .connection
            .clone()
            .publish(channel, message)
            .await
            .map_err(|e| Error::Publish(format!("failed to publish {}: {}", event, e)))?;
        debug!("[Realtime] {} -> {} ({} receivers)", event, channel, receivers);
        Ok(())
    }
}
