//! Real-time event fan-out
//!
//! Handlers publish named events on namespaced channels through the
//! [`Publisher`] trait. Delivery to subscribers is the transport's job.

pub mod memory;
pub mod pusher;
pub mod redis_pubsub;

pub use memory::{MemoryPublisher, PublishedEvent};
pub use pusher::{PusherConfig, PusherPublisher};
pub use redis_pubsub::RedisPublisher;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `event` with `payload` to everyone subscribed to `channel`.
    async fn trigger(&self, channel: &str, event: &str, payload: &Value) -> Result<()>;
}

/// Serialize `payload` and publish it.
pub async fn trigger<T: Serialize + ?Sized>(
    publisher: &dyn Publisher,
    channel: &str,
    event: &str,
    payload: &T,
) -> Result<()> {
    let payload = serde_json::to_value(payload)?;
    publisher.trigger(channel, event, &payload).await
}

/// Event names clients bind to.
pub mod events {
    pub const NEW_FRIEND: &str = "new_friend";
    pub const INCOMING_MESSAGE: &str = "incoming-message";
    pub const NEW_MESSAGE: &str = "new_message";
}
