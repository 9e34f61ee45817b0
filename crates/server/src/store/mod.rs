//! Key-value store access
//!
//! Handlers only see the [`KvStore`] trait. The Redis implementation is used
//! in production; the in-memory one backs tests and local development.

pub mod memory;
pub mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use crate::error::Result;
use async_trait::async_trait;

/// The store operations the handlers need: string reads, set membership and
/// a score-ordered collection.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn sismember(&self, key: &str, member: &str) -> Result<bool>;

    async fn smembers(&self, key: &str) -> Result<Vec<String>>;

    async fn sadd(&self, key: &str, member: &str) -> Result<()>;

    async fn srem(&self, key: &str, member: &str) -> Result<()>;

    /// Add `member` to the sorted set at `key` with the given score.
    async fn zadd(&self, key: &str, score: i64, member: &str) -> Result<()>;

    /// Members of the sorted set at `key` between ranks `start` and `stop`
    /// inclusive, lowest score first. Negative ranks count from the end.
    ///
    /// Read side of the message log: handlers only append, history is read
    /// back through this.
    async fn zrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>>;
}
