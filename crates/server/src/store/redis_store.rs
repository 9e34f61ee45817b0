use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info};

use super::KvStore;
use crate::error::Result;

/// [`KvStore`] backed by Redis through a shared connection manager.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(redis_url)?;
        Self::from_client(client).await
    }

    pub async fn from_client(client: redis::Client) -> anyhow::Result<Self> {
        let connection = client.get_connection_manager().await?;
        info!("[Store] Connected to Redis");
        Ok(Self { connection })
    }

    // ConnectionManager multiplexes; clones share the underlying connection.
    fn conn(&self) -> ConnectionManager {
        self.connection.clone()
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        debug!("[Store] GET {}", key);
        Ok(self.conn().get(key).await?)
    }

    async fn sismember(&self, key: &str, member: &str) -> Result<bool> {
        debug!("[Store] SISMEMBER {} {}", key, member);
        Ok(self.conn().sismember(key, member).await?)
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        debug!("[Store] SMEMBERS {}", key);
        Ok(self.conn().smembers(key).await?)
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<()> {
        debug!("[Store] SADD {} {}", key, member);
        let _: i64 = self.conn().sadd(key, member).await?;
        Ok(())
    }

    async fn srem(&self, key: &str, member: &str) -> Result<()> {
        debug!("[Store] SREM {} {}", key, member);
        let _: i64 = self.conn().srem(key, member).await?;
        Ok(())
    }

    async fn zadd(&self, key: &str, score: i64, member: &str) -> Result<()> {
        debug!("[Store] ZADD {} {}", key, score);
        let _: i64 = self.conn().zadd(key, member, score).await?;
        Ok(())
    }

    async fn zrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        debug!("[Store] ZRANGE {} {} {}", key, start, stop);
        Ok(self.conn().zrange(key, start, stop).await?)
    }
}
