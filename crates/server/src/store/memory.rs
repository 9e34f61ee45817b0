use std::collections::{BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::KvStore;
use crate::error::Result;

/// In-process [`KvStore`] with Redis semantics for the operations it supports.
#[derive(Default)]
pub struct MemoryStore {
    strings: RwLock<HashMap<String, String>>,
    sets: RwLock<HashMap<String, HashSet<String>>>,
    // Ordered by (score, member), like a Redis sorted set.
    sorted: RwLock<HashMap<String, BTreeSet<(i64, String)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a string value. Not part of [`KvStore`]; used to seed data.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.strings.write().insert(key.into(), value.into());
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.strings.read().get(key).cloned())
    }

    async fn sismember(&self, key: &str, member: &str) -> Result<bool> {
        Ok(self
            .sets
            .read()
            .get(key)
            .is_some_and(|set| set.contains(member)))
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        Ok(self
            .sets
            .read()
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<()> {
        self.sets
            .write()
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn srem(&self, key: &str, member: &str) -> Result<()> {
        let mut sets = self.sets.write();
        if let Some(set) = sets.get_mut(key) {
            set.remove(member);
            if set.is_empty() {
                sets.remove(key);
            }
        }
        Ok(())
    }

    async fn zadd(&self, key: &str, score: i64, member: &str) -> Result<()> {
        let mut sorted = self.sorted.write();
        let entries = sorted.entry(key.to_string()).or_default();
        // Re-adding a member updates its score.
        entries.retain(|(_, existing)| existing != member);
        entries.insert((score, member.to_string()));
        Ok(())
    }

    async fn zrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        let sorted = self.sorted.read();
        let Some(entries) = sorted.get(key) else {
            return Ok(Vec::new());
        };

        let len = entries.len() as isize;
        let start = if start < 0 { (len + start).max(0) } else { start };
        let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
        if start > stop || start >= len {
            return Ok(Vec::new());
        }

        Ok(entries
            .iter()
            .skip(start as usize)
            .take((stop - start + 1) as usize)
            .map(|(_, member)| member.clone())
            .collect())
    }
}
