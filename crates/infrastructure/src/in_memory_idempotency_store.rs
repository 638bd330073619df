use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use itinero_application::{IdempotencyEntry, IdempotencyStore};
use itinero_core::AppResult;

/// In-memory adapter for the idempotency store port.
///
/// Suitable for tests and single-instance deployments. Two concurrent misses
/// for the same key may both generate; the last `set` wins.
#[derive(Default)]
pub struct InMemoryIdempotencyStore {
    entries: RwLock<HashMap<String, IdempotencyEntry>>,
}

impl InMemoryIdempotencyStore {
    /// Creates an empty in-memory idempotency store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdempotencyStore for InMemoryIdempotencyStore {
    async fn get(&self, key: &str) -> AppResult<Option<IdempotencyEntry>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, entry: IdempotencyEntry) -> AppResult<()> {
        self.entries.write().await.insert(key.to_owned(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn sweep(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| now <= entry.expires_at);
        Ok((before - entries.len()) as u64)
    }
}
