use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use itinero_application::{RateLimitEntry, RateLimitStore};
use itinero_core::AppResult;

/// In-memory adapter for the rate limit store port.
///
/// Suitable for tests and single-instance deployments. Concurrent
/// read-modify-write cycles are last-writer-wins, which the limiter accepts.
#[derive(Default)]
pub struct InMemoryRateLimitStore {
    entries: RwLock<HashMap<String, RateLimitEntry>>,
}

impl InMemoryRateLimitStore {
    /// Creates an empty in-memory rate limit store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn get(&self, identifier: &str) -> AppResult<Option<RateLimitEntry>> {
        Ok(self.entries.read().await.get(identifier).cloned())
    }

    async fn set(&self, identifier: &str, entry: RateLimitEntry) -> AppResult<()> {
        self.entries
            .write()
            .await
            .insert(identifier.to_owned(), entry);
        Ok(())
    }

    async fn delete(&self, identifier: &str) -> AppResult<()> {
        self.entries.write().await.remove(identifier);
        Ok(())
    }

    async fn sweep(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| now <= entry.reset_at);
        Ok((before - entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use itinero_application::{RateLimitEntry, RateLimitStore};

    use super::InMemoryRateLimitStore;

    fn entry(reset_at_offset: Duration) -> RateLimitEntry {
        RateLimitEntry {
            count: 1,
            reset_at: Utc::now() + reset_at_offset,
            last_request: Some(Utc::now()),
        }
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = InMemoryRateLimitStore::new();
        let stored = entry(Duration::hours(24));

        store
            .set("10.0.0.1", stored.clone())
            .await
            .unwrap_or_else(|_| panic!("test"));

        let loaded = store
            .get("10.0.0.1")
            .await
            .unwrap_or_else(|_| panic!("test"));
        assert_eq!(loaded, Some(stored));
    }

    #[tokio::test]
    async fn delete_removes_the_entry() {
        let store = InMemoryRateLimitStore::new();
        store
            .set("10.0.0.2", entry(Duration::hours(24)))
            .await
            .unwrap_or_else(|_| panic!("test"));

        store
            .delete("10.0.0.2")
            .await
            .unwrap_or_else(|_| panic!("test"));

        let loaded = store
            .get("10.0.0.2")
            .await
            .unwrap_or_else(|_| panic!("test"));
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn sweep_drops_entries_past_their_window() {
        let store = InMemoryRateLimitStore::new();
        store
            .set("expired", entry(Duration::hours(-1)))
            .await
            .unwrap_or_else(|_| panic!("test"));
        store
            .set("active", entry(Duration::hours(1)))
            .await
            .unwrap_or_else(|_| panic!("test"));

        let removed = store
            .sweep(Utc::now())
            .await
            .unwrap_or_else(|_| panic!("test"));

        assert_eq!(removed, 1);
        let active = store.get("active").await.unwrap_or_else(|_| panic!("test"));
        assert!(active.is_some());
    }
}
