//! Redis-backed rate limit store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;

use itinero_application::{RateLimitEntry, RateLimitStore};
use itinero_core::{AppError, AppResult};

/// Redis implementation of the rate limit store port.
///
/// Entries are JSON-encoded and expire server-side when their window ends,
/// which makes the store safe to share across API instances.
#[derive(Clone)]
pub struct RedisRateLimitStore {
    client: redis::Client,
    key_prefix: String,
}

impl RedisRateLimitStore {
    /// Creates a store adapter with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, identifier: &str) -> String {
        format!("{}:{identifier}", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn get(&self, identifier: &str) -> AppResult<Option<RateLimitEntry>> {
        let mut connection = self.connection().await?;

        let encoded: Option<String> =
            connection
                .get(self.key_for(identifier))
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to read rate limit entry: {error}"))
                })?;

        encoded
            .as_deref()
            .map(|value| {
                serde_json::from_str(value).map_err(|error| {
                    AppError::Internal(format!("invalid rate limit entry '{value}': {error}"))
                })
            })
            .transpose()
    }

    async fn set(&self, identifier: &str, entry: RateLimitEntry) -> AppResult<()> {
        let encoded = serde_json::to_string(&entry).map_err(|error| {
            AppError::Internal(format!("failed to encode rate limit entry: {error}"))
        })?;

        // Keep the key alive exactly until its window ends.
        let ttl_seconds = (entry.reset_at - Utc::now()).num_seconds().max(1) as u64;

        let mut connection = self.connection().await?;
        connection
            .set_ex(self.key_for(identifier), encoded, ttl_seconds)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to write rate limit entry: {error}"))
            })
    }

    async fn delete(&self, identifier: &str) -> AppResult<()> {
        let mut connection = self.connection().await?;
        connection
            .del(self.key_for(identifier))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete rate limit entry: {error}"))
            })
    }

    async fn sweep(&self, _now: DateTime<Utc>) -> AppResult<u64> {
        // Keys expire automatically via TTL.
        Ok(0)
    }
}
