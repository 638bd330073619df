//! Redis-backed idempotency store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;

use itinero_application::{IdempotencyEntry, IdempotencyStore};
use itinero_core::{AppError, AppResult};

/// Redis implementation of the idempotency store port.
///
/// Entries are JSON-encoded and expire server-side at their TTL, so repeated
/// identical requests hit the same cache from every API instance.
#[derive(Clone)]
pub struct RedisIdempotencyStore {
    client: redis::Client,
    key_prefix: String,
}

impl RedisIdempotencyStore {
    /// Creates a store adapter with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, key: &str) -> String {
        format!("{}:{key}", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }
}

#[async_trait]
impl IdempotencyStore for RedisIdempotencyStore {
    async fn get(&self, key: &str) -> AppResult<Option<IdempotencyEntry>> {
        let mut connection = self.connection().await?;

        let encoded: Option<String> = connection.get(self.key_for(key)).await.map_err(|error| {
            AppError::Internal(format!("failed to read idempotency entry: {error}"))
        })?;

        encoded
            .as_deref()
            .map(|value| {
                serde_json::from_str(value).map_err(|error| {
                    AppError::Internal(format!("invalid idempotency entry: {error}"))
                })
            })
            .transpose()
    }

    async fn set(&self, key: &str, entry: IdempotencyEntry) -> AppResult<()> {
        let encoded = serde_json::to_string(&entry).map_err(|error| {
            AppError::Internal(format!("failed to encode idempotency entry: {error}"))
        })?;

        // Keep the key alive exactly until the cached result expires.
        let ttl_seconds = (entry.expires_at - Utc::now()).num_seconds().max(1) as u64;

        let mut connection = self.connection().await?;
        connection
            .set_ex(self.key_for(key), encoded, ttl_seconds)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to write idempotency entry: {error}"))
            })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut connection = self.connection().await?;
        connection.del(self.key_for(key)).await.map_err(|error| {
            AppError::Internal(format!("failed to delete idempotency entry: {error}"))
        })
    }

    async fn sweep(&self, _now: DateTime<Utc>) -> AppResult<u64> {
        // Keys expire automatically via TTL.
        Ok(0)
    }
}
