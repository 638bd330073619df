//! Request fingerprinting and the idempotency cache service.
//!
//! Identical generation requests within the TTL window are served from the
//! cache instead of being recomputed and re-billed.

use std::fmt::Write;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use itinero_core::{AppError, AppResult};
use itinero_domain::TripRequest;

#[cfg(test)]
mod tests;

/// How long a cached generation result stays valid, in hours.
pub const IDEMPOTENCY_TTL_HOURS: i64 = 24;

/// Computes the deterministic cache key for a validated request.
///
/// SHA-256 over the canonical serialization, hex encoded. Canonical field
/// order comes from the `TripRequest` struct itself, so structurally identical
/// requests hash identically regardless of the key order of their source
/// JSON. A collision would serve a stale itinerary for a different trip, so
/// the digest is cryptographic rather than a rolling hash.
pub fn fingerprint(request: &TripRequest) -> AppResult<String> {
    let canonical = serde_json::to_string(request).map_err(|error| {
        AppError::Internal(format!("failed to serialize trip request: {error}"))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();

    Ok(digest
        .iter()
        .fold(String::with_capacity(64), |mut acc, byte| {
            let _ = write!(acc, "{byte:02x}");
            acc
        }))
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// A cached generation result with its validity window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdempotencyEntry {
    /// The validated itinerary as returned to the original caller.
    pub result: Value,
    /// When the entry was stored.
    pub created_at: DateTime<Utc>,
    /// When the entry stops being served.
    pub expires_at: DateTime<Utc>,
}

/// Store port for fingerprint-keyed cached results.
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    /// Returns the entry for a key, if any.
    async fn get(&self, key: &str) -> AppResult<Option<IdempotencyEntry>>;

    /// Inserts or replaces the entry for a key.
    async fn set(&self, key: &str, entry: IdempotencyEntry) -> AppResult<()>;

    /// Removes the entry for a key.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Removes entries expired before `now`; returns the removed count.
    /// Backends with server-side expiry may report 0.
    async fn sweep(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Application service for the idempotency cache.
#[derive(Clone)]
pub struct IdempotencyService {
    store: Arc<dyn IdempotencyStore>,
}

impl IdempotencyService {
    /// Creates an idempotency service over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn IdempotencyStore>) -> Self {
        Self { store }
    }

    /// Returns the cached result for a key when present and not expired.
    ///
    /// An expired entry reads as absent and is evicted lazily, so results
    /// never depend on the periodic sweep.
    pub async fn check(&self, key: &str) -> AppResult<Option<Value>> {
        self.check_at(key, Utc::now()).await
    }

    /// Clock-explicit variant of [`IdempotencyService::check`].
    pub async fn check_at(&self, key: &str, now: DateTime<Utc>) -> AppResult<Option<Value>> {
        let Some(entry) = self.store.get(key).await? else {
            return Ok(None);
        };

        if now > entry.expires_at {
            self.store.delete(key).await?;
            return Ok(None);
        }

        Ok(Some(entry.result))
    }

    /// Caches a result for a key, overwriting any existing entry.
    pub async fn store(&self, key: &str, result: Value) -> AppResult<()> {
        self.store_at(key, result, Utc::now()).await
    }

    /// Clock-explicit variant of [`IdempotencyService::store`].
    pub async fn store_at(&self, key: &str, result: Value, now: DateTime<Utc>) -> AppResult<()> {
        let entry = IdempotencyEntry {
            result,
            created_at: now,
            expires_at: now + Duration::hours(IDEMPOTENCY_TTL_HOURS),
        };
        self.store.set(key, entry).await
    }

    /// Removes expired entries. Intended for the periodic sweep task.
    pub async fn sweep(&self) -> AppResult<u64> {
        self.store.sweep(Utc::now()).await
    }
}
