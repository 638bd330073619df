//! Rate limiting ports and application service.
//!
//! Fixed-window limiter with two tiers (guest and authenticated) plus a
//! cooldown between consecutive requests from the same identifier. The
//! cooldown and the daily counter are independent: a cooldown denial leaves
//! the counter untouched.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use itinero_core::AppResult;


// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Store port for per-identifier rate limit state.
///
/// One entry per identifier; the caller classification (guest vs.
/// authenticated) is a parameter of the check, not part of the key.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Returns the entry for an identifier, if any.
    async fn get(&self, identifier: &str) -> AppResult<Option<RateLimitEntry>>;

    /// Inserts or replaces the entry for an identifier.
    async fn set(&self, identifier: &str, entry: RateLimitEntry) -> AppResult<()>;

    /// Removes the entry for an identifier.
    async fn delete(&self, identifier: &str) -> AppResult<()>;

    /// Removes entries whose window ended before `now`; returns the removed
    /// count. Backends with server-side expiry may report 0.
    async fn sweep(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// Per-identifier mutable rate limit state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitEntry {
    /// Requests allowed within the current window.
    pub count: u32,
    /// When the current window ends.
    pub reset_at: DateTime<Utc>,
    /// When the identifier last made an allowed request.
    pub last_request: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Limits for one caller class.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitTier {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Fixed window length.
    pub window: Duration,
}

/// Limiter configuration covering both caller classes.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Tier applied to unauthenticated callers (keyed by network address).
    pub guest: RateLimitTier,
    /// Tier applied to authenticated callers (keyed by user id).
    pub authenticated: RateLimitTier,
    /// Minimum spacing between any two requests from one identifier.
    pub cooldown: Duration,
}

impl Default for RateLimitConfig {
    /// Guests get 3 generations per day, authenticated users 10; both wait
    /// 30 seconds between requests.
    fn default() -> Self {
        Self {
            guest: RateLimitTier {
                max_requests: 3,
                window: Duration::hours(24),
            },
            authenticated: RateLimitTier {
                max_requests: 10,
                window: Duration::hours(24),
            },
            cooldown: Duration::seconds(30),
        }
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Requests left in the current window after this decision.
    pub remaining: u32,
    /// When the current window ends.
    pub reset_at: DateTime<Utc>,
    /// Seconds to wait before retrying; set on denials.
    pub retry_after: Option<i64>,
}

/// Application service enforcing the dual-window policy.
#[derive(Clone)]
pub struct RateLimitService {
    store: Arc<dyn RateLimitStore>,
    config: RateLimitConfig,
}

impl RateLimitService {
    /// Creates a rate limit service over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn RateLimitStore>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    /// Checks whether `identifier` may make a request right now.
    ///
    /// An allowed decision consumes one window slot immediately, before the
    /// guarded work runs; a downstream failure does not refund it.
    pub async fn check(
        &self,
        identifier: &str,
        is_authenticated: bool,
    ) -> AppResult<RateLimitDecision> {
        self.check_at(identifier, is_authenticated, Utc::now()).await
    }

    /// Clock-explicit variant of [`RateLimitService::check`].
    pub async fn check_at(
        &self,
        identifier: &str,
        is_authenticated: bool,
        now: DateTime<Utc>,
    ) -> AppResult<RateLimitDecision> {
        let tier = if is_authenticated {
            self.config.authenticated
        } else {
            self.config.guest
        };

        let mut entry = match self.store.get(identifier).await? {
            Some(entry) if now <= entry.reset_at => entry,
            // Absent or past its window: fixed-window reset.
            _ => {
                let entry = RateLimitEntry {
                    count: 0,
                    reset_at: now + tier.window,
                    last_request: None,
                };
                self.store.set(identifier, entry.clone()).await?;
                entry
            }
        };

        if let Some(last_request) = entry.last_request {
            let since_last = now - last_request;
            if since_last < self.config.cooldown {
                return Ok(RateLimitDecision {
                    allowed: false,
                    remaining: tier.max_requests.saturating_sub(entry.count),
                    reset_at: entry.reset_at,
                    retry_after: Some(ceil_seconds(self.config.cooldown - since_last)),
                });
            }
        }

        if entry.count >= tier.max_requests {
            return Ok(RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_at: entry.reset_at,
                retry_after: Some(ceil_seconds(entry.reset_at - now)),
            });
        }

        entry.count += 1;
        entry.last_request = Some(now);
        let decision = RateLimitDecision {
            allowed: true,
            remaining: tier.max_requests - entry.count,
            reset_at: entry.reset_at,
            retry_after: None,
        };
        self.store.set(identifier, entry).await?;

        Ok(decision)
    }

    /// Removes expired entries. Intended for the periodic sweep task; lazy
    /// resets on the check path keep results correct regardless of cadence.
    pub async fn sweep(&self) -> AppResult<u64> {
        self.store.sweep(Utc::now()).await
    }
}

fn ceil_seconds(duration: Duration) -> i64 {
    (duration.num_milliseconds().max(0) as u64).div_ceil(1000) as i64
}
