//! Application services and ports.

#![forbid(unsafe_code)]

mod generation_service;
mod idempotency_service;
mod rate_limit_service;

pub use generation_service::{
    GenerationCallError, GenerationClient, GenerationPrompt, GenerationService,
};
pub use idempotency_service::{
    IDEMPOTENCY_TTL_HOURS, IdempotencyEntry, IdempotencyService, IdempotencyStore, fingerprint,
};
pub use rate_limit_service::{
    RateLimitConfig, RateLimitDecision, RateLimitEntry, RateLimitService, RateLimitStore,
    RateLimitTier,
};
