//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod anthropic_generation_client;
mod in_memory_idempotency_store;
mod in_memory_rate_limit_store;
mod redis_idempotency_store;
mod redis_rate_limit_store;

pub use anthropic_generation_client::{AnthropicConfig, AnthropicGenerationClient};
pub use in_memory_idempotency_store::InMemoryIdempotencyStore;
pub use in_memory_rate_limit_store::InMemoryRateLimitStore;
pub use redis_idempotency_store::RedisIdempotencyStore;
pub use redis_rate_limit_store::RedisRateLimitStore;
