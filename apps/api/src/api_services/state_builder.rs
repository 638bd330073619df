use std::sync::Arc;

use itinero_application::{
    GenerationService, IdempotencyService, IdempotencyStore, RateLimitConfig, RateLimitService,
    RateLimitStore,
};
use itinero_core::AppError;
use itinero_infrastructure::{
    AnthropicConfig, AnthropicGenerationClient, InMemoryIdempotencyStore, InMemoryRateLimitStore,
    RedisIdempotencyStore, RedisRateLimitStore,
};

use crate::api_config::{ApiConfig, ProtectionStoreBackend};
use crate::state::AppState;

use super::redis::build_redis_client;

pub fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let redis_client = config
        .redis_url
        .as_deref()
        .map(build_redis_client)
        .transpose()?;

    let rate_limit_store: Arc<dyn RateLimitStore> = match config.rate_limit_store {
        ProtectionStoreBackend::InMemory => Arc::new(InMemoryRateLimitStore::new()),
        ProtectionStoreBackend::Redis => {
            let redis_client = redis_client.clone().ok_or_else(|| {
                AppError::Validation("REDIS_URL is required when RATE_LIMIT_STORE=redis".to_owned())
            })?;
            Arc::new(RedisRateLimitStore::new(redis_client, "itinero:rate_limit"))
        }
    };

    let idempotency_store: Arc<dyn IdempotencyStore> = match config.idempotency_store {
        ProtectionStoreBackend::InMemory => Arc::new(InMemoryIdempotencyStore::new()),
        ProtectionStoreBackend::Redis => {
            let redis_client = redis_client.clone().ok_or_else(|| {
                AppError::Validation("REDIS_URL is required when IDEMPOTENCY_STORE=redis".to_owned())
            })?;
            Arc::new(RedisIdempotencyStore::new(
                redis_client,
                "itinero:idempotency",
            ))
        }
    };

    let generation_service = config
        .generation
        .api_key
        .as_deref()
        .map(|api_key| {
            let client_config = AnthropicConfig::new(
                api_key,
                config.generation.model.as_str(),
                config.generation.max_tokens,
            )
            .with_base_url(config.generation.base_url.as_str());

            AnthropicGenerationClient::new(client_config)
                .map(|client| GenerationService::new(Arc::new(client)))
        })
        .transpose()?;

    Ok(AppState {
        rate_limit_service: RateLimitService::new(rate_limit_store, RateLimitConfig::default()),
        idempotency_service: IdempotencyService::new(idempotency_store),
        generation_service,
        generation_model: config.generation.model.clone(),
        generation_max_tokens: config.generation.max_tokens,
        frontend_url: config.frontend_url.clone(),
        redis_client,
        redis_required: config.requires_redis(),
    })
}
