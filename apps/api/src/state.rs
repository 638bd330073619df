use itinero_application::{GenerationService, IdempotencyService, RateLimitService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub rate_limit_service: RateLimitService,
    pub idempotency_service: IdempotencyService,
    /// Absent when no API key is configured; the endpoint answers 503.
    pub generation_service: Option<GenerationService>,
    pub generation_model: String,
    pub generation_max_tokens: u32,
    pub frontend_url: String,
    pub redis_client: Option<redis::Client>,
    pub redis_required: bool,
}
