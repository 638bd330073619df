use std::env;

use itinero_core::AppError;
use url::Url;

/// Backend selection for one protection store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectionStoreBackend {
    /// Process-local store; resets on restart.
    InMemory,
    /// Shared Redis store for multi-instance deployments.
    Redis,
}

impl ProtectionStoreBackend {
    fn from_env(name: &str) -> Result<Self, AppError> {
        match env::var(name)
            .unwrap_or_else(|_| "memory".to_owned())
            .as_str()
        {
            "memory" => Ok(Self::InMemory),
            "redis" => Ok(Self::Redis),
            other => Err(AppError::Validation(format!(
                "{name} must be either 'memory' or 'redis', got '{other}'"
            ))),
        }
    }
}

/// Settings for the external generation service.
#[derive(Debug, Clone)]
pub struct GenerationRuntimeConfig {
    /// Absent when the key is unset; the endpoint then answers 503.
    pub api_key: Option<String>,
    /// Anthropic API base URL.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Completion token budget per call.
    pub max_tokens: u32,
}

/// Runtime configuration for the API process.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub generation: GenerationRuntimeConfig,
    pub rate_limit_store: ProtectionStoreBackend,
    pub idempotency_store: ProtectionStoreBackend,
    pub redis_url: Option<String>,
    pub sweep_interval_seconds: u64,
}

impl ApiConfig {
    /// Loads and validates configuration from the environment.
    pub fn load() -> Result<Self, AppError> {
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let api_key = env::var("ANTHROPIC_API_KEY")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        let base_url = env::var("ANTHROPIC_BASE_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com/v1".to_owned());
        Url::parse(&base_url)
            .map_err(|error| AppError::Validation(format!("invalid ANTHROPIC_BASE_URL: {error}")))?;

        let model = env::var("GENERATION_MODEL")
            .unwrap_or_else(|_| "claude-sonnet-4-20250514".to_owned());
        let max_tokens = parse_env_u32("GENERATION_MAX_TOKENS", 4096)?;

        let rate_limit_store = ProtectionStoreBackend::from_env("RATE_LIMIT_STORE")?;
        let idempotency_store = ProtectionStoreBackend::from_env("IDEMPOTENCY_STORE")?;
        let redis_url = env::var("REDIS_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());

        let sweep_interval_seconds = parse_env_u64("SWEEP_INTERVAL_SECONDS", 3600)?;
        if sweep_interval_seconds == 0 {
            return Err(AppError::Validation(
                "SWEEP_INTERVAL_SECONDS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            frontend_url,
            api_host,
            api_port,
            generation: GenerationRuntimeConfig {
                api_key,
                base_url,
                model,
                max_tokens,
            },
            rate_limit_store,
            idempotency_store,
            redis_url,
            sweep_interval_seconds,
        })
    }

    /// Whether any configured store backend needs a Redis connection.
    #[must_use]
    pub fn requires_redis(&self) -> bool {
        self.rate_limit_store == ProtectionStoreBackend::Redis
            || self.idempotency_store == ProtectionStoreBackend::Redis
    }
}

fn parse_env_u32(name: &str, default: u32) -> Result<u32, AppError> {
    match env::var(name) {
        Ok(value) => value.parse::<u32>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, AppError> {
    match env::var(name) {
        Ok(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}
