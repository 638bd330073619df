//! Itinerary generation orchestration.
//!
//! Builds the prompt pair, invokes the external generation client with a
//! bounded retry loop, and refuses to hand anything back that has not passed
//! the itinerary schema validator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use itinero_core::{AppError, AppResult};
use itinero_domain::{Itinerary, TripRequest, format_violations};

mod parse;
mod prompt;

#[cfg(test)]
mod tests;

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Prompt pair sent to the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPrompt {
    /// Fixed instructions: strict JSON output, language, currency, schema.
    pub system: String,
    /// Request-specific instructions.
    pub user: String,
}

/// Failure modes of one generation call.
///
/// Discriminates provider-side throttling from retryable faults: retrying
/// into an overloaded provider compounds the problem, so `Throttled` ends the
/// attempt loop immediately. Messages are sanitized status descriptions,
/// never raw upstream body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationCallError {
    /// The provider reported overload; never retried.
    Throttled(String),
    /// Transport error, timeout, or transient upstream status; retryable.
    Transient(String),
}

/// Client port for the external text-generation service.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Runs one completion call and returns the raw text payload.
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String, GenerationCallError>;
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Total attempts per request: one initial call plus one retry.
const DEFAULT_MAX_ATTEMPTS: u8 = 2;

/// Fixed pause between attempts. With a two-attempt budget an exponential
/// schedule buys nothing.
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Discriminated outcome of a single attempt, consumed by the retry loop.
enum AttemptOutcome {
    Success(Box<Itinerary>),
    Retryable(String),
    Fatal(String),
}

/// Application service producing validated itineraries.
#[derive(Clone)]
pub struct GenerationService {
    client: Arc<dyn GenerationClient>,
    max_attempts: u8,
    retry_backoff: Duration,
}

impl GenerationService {
    /// Creates a generation service with the default retry policy.
    #[must_use]
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self {
            client,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    /// Overrides the retry policy. `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn with_retry_policy(mut self, max_attempts: u8, retry_backoff: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_backoff = retry_backoff;
        self
    }

    /// Produces a validated itinerary for a validated request.
    ///
    /// Any rate-limit slot consumed before this call is not refunded on
    /// failure. The terminal error carries the last attempt's diagnostic.
    pub async fn generate_itinerary(&self, request: &TripRequest) -> AppResult<Itinerary> {
        let prompt = prompt::build_prompt(request);
        let mut last_error: Option<String> = None;
        let mut attempt = 0_u8;

        while attempt < self.max_attempts {
            attempt += 1;

            match self.run_attempt(&prompt).await {
                AttemptOutcome::Success(itinerary) => return Ok(*itinerary),
                AttemptOutcome::Retryable(message) => {
                    last_error = Some(message);
                }
                AttemptOutcome::Fatal(message) => {
                    return Err(AppError::Generation(message));
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.retry_backoff).await;
            }
        }

        Err(AppError::Generation(last_error.unwrap_or_else(|| {
            "generation attempts exhausted".to_owned()
        })))
    }

    async fn run_attempt(&self, prompt: &GenerationPrompt) -> AttemptOutcome {
        let payload = match self.client.generate(prompt).await {
            Ok(payload) => payload,
            Err(GenerationCallError::Throttled(message)) => {
                return AttemptOutcome::Fatal(message);
            }
            Err(GenerationCallError::Transient(message)) => {
                return AttemptOutcome::Retryable(message);
            }
        };

        let value = match parse::parse_generation_payload(&payload) {
            Ok(value) => value,
            Err(message) => return AttemptOutcome::Retryable(message),
        };

        match Itinerary::from_value(&value) {
            Ok(itinerary) => AttemptOutcome::Success(Box::new(itinerary)),
            Err(violations) => AttemptOutcome::Retryable(format!(
                "generated itinerary failed schema validation: {}",
                format_violations(&violations)
            )),
        }
    }
}
