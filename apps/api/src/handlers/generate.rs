use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tracing::{info, warn};

use itinero_application::{GenerationService, RateLimitDecision, fingerprint};
use itinero_core::AppError;
use itinero_domain::{TripRequest, format_violations};

use crate::dto::{GenerateItineraryResponse, GenerationStatusResponse, ItineraryResponse};
use crate::error::{ApiResult, ErrorResponse};
use crate::identity::Caller;
use crate::state::AppState;


/// `POST /api/generate-itinerary`
///
/// Fixed composition order, each step short-circuiting: parse, validate,
/// resolve caller, idempotency lookup, rate limit, generate, cache. Malformed
/// requests never consume quota, and an idempotency hit bypasses the rate
/// limiter entirely.
pub async fn generate_itinerary_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    let Some(generation_service) = state.generation_service.as_ref() else {
        return Ok((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new(
                "generation service is not configured",
                "API_KEY_MISSING",
            )),
        )
            .into_response());
    };

    let Ok(raw) = serde_json::from_slice::<Value>(&body) else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "request body must be valid JSON",
                "VALIDATION_ERROR",
            )),
        )
            .into_response());
    };

    let request = match TripRequest::from_value(&raw) {
        Ok(request) => request,
        Err(violations) => {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(
                    ErrorResponse::new("invalid request data", "VALIDATION_ERROR")
                        .with_details(format_violations(&violations)),
                ),
            )
                .into_response());
        }
    };

    // Identity itself is resolved upstream by the auth gateway; here we only
    // pick the rate limit key.
    let caller = Caller::resolve(&headers);

    let key = fingerprint(&request)?;
    if let Some(cached) = state.idempotency_service.check(&key).await? {
        info!(fingerprint = %key, "served itinerary from idempotency cache");
        return Ok(Json(GenerateItineraryResponse {
            success: true,
            itinerary: cached,
            cached: true,
        })
        .into_response());
    }

    let decision = state
        .rate_limit_service
        .check(&caller.identifier(), caller.is_authenticated())
        .await?;
    if !decision.allowed {
        return Ok(rate_limited_response(&decision));
    }

    // The slot above is already consumed; a failure here does not refund it.
    let itinerary = run_generation(generation_service, &request, &key).await?;

    let payload = serde_json::to_value(ItineraryResponse::from(itinerary))
        .map_err(|error| AppError::Internal(format!("failed to serialize itinerary: {error}")))?;
    state.idempotency_service.store(&key, payload.clone()).await?;

    let mut response = Json(GenerateItineraryResponse {
        success: true,
        itinerary: payload,
        cached: false,
    })
    .into_response();
    apply_rate_limit_headers(response.headers_mut(), &decision);

    Ok(response)
}

/// `GET /api/generate-itinerary`
///
/// Reports whether the generation service is configured.
pub async fn generation_status_handler(
    State(state): State<AppState>,
) -> Json<GenerationStatusResponse> {
    Json(GenerationStatusResponse {
        status: if state.generation_service.is_some() {
            "ok"
        } else {
            "missing_api_key"
        },
        model: state.generation_model.clone(),
        max_tokens: state.generation_max_tokens,
    })
}

async fn run_generation(
    generation_service: &GenerationService,
    request: &TripRequest,
    key: &str,
) -> Result<itinero_domain::Itinerary, AppError> {
    match generation_service.generate_itinerary(request).await {
        Ok(itinerary) => {
            info!(fingerprint = %key, days = itinerary.days.len(), "itinerary generated");
            Ok(itinerary)
        }
        Err(error) => {
            warn!(fingerprint = %key, error = %error, "itinerary generation failed");
            Err(error)
        }
    }
}

fn rate_limited_response(decision: &RateLimitDecision) -> Response {
    let message = match decision.retry_after {
        Some(retry_after) if decision.remaining == 0 => {
            let hours = (retry_after.max(0) as u64).div_ceil(3600) as i64;
            format!("daily limit reached, retry in about {hours}h")
        }
        Some(retry_after) => format!("please wait {retry_after}s between requests"),
        None => "too many requests".to_owned(),
    };

    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorResponse::new(message, "RATE_LIMIT_EXCEEDED")),
    )
        .into_response();

    apply_rate_limit_headers(response.headers_mut(), decision);
    if let Some(retry_after) = decision.retry_after {
        if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
    }

    response
}

fn apply_rate_limit_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    if let Ok(value) = HeaderValue::from_str(&decision.remaining.to_string()) {
        headers.insert("x-ratelimit-remaining", value);
    }
    if let Ok(value) = HeaderValue::from_str(&decision.reset_at.to_rfc3339()) {
        headers.insert("x-ratelimit-reset", value);
    }
}
