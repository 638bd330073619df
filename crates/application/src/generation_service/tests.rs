use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use itinero_core::AppError;
use itinero_domain::{Budget, Interest, Pace, TripRequest};

use super::{GenerationCallError, GenerationClient, GenerationPrompt, GenerationService};

/// Replays a scripted sequence of call outcomes and counts invocations.
struct ScriptedClient {
    responses: Mutex<VecDeque<Result<String, GenerationCallError>>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn new(responses: Vec<Result<String, GenerationCallError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate(&self, _prompt: &GenerationPrompt) -> Result<String, GenerationCallError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .ok()
            .and_then(|mut responses| responses.pop_front())
            .unwrap_or_else(|| {
                Err(GenerationCallError::Transient(
                    "scripted responses exhausted".to_owned(),
                ))
            })
    }
}

fn request() -> TripRequest {
    TripRequest {
        destination: "Lisbonne".to_owned(),
        days: 3,
        budget: Budget::Balanced,
        interests: vec![Interest::Culture, Interest::Gastronomie],
        pace: Pace::Balanced,
        travelers: None,
        start_date: None,
    }
}

fn valid_payload() -> String {
    json!({
        "destination": "Lisbonne, Portugal",
        "days": [
            {
                "day": 1,
                "theme": "Alfama",
                "activities": [
                    {
                        "time": "09:00",
                        "title": "Château Saint-Georges",
                        "description": "Vue panoramique",
                        "location": "Alfama",
                        "costEstimate": "10€"
                    }
                ],
                "meals": {}
            },
            {
                "day": 2,
                "theme": "Belém",
                "activities": [
                    {
                        "time": "10:00",
                        "title": "Tour de Belém",
                        "description": "Monument classé",
                        "location": "Belém",
                        "costEstimate": "6€"
                    }
                ],
                "meals": {}
            },
            {
                "day": 3,
                "theme": "Baixa",
                "activities": [
                    {
                        "time": "11:00",
                        "title": "Praça do Comércio",
                        "description": "Place au bord du Tage",
                        "location": "Baixa",
                        "costEstimate": "gratuit"
                    }
                ],
                "meals": {}
            }
        ],
        "budgetSummary": {
            "accommodation": "150€",
            "food": "90€",
            "activities": "40€",
            "transport": "20€",
            "total": "300€"
        },
        "tips": ["Chaussures confortables"]
    })
    .to_string()
}

fn service(client: Arc<ScriptedClient>) -> GenerationService {
    GenerationService::new(client).with_retry_policy(2, Duration::from_millis(1))
}

#[tokio::test]
async fn valid_response_succeeds_on_first_attempt() {
    let client = ScriptedClient::new(vec![Ok(valid_payload())]);
    let service = service(client.clone());

    let itinerary = service
        .generate_itinerary(&request())
        .await
        .unwrap_or_else(|_| panic!("test"));

    assert_eq!(itinerary.days.len(), 3);
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn prose_wrapped_response_is_recovered() {
    let payload = format!("Voici l'itinéraire demandé :\n{}\nBon voyage !", valid_payload());
    let client = ScriptedClient::new(vec![Ok(payload)]);
    let service = service(client.clone());

    let itinerary = service.generate_itinerary(&request()).await;

    assert!(itinerary.is_ok());
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn two_parse_failures_exhaust_the_attempt_budget() {
    let client = ScriptedClient::new(vec![
        Ok("réponse sans JSON".to_owned()),
        Ok("toujours pas de JSON".to_owned()),
    ]);
    let service = service(client.clone());

    let error = service.generate_itinerary(&request()).await;

    assert_eq!(client.calls(), 2);
    assert!(matches!(error, Err(AppError::Generation(_))));
}

#[tokio::test]
async fn schema_failure_retries_and_recovers() {
    let truncated = json!({"destination": "Lisbonne"}).to_string();
    let client = ScriptedClient::new(vec![Ok(truncated), Ok(valid_payload())]);
    let service = service(client.clone());

    let itinerary = service.generate_itinerary(&request()).await;

    assert!(itinerary.is_ok());
    assert_eq!(client.calls(), 2);
}

#[tokio::test]
async fn transient_error_retries_and_recovers() {
    let client = ScriptedClient::new(vec![
        Err(GenerationCallError::Transient(
            "generation request timed out".to_owned(),
        )),
        Ok(valid_payload()),
    ]);
    let service = service(client.clone());

    let itinerary = service.generate_itinerary(&request()).await;

    assert!(itinerary.is_ok());
    assert_eq!(client.calls(), 2);
}

#[tokio::test]
async fn provider_throttle_stops_after_one_attempt() {
    let client = ScriptedClient::new(vec![
        Err(GenerationCallError::Throttled(
            "generation service is overloaded".to_owned(),
        )),
        Ok(valid_payload()),
    ]);
    let service = service(client.clone());

    let error = service.generate_itinerary(&request()).await;

    assert_eq!(client.calls(), 1);
    let Err(AppError::Generation(message)) = error else {
        panic!("test")
    };
    assert!(message.contains("overloaded"));
}

#[tokio::test]
async fn terminal_error_carries_the_last_diagnostic() {
    let client = ScriptedClient::new(vec![
        Err(GenerationCallError::Transient("first failure".to_owned())),
        Err(GenerationCallError::Transient("second failure".to_owned())),
    ]);
    let service = service(client.clone());

    let error = service.generate_itinerary(&request()).await;

    let Err(AppError::Generation(message)) = error else {
        panic!("test")
    };
    assert_eq!(message, "second failure");
}
