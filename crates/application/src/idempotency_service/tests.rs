use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;
use serde_json::json;

use itinero_core::{AppError, AppResult};
use itinero_domain::{Budget, Interest, Pace, TripRequest};

use super::{IdempotencyEntry, IdempotencyService, IdempotencyStore, fingerprint};

#[derive(Default)]
struct TestStore {
    entries: Mutex<HashMap<String, IdempotencyEntry>>,
}

impl TestStore {
    fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .ok()
            .is_some_and(|entries| entries.contains_key(key))
    }
}

#[async_trait]
impl IdempotencyStore for TestStore {
    async fn get(&self, key: &str) -> AppResult<Option<IdempotencyEntry>> {
        Ok(self
            .entries
            .lock()
            .map_err(|error| AppError::Internal(format!("failed to lock store state: {error}")))?
            .get(key)
            .cloned())
    }

    async fn set(&self, key: &str, entry: IdempotencyEntry) -> AppResult<()> {
        self.entries
            .lock()
            .map_err(|error| AppError::Internal(format!("failed to lock store state: {error}")))?
            .insert(key.to_owned(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries
            .lock()
            .map_err(|error| AppError::Internal(format!("failed to lock store state: {error}")))?
            .remove(key);
        Ok(())
    }

    async fn sweep(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|error| AppError::Internal(format!("failed to lock store state: {error}")))?;
        let before = entries.len();
        entries.retain(|_, entry| now <= entry.expires_at);
        Ok((before - entries.len()) as u64)
    }
}

fn sample_request() -> TripRequest {
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

#[test]
fn fingerprint_is_deterministic() {
    let first = fingerprint(&sample_request()).unwrap_or_else(|_| panic!("test"));
    let second = fingerprint(&sample_request()).unwrap_or_else(|_| panic!("test"));

    assert_eq!(first, second);
    assert_eq!(first.len(), 64);
}

#[test]
fn fingerprint_ignores_source_key_order() {
    let ordered: serde_json::Value = serde_json::from_str(
        r#"{"destination":"Lisbonne","days":3,"budget":"balanced","interests":["culture"],"pace":"balanced"}"#,
    )
    .unwrap_or_else(|_| panic!("test"));
    let shuffled: serde_json::Value = serde_json::from_str(
        r#"{"pace":"balanced","interests":["culture"],"budget":"balanced","days":3,"destination":"Lisbonne"}"#,
    )
    .unwrap_or_else(|_| panic!("test"));

    let first = TripRequest::from_value(&ordered).unwrap_or_else(|_| panic!("test"));
    let second = TripRequest::from_value(&shuffled).unwrap_or_else(|_| panic!("test"));

    assert_eq!(
        fingerprint(&first).unwrap_or_else(|_| panic!("test")),
        fingerprint(&second).unwrap_or_else(|_| panic!("test"))
    );
}

#[test]
fn different_requests_produce_different_fingerprints() {
    let mut other = sample_request();
    other.days = 4;

    assert_ne!(
        fingerprint(&sample_request()).unwrap_or_else(|_| panic!("test")),
        fingerprint(&other).unwrap_or_else(|_| panic!("test"))
    );
}

#[test]
fn interest_order_changes_the_fingerprint() {
    let mut reordered = sample_request();
    reordered.interests = vec![Interest::Gastronomie, Interest::Culture];

    assert_ne!(
        fingerprint(&sample_request()).unwrap_or_else(|_| panic!("test")),
        fingerprint(&reordered).unwrap_or_else(|_| panic!("test"))
    );
}

proptest! {
    #[test]
    fn fingerprint_survives_a_wire_round_trip(
        destination in "[A-Za-z]{2,40}",
        days in 1u8..=30,
        budget_index in 0usize..3,
        pace_index in 0usize..3,
        interests in proptest::sample::subsequence(
            vec![
                Interest::Culture,
                Interest::Nature,
                Interest::Gastronomie,
                Interest::Histoire,
                Interest::Plage,
            ],
            1..=5,
        ),
        travelers in proptest::option::of(1u8..=20),
    ) {
        let budgets = [Budget::Economic, Budget::Balanced, Budget::Comfort];
        let paces = [Pace::Relaxed, Pace::Balanced, Pace::Intense];

        let request = TripRequest {
            destination,
            days,
            budget: budgets[budget_index],
            interests,
            pace: paces[pace_index],
            travelers,
            start_date: None,
        };

        let wire = serde_json::to_value(&request).unwrap_or_else(|_| panic!("test"));
        let round_tripped = TripRequest::from_value(&wire).unwrap_or_else(|_| panic!("test"));

        prop_assert_eq!(
            fingerprint(&request).unwrap_or_else(|_| panic!("test")),
            fingerprint(&round_tripped).unwrap_or_else(|_| panic!("test"))
        );
    }
}

#[tokio::test]
async fn stored_result_is_served_within_ttl() {
    let service = IdempotencyService::new(Arc::new(TestStore::default()));
    let now = Utc::now();
    let result = json!({"destination": "Lisbonne"});

    service
        .store_at("key-1", result.clone(), now)
        .await
        .unwrap_or_else(|_| panic!("test"));

    let cached = service
        .check_at("key-1", now + Duration::hours(23))
        .await
        .unwrap_or_else(|_| panic!("test"));
    assert_eq!(cached, Some(result));
}

#[tokio::test]
async fn expired_entry_reads_as_absent_and_is_evicted() {
    let store = Arc::new(TestStore::default());
    let service = IdempotencyService::new(store.clone());
    let now = Utc::now();

    service
        .store_at("key-2", json!({"destination": "Porto"}), now)
        .await
        .unwrap_or_else(|_| panic!("test"));

    let after_ttl = now + Duration::hours(24) + Duration::seconds(1);
    let cached = service
        .check_at("key-2", after_ttl)
        .await
        .unwrap_or_else(|_| panic!("test"));

    assert!(cached.is_none());
    assert!(!store.contains("key-2"));
}

#[tokio::test]
async fn entry_is_still_valid_at_exact_expiry() {
    let service = IdempotencyService::new(Arc::new(TestStore::default()));
    let now = Utc::now();

    service
        .store_at("key-3", json!({"ok": true}), now)
        .await
        .unwrap_or_else(|_| panic!("test"));

    let at_expiry = now + Duration::hours(24);
    let cached = service
        .check_at("key-3", at_expiry)
        .await
        .unwrap_or_else(|_| panic!("test"));
    assert!(cached.is_some());
}

#[tokio::test]
async fn store_overwrites_the_previous_entry() {
    let service = IdempotencyService::new(Arc::new(TestStore::default()));
    let now = Utc::now();

    service
        .store_at("key-4", json!({"version": 1}), now)
        .await
        .unwrap_or_else(|_| panic!("test"));
    service
        .store_at("key-4", json!({"version": 2}), now + Duration::seconds(5))
        .await
        .unwrap_or_else(|_| panic!("test"));

    let cached = service
        .check_at("key-4", now + Duration::seconds(10))
        .await
        .unwrap_or_else(|_| panic!("test"));
    assert_eq!(cached, Some(json!({"version": 2})));
}

#[tokio::test]
async fn sweep_removes_only_expired_entries() {
    let store = Arc::new(TestStore::default());
    let service = IdempotencyService::new(store.clone());
    let now = Utc::now();

    service
        .store_at("stale", json!({}), now - Duration::hours(25))
        .await
        .unwrap_or_else(|_| panic!("test"));
    service
        .store_at("fresh", json!({}), now)
        .await
        .unwrap_or_else(|_| panic!("test"));

    let removed = service.sweep().await.unwrap_or_else(|_| panic!("test"));
    assert_eq!(removed, 1);
    assert!(!store.contains("stale"));
    assert!(store.contains("fresh"));
}
