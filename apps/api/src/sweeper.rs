use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

use crate::state::AppState;

/// Spawns the periodic sweep of the rate limit and idempotency stores.
///
/// Correctness never depends on this task: both services treat expired
/// entries as absent on every read. The sweep only bounds memory, and runs
/// concurrently with request handling against the same shared stores.
pub fn spawn_sweeper(state: AppState, period: Duration) {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; skip it so sweeps start one
        // full period after boot.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            match state.rate_limit_service.sweep().await {
                Ok(removed) => debug!(removed, "swept expired rate limit entries"),
                Err(error) => warn!(error = %error, "rate limit sweep failed"),
            }

            match state.idempotency_service.sweep().await {
                Ok(removed) => debug!(removed, "swept expired idempotency entries"),
                Err(error) => warn!(error = %error, "idempotency sweep failed"),
            }
        }
    });
}
