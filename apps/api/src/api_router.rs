use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use itinero_core::AppError;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

pub fn build_router(app_state: AppState) -> Result<Router, AppError> {
    let cors_layer = cors::build_cors_layer(&app_state.frontend_url)?;

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/api/generate-itinerary",
            get(handlers::generate::generation_status_handler)
                .post(handlers::generate::generate_itinerary_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}
