use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use crate::handlers::{bookings, search, stations};
use crate::middleware::rate_limit::{create_public_governor, log_request};
use crate::AppState;

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "time": Utc::now().to_rfc3339(),
    }))
}

pub fn create_router(state: AppState) -> Router {
    // Rate limit: 100 requests per minute per IP
    let public_governor = create_public_governor();

    let booking_routes = Router::new()
        .route("/", post(bookings::create_booking))
        .route("/direct", post(bookings::book_direct))
        .route(
            "/{reference}",
            get(bookings::get_booking).delete(bookings::cancel_booking),
        );

    let api_routes = Router::new()
        .route("/stations", get(stations::list))
        .route("/search", post(search::search_departures))
        .route("/departures/{id}", get(search::get_departure))
        .nest("/bookings", booking_routes)
        .layer(public_governor);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
