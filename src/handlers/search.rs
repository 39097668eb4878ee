use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use crate::error::AppResult;
use crate::services::read_model::{self, DepartureView};
use crate::services::search::{self, DepartureOffer, SearchRequest};
use crate::AppState;

/// Search departures between two stations on a date
pub async fn search_departures(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> AppResult<Json<Vec<DepartureOffer>>> {
    let offers = search::search(&state.db, &payload, Utc::now().date_naive()).await?;
    Ok(Json(offers))
}

/// Get departure details
pub async fn get_departure(
    State(state): State<AppState>,
    Path(departure_id): Path<i32>,
) -> AppResult<Json<DepartureView>> {
    Ok(Json(read_model::get_departure(&state.db, departure_id).await?))
}
