use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::error::AppResult;
use crate::services::booking::{
    self, Cancellation, CreateBookingRequest, DirectBooking, DirectBookingRequest,
};
use crate::services::read_model::{self, BookingDetails};
use crate::AppState;

/// Create a booking
pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<BookingDetails>)> {
    let details = booking::create_booking(
        &state.db,
        &payload,
        Utc::now(),
        state.config.lock_timeout,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(details)))
}

/// Search and book the best matching departure in one step
pub async fn book_direct(
    State(state): State<AppState>,
    Json(payload): Json<DirectBookingRequest>,
) -> AppResult<(StatusCode, Json<DirectBooking>)> {
    let result =
        booking::book_direct(&state.db, &payload, Utc::now(), state.config.lock_timeout).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

/// Get a booking by reference
pub async fn get_booking(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> AppResult<Json<BookingDetails>> {
    Ok(Json(read_model::get_booking(&state.db, &reference).await?))
}

/// Cancel a booking
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> AppResult<Json<Cancellation>> {
    let cancellation =
        booking::cancel_booking(&state.db, &reference, state.config.lock_timeout).await?;
    Ok(Json(cancellation))
}
