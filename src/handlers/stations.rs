use axum::{extract::State, Json};

use crate::entities::station;
use crate::error::AppResult;
use crate::services::stations::list_stations;
use crate::AppState;

/// List all stations
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<station::Model>>> {
    Ok(Json(list_stations(&state.db).await?))
}
