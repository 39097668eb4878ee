use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

/// Why a travel date was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRejection {
    Past,
    TooFar,
}

impl std::fmt::Display for DateRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateRejection::Past => write!(f, "date is in the past"),
            DateRejection::TooFar => write!(f, "date is more than 90 days ahead"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("invalid date: {0}")]
    InvalidDate(DateRejection),

    #[error("no departures found for the specified criteria")]
    NoResults,

    #[error("insufficient seats available (need {needed}, have {available})")]
    InsufficientCapacity { needed: i32, available: i32 },

    #[error("booking {0} is already cancelled")]
    AlreadyCancelled(String),

    #[error("departure is busy, try again")]
    Busy,

    #[error("database error: {0}")]
    Database(#[source] DbErr),

    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<DbErr> for AppError {
    fn from(e: DbErr) -> Self {
        match e {
            // Pool exhausted: every connection is held by another request
            DbErr::ConnectionAcquire(_) => AppError::Busy,
            other => AppError::Database(other),
        }
    }
}

impl AppError {
    /// Stable machine-readable kind, used in response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::NotFound(_) => "not_found",
            AppError::InvalidDate(_) => "invalid_date",
            AppError::NoResults => "no_results",
            AppError::InsufficientCapacity { .. } => "insufficient_capacity",
            AppError::AlreadyCancelled(_) => "already_cancelled",
            AppError::Busy => "busy",
            AppError::Database(_) | AppError::Internal(_) => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidDate(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::NoResults => StatusCode::NOT_FOUND,
            AppError::InsufficientCapacity { .. } | AppError::AlreadyCancelled(_) => {
                StatusCode::CONFLICT
            }
            AppError::Busy => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Never leak storage details to the caller
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                "Internal server error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": self.kind(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ConnAcquireErr;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidDate(DateRejection::TooFar).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NoResults.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::InsufficientCapacity { needed: 2, available: 1 }.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::AlreadyCancelled("TRN-2026-00001".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::Busy.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_insufficient_capacity_message() {
        let err = AppError::InsufficientCapacity { needed: 3, available: 1 };
        assert_eq!(
            err.to_string(),
            "insufficient seats available (need 3, have 1)"
        );
        assert_eq!(err.kind(), "insufficient_capacity");
    }

    #[test]
    fn test_database_error_is_internal() {
        let err: AppError = DbErr::Custom("boom".into()).into();
        assert_eq!(err.kind(), "internal");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_pool_exhaustion_is_busy() {
        let err: AppError = DbErr::ConnectionAcquire(ConnAcquireErr::Timeout).into();
        assert!(matches!(err, AppError::Busy));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
