use chrono::{DateTime, Datelike, TimeZone, Utc};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};

use crate::entities::booking;
use crate::error::{AppError, AppResult};

pub const REFERENCE_PREFIX: &str = "TRN";

/// `TRN-2026-00042`
pub fn format_reference(year: i32, sequence: u64) -> String {
    format!("{}-{}-{:05}", REFERENCE_PREFIX, year, sequence)
}

/// Clock-derived suffix used when the sequential reference is already taken.
/// Not zero-padded; microsecond resolution keeps it distinct between callers.
pub fn fallback_reference(now: DateTime<Utc>) -> String {
    let micros = now.timestamp_micros().rem_euclid(10_000_000_000);
    format!("{}-{}-{}", REFERENCE_PREFIX, now.year(), micros)
}

async fn reference_exists<C: ConnectionTrait>(conn: &C, reference: &str) -> AppResult<bool> {
    let found = booking::Entity::find()
        .filter(booking::Column::Reference.eq(reference))
        .count(conn)
        .await?;
    Ok(found > 0)
}

/// Next booking reference for the year of `now`.
///
/// Counts this year's bookings and takes the following number. Two concurrent
/// bookings can read the same count; the loser of that race sees the collision
/// here and switches to a clock suffix. The unique index on `reference` is the
/// final guard.
pub async fn next_reference<C: ConnectionTrait>(conn: &C, now: DateTime<Utc>) -> AppResult<String> {
    let year = now.year();
    let start = Utc
        .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| AppError::Internal(format!("Invalid year {}", year)))?;
    let end = Utc
        .with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| AppError::Internal(format!("Invalid year {}", year + 1)))?;

    let created_this_year = booking::Entity::find()
        .filter(booking::Column::CreatedAt.gte(start.fixed_offset()))
        .filter(booking::Column::CreatedAt.lt(end.fixed_offset()))
        .count(conn)
        .await?;

    let candidate = format_reference(year, created_this_year + 1);
    if !reference_exists(conn, &candidate).await? {
        return Ok(candidate);
    }

    let fallback = fallback_reference(Utc::now());
    tracing::warn!(
        collided = %candidate,
        fallback = %fallback,
        "Booking reference collision, using clock suffix"
    );

    if reference_exists(conn, &fallback).await? {
        return Err(AppError::Busy);
    }

    Ok(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_reference_pads_sequence() {
        assert_eq!(format_reference(2025, 1), "TRN-2025-00001");
        assert_eq!(format_reference(2026, 12345), "TRN-2026-12345");
        assert_eq!(format_reference(2026, 123456), "TRN-2026-123456");
    }

    #[test]
    fn test_fallback_reference_keeps_prefix_and_year() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        let reference = fallback_reference(now);
        assert!(reference.starts_with("TRN-2026-"));
        assert_ne!(reference, format_reference(2026, 1));
    }
}
