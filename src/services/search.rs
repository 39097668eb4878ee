use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::entities::{departure, train};
use crate::error::{AppError, AppResult, DateRejection};
use crate::services::pricing::round_cents;
use crate::services::read_model::DepartureView;
use crate::services::stations::{self, StationRole};

/// How far ahead a journey can be searched or booked, inclusive.
pub const MAX_ADVANCE_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePreference {
    Morning,
    Afternoon,
    Evening,
    #[default]
    Any,
}

impl TimePreference {
    /// Whether a departure at `time` falls in this window.
    /// Windows are half-open: morning is 06:00..12:00 and so on.
    pub fn admits(self, time: NaiveTime) -> bool {
        let hour = time.hour();
        match self {
            TimePreference::Morning => (6..12).contains(&hour),
            TimePreference::Afternoon => (12..18).contains(&hour),
            TimePreference::Evening => hour >= 18,
            TimePreference::Any => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub wifi: bool,
    #[serde(default)]
    pub catering: bool,
    /// Ceiling on the per-person base fare; ignored unless positive.
    pub max_price: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub time_preference: TimePreference,
    pub passenger_count: Option<i32>,
    #[serde(default)]
    pub filters: SearchFilters,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepartureOffer {
    pub departure: DepartureView,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: String,
    pub duration_minutes: i64,
    pub price_per_person: f64,
    /// Estimate for the whole group at the adult fare
    pub total_price: f64,
}

/// Reject dates before `today` or more than [`MAX_ADVANCE_DAYS`] after it.
pub fn validate_travel_date(date: NaiveDate, today: NaiveDate) -> AppResult<()> {
    if date < today {
        return Err(AppError::InvalidDate(DateRejection::Past));
    }
    if date > today + Duration::days(MAX_ADVANCE_DAYS) {
        return Err(AppError::InvalidDate(DateRejection::TooFar));
    }
    Ok(())
}

/// 0 = Sunday .. 6 = Saturday, matching `departure.weekday`.
pub fn weekday_index(date: NaiveDate) -> i16 {
    date.weekday().num_days_from_sunday() as i16
}

/// Minutes between departure and arrival; an arrival before the departure
/// time means the train arrives the next day.
pub fn trip_minutes(departure: NaiveTime, arrival: NaiveTime) -> i64 {
    let minutes = (arrival - departure).num_minutes();
    if minutes < 0 { minutes + 24 * 60 } else { minutes }
}

pub fn format_duration(minutes: i64) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Amenity, price and time-of-day filters for a single candidate.
pub fn passes_filters(
    departure: &departure::Model,
    train: &train::Model,
    time_preference: TimePreference,
    filters: &SearchFilters,
) -> bool {
    if !time_preference.admits(departure.departure_time) {
        return false;
    }
    if filters.wifi && !train.has_wifi {
        return false;
    }
    if filters.catering && !train.has_catering {
        return false;
    }
    match filters.max_price {
        Some(ceiling) if ceiling > 0.0 => departure.base_fare <= ceiling,
        _ => true,
    }
}

pub fn build_offer(view: DepartureView, passenger_count: i32) -> DepartureOffer {
    let minutes = trip_minutes(view.departure_time, view.arrival_time);
    let per_person = round_cents(view.base_fare);

    DepartureOffer {
        departure_time: view.departure_time.format("%H:%M").to_string(),
        arrival_time: view.arrival_time.format("%H:%M").to_string(),
        duration: format_duration(minutes),
        duration_minutes: minutes,
        price_per_person: per_person,
        total_price: round_cents(per_person * passenger_count as f64),
        departure: view,
    }
}

/// Departures from `origin` to `destination` on `date` with room for the
/// whole group, earliest first.
pub async fn search<C: ConnectionTrait>(
    conn: &C,
    request: &SearchRequest,
    today: NaiveDate,
) -> AppResult<Vec<DepartureOffer>> {
    let origin = stations::resolve(conn, &request.origin, StationRole::Origin).await?;
    let destination = stations::resolve(conn, &request.destination, StationRole::Destination).await?;

    validate_travel_date(request.date, today)?;

    let weekday = weekday_index(request.date);
    let passenger_count = match request.passenger_count {
        None => 1,
        Some(count) if count >= 1 => count,
        Some(count) => {
            return Err(AppError::Validation(format!(
                "Passenger count must be at least 1, got {}",
                count
            )));
        }
    };

    let candidates = departure::Entity::find()
        .filter(departure::Column::OriginStationId.eq(origin.id))
        .filter(departure::Column::DestinationStationId.eq(destination.id))
        .filter(departure::Column::Weekday.eq(weekday))
        .filter(departure::Column::RemainingCapacity.gte(passenger_count))
        .order_by_asc(departure::Column::DepartureTime)
        .order_by_asc(departure::Column::Id)
        .find_also_related(train::Entity)
        .all(conn)
        .await?;

    let offers: Vec<DepartureOffer> = candidates
        .into_iter()
        .filter_map(|(d, t)| t.map(|t| (d, t)))
        .filter(|(d, t)| passes_filters(d, t, request.time_preference, &request.filters))
        .map(|(d, t)| {
            let view = DepartureView::new(d, t, origin.clone(), destination.clone());
            build_offer(view, passenger_count)
        })
        .collect();

    tracing::info!(
        origin = %origin.name,
        destination = %destination.name,
        date = %request.date,
        weekday,
        passengers = passenger_count,
        results = offers.len(),
        "Searched departures"
    );

    if offers.is_empty() {
        return Err(AppError::NoResults);
    }

    Ok(offers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::train::TrainCategory;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn departure_at(time: NaiveTime, base_fare: f64) -> departure::Model {
        departure::Model {
            id: 1,
            train_id: 1,
            origin_station_id: 1,
            destination_station_id: 2,
            departure_time: time,
            arrival_time: time,
            weekday: 1,
            base_fare,
            remaining_capacity: 10,
        }
    }

    fn train(has_wifi: bool, has_catering: bool) -> train::Model {
        train::Model {
            id: 1,
            number: "IC 101".to_string(),
            category: TrainCategory::Intercity,
            has_wifi,
            has_catering,
            total_seats: 10,
        }
    }

    #[test]
    fn test_date_bounds() {
        let today = day(2026, 10, 18);
        assert!(validate_travel_date(today, today).is_ok());
        assert!(validate_travel_date(today + Duration::days(90), today).is_ok());
        assert!(matches!(
            validate_travel_date(today - Duration::days(1), today),
            Err(AppError::InvalidDate(DateRejection::Past))
        ));
        assert!(matches!(
            validate_travel_date(today + Duration::days(91), today),
            Err(AppError::InvalidDate(DateRejection::TooFar))
        ));
    }

    #[test]
    fn test_weekday_index_starts_on_sunday() {
        assert_eq!(weekday_index(day(2026, 10, 18)), 0); // Sunday
        assert_eq!(weekday_index(day(2026, 10, 19)), 1);
        assert_eq!(weekday_index(day(2026, 10, 24)), 6);
    }

    #[test]
    fn test_time_windows() {
        assert!(TimePreference::Morning.admits(at(6, 0)));
        assert!(!TimePreference::Morning.admits(at(12, 0)));
        assert!(TimePreference::Afternoon.admits(at(12, 0)));
        assert!(!TimePreference::Afternoon.admits(at(18, 0)));
        assert!(TimePreference::Evening.admits(at(23, 59)));
        assert!(!TimePreference::Evening.admits(at(5, 59)));
        assert!(TimePreference::Any.admits(at(3, 0)));
    }

    #[test]
    fn test_duration() {
        assert_eq!(trip_minutes(at(8, 15), at(10, 5)), 110);
        assert_eq!(format_duration(110), "1h 50m");
        // Overnight
        assert_eq!(trip_minutes(at(23, 30), at(1, 0)), 90);
    }

    #[test]
    fn test_filters() {
        let d = departure_at(at(9, 0), 30.0);
        let none = SearchFilters::default();
        assert!(passes_filters(&d, &train(false, false), TimePreference::Any, &none));
        assert!(!passes_filters(&d, &train(false, false), TimePreference::Evening, &none));

        let wifi = SearchFilters { wifi: true, ..Default::default() };
        assert!(!passes_filters(&d, &train(false, true), TimePreference::Any, &wifi));
        assert!(passes_filters(&d, &train(true, false), TimePreference::Any, &wifi));

        let catering = SearchFilters { catering: true, ..Default::default() };
        assert!(!passes_filters(&d, &train(true, false), TimePreference::Any, &catering));

        let cheap = SearchFilters { max_price: Some(25.0), ..Default::default() };
        assert!(!passes_filters(&d, &train(true, true), TimePreference::Any, &cheap));
        let ignored = SearchFilters { max_price: Some(0.0), ..Default::default() };
        assert!(passes_filters(&d, &train(true, true), TimePreference::Any, &ignored));
    }

    #[test]
    fn test_request_defaults() {
        let request: SearchRequest = serde_json::from_value(serde_json::json!({
            "origin": "ASD",
            "destination": "RTD",
            "date": "2026-10-19"
        }))
        .unwrap();
        assert_eq!(request.time_preference, TimePreference::Any);
        assert_eq!(request.filters, SearchFilters::default());
        assert_eq!(request.passenger_count, None);
    }
}
