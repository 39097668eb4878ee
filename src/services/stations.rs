use sea_orm::{ConnectionTrait, EntityTrait, QueryOrder};

use crate::entities::station;
use crate::error::{AppError, AppResult};
use crate::utils::similarity::trigram_similarity;

/// Which end of the journey a station lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationRole {
    Origin,
    Destination,
}

impl std::fmt::Display for StationRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StationRole::Origin => write!(f, "Origin"),
            StationRole::Destination => write!(f, "Destination"),
        }
    }
}

/// All stations, ordered by name
pub async fn list_stations<C: ConnectionTrait>(conn: &C) -> AppResult<Vec<station::Model>> {
    Ok(station::Entity::find()
        .order_by_asc(station::Column::Name)
        .all(conn)
        .await?)
}

/// Pick the station `query` refers to.
///
/// An exact code match wins outright. Otherwise any station whose name or city
/// contains the query is a candidate, and the one most similar to the query
/// is returned.
pub fn best_match<'a>(stations: &'a [station::Model], query: &str) -> Option<&'a station::Model> {
    let needle = query.trim();
    if needle.is_empty() {
        return None;
    }

    if let Some(exact) = stations
        .iter()
        .find(|s| s.code.eq_ignore_ascii_case(needle))
    {
        return Some(exact);
    }

    let lowered = needle.to_lowercase();
    stations
        .iter()
        .filter(|s| {
            s.name.to_lowercase().contains(&lowered) || s.city.to_lowercase().contains(&lowered)
        })
        .map(|s| {
            let score = trigram_similarity(&s.name, needle).max(trigram_similarity(&s.city, needle));
            (s, score)
        })
        // Highest score first; among equals the lowest id
        .max_by(|(a, sa), (b, sb)| sa.total_cmp(sb).then_with(|| b.id.cmp(&a.id)))
        .map(|(s, _)| s)
}

/// Resolve free text or a code to a station.
pub async fn resolve<C: ConnectionTrait>(
    conn: &C,
    query: &str,
    role: StationRole,
) -> AppResult<station::Model> {
    let stations = station::Entity::find().all(conn).await?;

    best_match(&stations, query)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("{} station not found: {}", role, query)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: i32, name: &str, city: &str, code: &str) -> station::Model {
        station::Model {
            id,
            name: name.to_string(),
            city: city.to_string(),
            code: code.to_string(),
        }
    }

    fn fixtures() -> Vec<station::Model> {
        vec![
            station(1, "Amsterdam Centraal", "Amsterdam", "ASD"),
            station(2, "Amsterdam Zuid", "Amsterdam", "ASDZ"),
            station(3, "Rotterdam Centraal", "Rotterdam", "RTD"),
            station(4, "Utrecht Centraal", "Utrecht", "UT"),
        ]
    }

    #[test]
    fn test_exact_code_wins() {
        let stations = fixtures();
        assert_eq!(best_match(&stations, "asdz").map(|s| s.id), Some(2));
        assert_eq!(best_match(&stations, "UT").map(|s| s.id), Some(4));
    }

    #[test]
    fn test_substring_ranked_by_similarity() {
        let stations = fixtures();
        assert_eq!(best_match(&stations, "amsterdam zuid").map(|s| s.id), Some(2));
        assert_eq!(best_match(&stations, "rotter").map(|s| s.id), Some(3));
    }

    #[test]
    fn test_city_match() {
        let stations = fixtures();
        assert_eq!(best_match(&stations, "utrecht").map(|s| s.id), Some(4));
    }

    #[test]
    fn test_no_match() {
        let stations = fixtures();
        assert!(best_match(&stations, "Berlin").is_none());
        assert!(best_match(&stations, "   ").is_none());
    }
}
