use crate::entities::passenger::PassengerCategory;
use crate::entities::train::TrainCategory;

/// Round a monetary amount to whole cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Fare for one passenger given the adult base fare.
pub fn price(base_fare: f64, category: PassengerCategory) -> f64 {
    let fare = match category {
        PassengerCategory::Adult => base_fare,
        PassengerCategory::Senior => base_fare * 0.80,
        PassengerCategory::Child => base_fare * 0.70,
        PassengerCategory::Infant => 0.0,
    };
    round_cents(fare)
}

/// Resolve a free-form category, falling back to adult for anything unknown.
pub fn category_or_adult(value: &str) -> PassengerCategory {
    PassengerCategory::parse(value).unwrap_or_else(|| {
        tracing::warn!(category = %value, "Unknown passenger category, pricing as adult");
        PassengerCategory::Adult
    })
}

/// Adult base fare for a route of `distance_km` on a train of `category`.
pub fn base_fare_for_distance(category: TrainCategory, distance_km: f64) -> f64 {
    round_cents(distance_km * category.fare_per_km())
}

/// Number of seats a group occupies. Infants ride free and seatless.
pub fn seats_needed(categories: &[PassengerCategory]) -> i32 {
    categories.iter().filter(|c| c.occupies_seat()).count() as i32
}

/// Seat labels in input order; infants get `None` and do not advance the counter.
pub fn assign_seat_labels(categories: &[PassengerCategory]) -> Vec<Option<String>> {
    let mut next = 1;
    categories
        .iter()
        .map(|c| {
            if c.occupies_seat() {
                let label = format!("{}A", next);
                next += 1;
                Some(label)
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_by_category() {
        assert_eq!(price(100.0, category_or_adult("adult")), 100.0);
        assert_eq!(price(100.0, category_or_adult("senior")), 80.0);
        assert_eq!(price(100.0, category_or_adult("child")), 70.0);
        assert_eq!(price(100.0, category_or_adult("infant")), 0.0);
    }

    #[test]
    fn test_unknown_category_priced_as_adult() {
        assert_eq!(category_or_adult("student"), PassengerCategory::Adult);
        assert_eq!(price(42.5, category_or_adult("student")), 42.5);
    }

    #[test]
    fn test_category_is_case_insensitive() {
        assert_eq!(category_or_adult("Infant"), PassengerCategory::Infant);
        assert_eq!(category_or_adult(" SENIOR "), PassengerCategory::Senior);
    }

    #[test]
    fn test_price_rounds_to_cents() {
        assert_eq!(price(33.33, PassengerCategory::Child), 23.33);
        assert_eq!(price(19.99, PassengerCategory::Senior), 15.99);
    }

    #[test]
    fn test_base_fare_for_distance() {
        assert_eq!(base_fare_for_distance(TrainCategory::Express, 200.0), 50.0);
        assert_eq!(base_fare_for_distance(TrainCategory::Regional, 57.0), 6.84);
    }

    #[test]
    fn test_infants_take_no_seat() {
        let group = [
            PassengerCategory::Adult,
            PassengerCategory::Infant,
            PassengerCategory::Child,
        ];
        assert_eq!(seats_needed(&group), 2);
        assert_eq!(
            assign_seat_labels(&group),
            vec![Some("1A".to_string()), None, Some("2A".to_string())]
        );
    }
}
