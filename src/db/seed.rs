use chrono::{Duration, NaiveTime};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
};

use crate::entities::train::TrainCategory;
use crate::entities::{departure, station, train};
use crate::error::{AppError, AppResult};
use crate::services::pricing::base_fare_for_distance;

struct TrainSeed {
    number: &'static str,
    category: TrainCategory,
    has_wifi: bool,
    has_catering: bool,
    total_seats: i32,
}

const TRAINS: [TrainSeed; 3] = [
    TrainSeed {
        number: "ICD 901",
        category: TrainCategory::Express,
        has_wifi: true,
        has_catering: true,
        total_seats: 300,
    },
    TrainSeed {
        number: "IC 1500",
        category: TrainCategory::Intercity,
        has_wifi: true,
        has_catering: false,
        total_seats: 400,
    },
    TrainSeed {
        number: "SPR 4800",
        category: TrainCategory::Regional,
        has_wifi: false,
        has_catering: false,
        total_seats: 200,
    },
];

/// (origin code, destination code, distance km, [(train index, HH, MM, minutes)])
type RouteSeed = (&'static str, &'static str, f64, &'static [(usize, u32, u32, i64)]);

const ROUTES: [RouteSeed; 6] = [
    ("ASD", "RTD", 75.0, &[(0, 7, 15, 42), (1, 9, 45, 63), (2, 13, 5, 95), (1, 18, 30, 63)]),
    ("RTD", "ASD", 75.0, &[(1, 8, 0, 63), (0, 12, 15, 42), (2, 19, 40, 95)]),
    ("ASD", "UT", 40.0, &[(1, 6, 50, 27), (2, 11, 20, 38), (1, 17, 10, 27), (1, 21, 0, 27)]),
    ("UT", "ASD", 40.0, &[(1, 7, 30, 27), (2, 14, 20, 38), (1, 20, 45, 27)]),
    ("UT", "EHV", 90.0, &[(1, 8, 10, 48), (0, 15, 40, 40)]),
    ("ASD", "GN", 185.0, &[(1, 6, 15, 138), (1, 16, 15, 138), (1, 22, 45, 138)]),
];

async fn station_id<C: ConnectionTrait>(conn: &C, code: &str) -> AppResult<i32> {
    station::Entity::find()
        .filter(station::Column::Code.eq(code))
        .one(conn)
        .await?
        .map(|s| s.id)
        .ok_or_else(|| AppError::Internal(format!("Seed station {} missing", code)))
}

/// Insert a weekly demo timetable if no departures exist yet.
/// Returns the number of departures created.
pub async fn seed_timetable<C: ConnectionTrait>(conn: &C) -> AppResult<u64> {
    if departure::Entity::find().count(conn).await? > 0 {
        return Ok(0);
    }

    let mut trains = Vec::with_capacity(TRAINS.len());
    for seed in &TRAINS {
        let existing = train::Entity::find()
            .filter(train::Column::Number.eq(seed.number))
            .one(conn)
            .await?;
        let model = match existing {
            Some(model) => model,
            None => {
                train::ActiveModel {
                    number: Set(seed.number.to_string()),
                    category: Set(seed.category),
                    has_wifi: Set(seed.has_wifi),
                    has_catering: Set(seed.has_catering),
                    total_seats: Set(seed.total_seats),
                    ..Default::default()
                }
                .insert(conn)
                .await?
            }
        };
        trains.push(model);
    }

    let mut created = 0;
    for (origin, destination, distance_km, slots) in ROUTES {
        let origin_id = station_id(conn, origin).await?;
        let destination_id = station_id(conn, destination).await?;

        for &(train_index, hour, minute, minutes) in slots {
            let train = &trains[train_index];
            let departs = NaiveTime::from_hms_opt(hour, minute, 0)
                .ok_or_else(|| AppError::Internal(format!("Bad seed time {}:{}", hour, minute)))?;
            let (arrives, _) = departs.overflowing_add_signed(Duration::minutes(minutes));

            for weekday in 0..7 {
                departure::ActiveModel {
                    train_id: Set(train.id),
                    origin_station_id: Set(origin_id),
                    destination_station_id: Set(destination_id),
                    departure_time: Set(departs),
                    arrival_time: Set(arrives),
                    weekday: Set(weekday),
                    base_fare: Set(base_fare_for_distance(train.category, distance_km)),
                    remaining_capacity: Set(train.total_seats),
                    ..Default::default()
                }
                .insert(conn)
                .await?;
                created += 1;
            }
        }
    }

    tracing::info!(departures = created, "Seeded timetable");
    Ok(created)
}
