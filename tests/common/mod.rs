#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};
use sea_orm_migration::MigratorTrait;

use train_booking_backend::entities::train::TrainCategory;
use train_booking_backend::entities::{departure, station, train};
use train_booking_backend::services::booking::PassengerRequest;
use train_booking_backend::services::search::weekday_index;

pub const LOCK_TIMEOUT: Duration = Duration::from_secs(10);

static TRAIN_COUNTER: AtomicU32 = AtomicU32::new(1);

/// Fresh in-memory database with all migrations applied.
///
/// One pooled connection: SQLite has no row locks, so transactions are
/// serialised on the connection instead. Concurrent tests on this pool check
/// that capacity is read and decremented inside one transaction; they do not
/// exercise `SELECT ... FOR UPDATE`, which needs Postgres.
pub async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// A travel date one week out, comfortably inside the booking window.
pub fn next_week() -> NaiveDate {
    today() + chrono::Duration::days(7)
}

pub fn at(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

pub async fn station_id(db: &DatabaseConnection, code: &str) -> i32 {
    station::Entity::find()
        .filter(station::Column::Code.eq(code))
        .one(db)
        .await
        .expect("station query")
        .expect("seeded station")
        .id
}

pub async fn insert_train(
    db: &DatabaseConnection,
    category: TrainCategory,
    has_wifi: bool,
    has_catering: bool,
    total_seats: i32,
) -> train::Model {
    let n = TRAIN_COUNTER.fetch_add(1, Ordering::SeqCst);
    train::ActiveModel {
        number: Set(format!("T {}", n)),
        category: Set(category),
        has_wifi: Set(has_wifi),
        has_catering: Set(has_catering),
        total_seats: Set(total_seats),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert train")
}

pub struct DepartureFixture {
    pub origin: &'static str,
    pub destination: &'static str,
    pub date: NaiveDate,
    pub departs: NaiveTime,
    pub arrives: NaiveTime,
    pub base_fare: f64,
    pub capacity: i32,
}

impl Default for DepartureFixture {
    fn default() -> Self {
        Self {
            origin: "ASD",
            destination: "RTD",
            date: next_week(),
            departs: at(9, 0),
            arrives: at(10, 0),
            base_fare: 50.0,
            capacity: 100,
        }
    }
}

pub async fn insert_departure_on(
    db: &DatabaseConnection,
    train: &train::Model,
    fixture: DepartureFixture,
) -> departure::Model {
    let origin = station_id(db, fixture.origin).await;
    let destination = station_id(db, fixture.destination).await;

    departure::ActiveModel {
        train_id: Set(train.id),
        origin_station_id: Set(origin),
        destination_station_id: Set(destination),
        departure_time: Set(fixture.departs),
        arrival_time: Set(fixture.arrives),
        weekday: Set(weekday_index(fixture.date)),
        base_fare: Set(fixture.base_fare),
        remaining_capacity: Set(fixture.capacity),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert departure")
}

pub async fn insert_departure(db: &DatabaseConnection, fixture: DepartureFixture) -> departure::Model {
    let train = insert_train(db, TrainCategory::Intercity, true, false, fixture.capacity.max(1)).await;
    insert_departure_on(db, &train, fixture).await
}

pub async fn remaining_capacity(db: &DatabaseConnection, departure_id: i32) -> i32 {
    departure::Entity::find_by_id(departure_id)
        .one(db)
        .await
        .expect("departure query")
        .expect("departure exists")
        .remaining_capacity
}

pub fn passenger(name: &str, category: &str) -> PassengerRequest {
    PassengerRequest {
        name: name.to_string(),
        category: category.to_string(),
    }
}
