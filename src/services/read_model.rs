use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::passenger::{self, PassengerCategory};
use crate::entities::{departure, station, train};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize)]
pub struct DepartureView {
    pub id: i32,
    pub train: train::Model,
    pub origin: station::Model,
    pub destination: station::Model,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub weekday: i16,
    pub base_fare: f64,
    pub remaining_capacity: i32,
}

impl DepartureView {
    pub fn new(
        departure: departure::Model,
        train: train::Model,
        origin: station::Model,
        destination: station::Model,
    ) -> Self {
        Self {
            id: departure.id,
            train,
            origin,
            destination,
            departure_time: departure.departure_time,
            arrival_time: departure.arrival_time,
            weekday: departure.weekday,
            base_fare: departure.base_fare,
            remaining_capacity: departure.remaining_capacity,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PassengerView {
    pub name: String,
    pub category: PassengerCategory,
    pub seat_label: Option<String>,
    pub fare: f64,
}

impl From<passenger::Model> for PassengerView {
    fn from(p: passenger::Model) -> Self {
        Self {
            name: p.name,
            category: p.category,
            seat_label: p.seat_label,
            fare: p.fare,
        }
    }
}

/// A booking with everything needed to display it.
#[derive(Debug, Clone, Serialize)]
pub struct BookingDetails {
    pub id: Uuid,
    pub reference: String,
    pub travel_date: NaiveDate,
    pub passenger_count: i32,
    pub total_price: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub departure: DepartureView,
    pub passengers: Vec<PassengerView>,
}

/// Departure with its train and both stations.
pub async fn get_departure<C: ConnectionTrait>(conn: &C, departure_id: i32) -> AppResult<DepartureView> {
    let departure = departure::Entity::find_by_id(departure_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Departure {} not found", departure_id)))?;

    describe_departure(conn, departure).await
}

/// Attach train and stations to a departure row already in hand.
pub async fn describe_departure<C: ConnectionTrait>(
    conn: &C,
    departure: departure::Model,
) -> AppResult<DepartureView> {
    let train = train::Entity::find_by_id(departure.train_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::Internal("Train not found".to_string()))?;

    let stations = station::Entity::find()
        .filter(
            station::Column::Id
                .is_in([departure.origin_station_id, departure.destination_station_id]),
        )
        .all(conn)
        .await?;
    let origin = stations
        .iter()
        .find(|s| s.id == departure.origin_station_id)
        .cloned()
        .ok_or_else(|| AppError::Internal("Origin station not found".to_string()))?;
    let destination = stations
        .iter()
        .find(|s| s.id == departure.destination_station_id)
        .cloned()
        .ok_or_else(|| AppError::Internal("Destination station not found".to_string()))?;

    Ok(DepartureView::new(departure, train, origin, destination))
}

/// Look up a booking by its reference. Read-only, takes no locks.
pub async fn get_booking<C: ConnectionTrait>(conn: &C, reference: &str) -> AppResult<BookingDetails> {
    let booking = booking::Entity::find()
        .filter(booking::Column::Reference.eq(reference))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", reference)))?;

    let passengers = passenger::Entity::find()
        .filter(passenger::Column::BookingId.eq(booking.id))
        .order_by_asc(passenger::Column::Position)
        .all(conn)
        .await?;

    let departure = get_departure(conn, booking.departure_id).await?;

    Ok(BookingDetails {
        id: booking.id,
        reference: booking.reference,
        travel_date: booking.travel_date,
        passenger_count: booking.passenger_count,
        total_price: booking.total_price,
        status: booking.status,
        created_at: booking.created_at.with_timezone(&Utc),
        departure,
        passengers: passengers.into_iter().map(PassengerView::from).collect(),
    })
}
