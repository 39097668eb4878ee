//! Create and cancel bookings.
//!
//! Each operation runs in one database transaction. The capacity change and
//! the booking rows are committed together or not at all. Every pool wait of
//! an operation, lookups included, is bounded by `lock_timeout` so a caller
//! waiting on a busy departure gets [`AppError::Busy`] instead of hanging.
//! Dropping the future before commit (client went away, timeout fired) rolls
//! the transaction back.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::departure;
use crate::entities::passenger::{self, PassengerCategory};
use crate::error::{AppError, AppResult, DateRejection};
use crate::services::capacity;
use crate::services::pricing::{assign_seat_labels, category_or_adult, price, round_cents, seats_needed};
use crate::services::read_model::{describe_departure, BookingDetails, PassengerView};
use crate::services::reference;
use crate::services::search::{
    self, weekday_index, DepartureOffer, SearchFilters, SearchRequest, TimePreference,
};

#[derive(Debug, Clone, Deserialize)]
pub struct PassengerRequest {
    pub name: String,
    /// adult, senior, child or infant; anything else is treated as adult
    pub category: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub departure_id: i32,
    pub date: NaiveDate,
    pub passengers: Vec<PassengerRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Cancellation {
    pub reference: String,
    pub seats_restored: i32,
}

/// Fail with [`AppError::Busy`] if `work` has not finished within
/// `lock_timeout`. Dropping the future rolls back any open transaction.
async fn within_lock_timeout<T, Fut>(lock_timeout: Duration, work: Fut) -> AppResult<T>
where
    Fut: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(lock_timeout, work).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(timeout_ms = lock_timeout.as_millis() as u64, "Transaction timed out");
            Err(AppError::Busy)
        }
    }
}

/// Run `work` inside a transaction, committing on success and rolling back on
/// error.
async fn in_transaction<T, F, Fut>(db: &DatabaseConnection, work: F) -> AppResult<T>
where
    F: FnOnce(DatabaseTransaction) -> Fut,
    Fut: Future<Output = (DatabaseTransaction, AppResult<T>)>,
{
    let txn = db.begin().await?;
    let (txn, outcome) = work(txn).await;
    match outcome {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = txn.rollback().await {
                tracing::error!(error = %rollback, "Rollback failed");
            }
            Err(e)
        }
    }
}

/// A concurrent booking took the same reference between our check and insert.
fn map_insert_error(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::warn!(error = %e, "Booking reference taken concurrently");
            AppError::Busy
        }
        _ => AppError::from(e),
    }
}

fn validate_passengers(passengers: &[PassengerRequest]) -> AppResult<()> {
    if passengers.is_empty() {
        return Err(AppError::Validation(
            "At least one passenger is required".to_string(),
        ));
    }
    if passengers.iter().any(|p| p.name.trim().is_empty()) {
        return Err(AppError::Validation(
            "Every passenger needs a name".to_string(),
        ));
    }
    Ok(())
}

async fn reserve_and_persist(
    txn: &DatabaseTransaction,
    request: &CreateBookingRequest,
    categories: &[PassengerCategory],
    now: DateTime<Utc>,
) -> AppResult<BookingDetails> {
    let seats = seats_needed(categories);

    // Fails before anything else is written, so no reference is consumed
    let mut departure = capacity::reserve(txn, request.departure_id, seats).await?;
    departure.remaining_capacity -= seats;

    let reference = reference::next_reference(txn, now).await?;

    let labels = assign_seat_labels(categories);
    let fares: Vec<f64> = categories
        .iter()
        .map(|c| price(departure.base_fare, *c))
        .collect();
    let total_price = round_cents(fares.iter().sum());

    let booking_id = Uuid::new_v4();
    let new_booking = booking::ActiveModel {
        id: Set(booking_id),
        reference: Set(reference.clone()),
        departure_id: Set(request.departure_id),
        travel_date: Set(request.date),
        passenger_count: Set(request.passengers.len() as i32),
        total_price: Set(total_price),
        status: Set(BookingStatus::Confirmed),
        created_at: Set(now.fixed_offset()),
    };
    let booking = new_booking.insert(txn).await.map_err(map_insert_error)?;

    let passengers: Vec<passenger::ActiveModel> = request
        .passengers
        .iter()
        .zip(categories)
        .zip(labels.into_iter().zip(fares))
        .enumerate()
        .map(|(position, ((p, category), (seat_label, fare)))| passenger::ActiveModel {
            id: Set(Uuid::new_v4()),
            booking_id: Set(booking_id),
            position: Set(position as i32),
            name: Set(p.name.trim().to_string()),
            category: Set(*category),
            seat_label: Set(seat_label),
            fare: Set(fare),
        })
        .collect();
    passenger::Entity::insert_many(passengers).exec(txn).await?;

    let stored = passenger::Entity::find()
        .filter(passenger::Column::BookingId.eq(booking_id))
        .order_by_asc(passenger::Column::Position)
        .all(txn)
        .await?;

    let view = describe_departure(txn, departure).await?;

    Ok(BookingDetails {
        id: booking.id,
        reference: booking.reference,
        travel_date: booking.travel_date,
        passenger_count: booking.passenger_count,
        total_price: booking.total_price,
        status: booking.status,
        created_at: booking.created_at.with_timezone(&Utc),
        departure: view,
        passengers: stored.into_iter().map(PassengerView::from).collect(),
    })
}

/// Book `passengers` on a departure for the given travel date.
pub async fn create_booking(
    db: &DatabaseConnection,
    request: &CreateBookingRequest,
    now: DateTime<Utc>,
    lock_timeout: Duration,
) -> AppResult<BookingDetails> {
    if request.date < now.date_naive() {
        return Err(AppError::InvalidDate(DateRejection::Past));
    }

    // Everything that touches the pool counts against the lock timeout
    let details = within_lock_timeout(lock_timeout, async {
        let departure = departure::Entity::find_by_id(request.departure_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Departure {} not found", request.departure_id))
            })?;

        if weekday_index(request.date) != departure.weekday {
            return Err(AppError::Validation(
                "Selected date does not match the departure's weekday".to_string(),
            ));
        }

        validate_passengers(&request.passengers)?;

        let categories: Vec<PassengerCategory> = request
            .passengers
            .iter()
            .map(|p| category_or_adult(&p.category))
            .collect();

        let details = in_transaction(db, |txn| async move {
            let outcome = reserve_and_persist(&txn, request, &categories, now).await;
            (txn, outcome)
        })
        .await?;
        Ok::<_, AppError>(details)
    })
    .await?;

    tracing::info!(
        reference = %details.reference,
        departure_id = request.departure_id,
        passengers = details.passenger_count,
        total_price = details.total_price,
        "Booking created"
    );

    Ok(details)
}

async fn cancel_locked(txn: &DatabaseTransaction, reference: &str) -> AppResult<Cancellation> {
    let booking = booking::Entity::find()
        .filter(booking::Column::Reference.eq(reference))
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", reference)))?;

    if booking.status == BookingStatus::Cancelled {
        return Err(AppError::AlreadyCancelled(reference.to_string()));
    }

    // Counted from what was stored at booking time
    let seats = passenger::Entity::find()
        .filter(passenger::Column::BookingId.eq(booking.id))
        .filter(passenger::Column::Category.ne(PassengerCategory::Infant))
        .count(txn)
        .await? as i32;

    let departure_id = booking.departure_id;
    let mut active: booking::ActiveModel = booking.into();
    active.status = Set(BookingStatus::Cancelled);
    active.update(txn).await?;

    capacity::restore(txn, departure_id, seats).await?;

    Ok(Cancellation {
        reference: reference.to_string(),
        seats_restored: seats,
    })
}

/// Cancel a confirmed booking and hand its seats back. Cancelling twice
/// yields [`AppError::AlreadyCancelled`] and changes nothing.
pub async fn cancel_booking(
    db: &DatabaseConnection,
    reference: &str,
    lock_timeout: Duration,
) -> AppResult<Cancellation> {
    let cancellation = within_lock_timeout(
        lock_timeout,
        in_transaction(db, |txn| async move {
            let outcome = cancel_locked(&txn, reference).await;
            (txn, outcome)
        }),
    )
    .await?;

    tracing::info!(
        reference = %cancellation.reference,
        seats_restored = cancellation.seats_restored,
        "Booking cancelled"
    );

    Ok(cancellation)
}

// ============ Direct booking ============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainSelection {
    #[default]
    First,
    Last,
    Cheapest,
    Fastest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectBookingRequest {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub time_preference: TimePreference,
    #[serde(default)]
    pub selection: TrainSelection,
    #[serde(default)]
    pub filters: SearchFilters,
    pub passengers: Vec<PassengerRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectBooking {
    pub booking: BookingDetails,
    pub selected: DepartureOffer,
    pub offers_considered: usize,
}

/// Choose one offer from a departure-ordered list. Ties go to the earlier
/// departure.
pub fn select_offer(offers: &[DepartureOffer], selection: TrainSelection) -> Option<&DepartureOffer> {
    match selection {
        TrainSelection::First => offers.first(),
        TrainSelection::Last => offers.last(),
        TrainSelection::Cheapest => offers
            .iter()
            .min_by(|a, b| a.price_per_person.total_cmp(&b.price_per_person)),
        TrainSelection::Fastest => offers.iter().min_by_key(|o| o.duration_minutes),
    }
}

/// Search, pick a departure by `selection`, and book it in one call.
pub async fn book_direct(
    db: &DatabaseConnection,
    request: &DirectBookingRequest,
    now: DateTime<Utc>,
    lock_timeout: Duration,
) -> AppResult<DirectBooking> {
    validate_passengers(&request.passengers)?;

    // Infants travel on a lap, so only seated passengers need free capacity
    let categories: Vec<PassengerCategory> = request
        .passengers
        .iter()
        .map(|p| PassengerCategory::parse(&p.category).unwrap_or(PassengerCategory::Adult))
        .collect();

    let search_request = SearchRequest {
        origin: request.origin.clone(),
        destination: request.destination.clone(),
        date: request.date,
        time_preference: request.time_preference,
        passenger_count: Some(seats_needed(&categories).max(1)),
        filters: request.filters.clone(),
    };
    let offers = within_lock_timeout(
        lock_timeout,
        search::search(db, &search_request, now.date_naive()),
    )
    .await?;

    let selected = select_offer(&offers, request.selection)
        .cloned()
        .ok_or(AppError::NoResults)?;

    let booking = create_booking(
        db,
        &CreateBookingRequest {
            departure_id: selected.departure.id,
            date: request.date,
            passengers: request.passengers.clone(),
        },
        now,
        lock_timeout,
    )
    .await?;

    Ok(DirectBooking {
        booking,
        selected,
        offers_considered: offers.len(),
    })
}
