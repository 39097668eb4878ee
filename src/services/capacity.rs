//! Remaining seats per departure.
//!
//! Both operations take the departure row with `SELECT ... FOR UPDATE` on the
//! caller's transaction before touching it, so concurrent reservations against
//! one departure run one after another. Nothing here commits; the caller's
//! transaction decides whether the change sticks.

use sea_orm::{
    sea_query::Expr, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QuerySelect,
};

use crate::entities::departure;
use crate::error::{AppError, AppResult};

async fn lock_departure(
    txn: &DatabaseTransaction,
    departure_id: i32,
) -> AppResult<departure::Model> {
    departure::Entity::find_by_id(departure_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Departure {} not found", departure_id)))
}

/// Take `seats` from the departure, or fail without changing anything.
/// Returns the locked departure as it was before the decrement.
pub async fn reserve(
    txn: &DatabaseTransaction,
    departure_id: i32,
    seats: i32,
) -> AppResult<departure::Model> {
    let departure = lock_departure(txn, departure_id).await?;

    if seats > departure.remaining_capacity {
        return Err(AppError::InsufficientCapacity {
            needed: seats,
            available: departure.remaining_capacity,
        });
    }

    if seats > 0 {
        departure::Entity::update_many()
            .col_expr(
                departure::Column::RemainingCapacity,
                Expr::col(departure::Column::RemainingCapacity).sub(seats),
            )
            .filter(departure::Column::Id.eq(departure_id))
            .exec(txn)
            .await?;
    }

    tracing::debug!(
        departure_id,
        seats,
        remaining = departure.remaining_capacity - seats,
        "Capacity reserved"
    );

    Ok(departure)
}

/// Give `seats` back to the departure. Not capped at the train's size; the
/// caller only restores seats it previously reserved.
pub async fn restore(txn: &DatabaseTransaction, departure_id: i32, seats: i32) -> AppResult<()> {
    let departure = lock_departure(txn, departure_id).await?;

    if seats > 0 {
        departure::Entity::update_many()
            .col_expr(
                departure::Column::RemainingCapacity,
                Expr::col(departure::Column::RemainingCapacity).add(seats),
            )
            .filter(departure::Column::Id.eq(departure_id))
            .exec(txn)
            .await?;
    }

    tracing::debug!(
        departure_id,
        seats,
        remaining = departure.remaining_capacity + seats,
        "Capacity restored"
    );

    Ok(())
}
