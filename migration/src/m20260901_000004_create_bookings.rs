use sea_orm_migration::{prelude::*, schema::*};

use super::m20260901_000003_create_departures::Departure;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(uuid(Booking::Id).primary_key())
                    .col(string_len(Booking::Reference, 32).not_null().unique_key())
                    .col(integer(Booking::DepartureId).not_null())
                    .col(date(Booking::TravelDate).not_null())
                    .col(integer(Booking::PassengerCount).not_null())
                    .col(double(Booking::TotalPrice).not_null())
                    // confirmed | cancelled
                    .col(string_len(Booking::Status, 16).not_null())
                    .col(
                        timestamp_with_time_zone(Booking::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_departure")
                            .from(Booking::Table, Booking::DepartureId)
                            .to(Departure::Table, Departure::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_booking_created_at")
                    .table(Booking::Table)
                    .col(Booking::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Booking {
    Table,
    Id,
    Reference,
    DepartureId,
    TravelDate,
    PassengerCount,
    TotalPrice,
    Status,
    CreatedAt,
}
