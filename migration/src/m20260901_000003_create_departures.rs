use sea_orm_migration::{prelude::*, schema::*};

use super::m20260901_000001_create_stations::Station;
use super::m20260901_000002_create_trains::Train;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Departure::Table)
                    .if_not_exists()
                    .col(pk_auto(Departure::Id))
                    .col(integer(Departure::TrainId).not_null())
                    .col(integer(Departure::OriginStationId).not_null())
                    .col(integer(Departure::DestinationStationId).not_null())
                    .col(time(Departure::DepartureTime).not_null())
                    .col(time(Departure::ArrivalTime).not_null())
                    .col(small_integer(Departure::Weekday).not_null())
                    .col(double(Departure::BaseFare).not_null())
                    .col(integer(Departure::RemainingCapacity).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_departure_train")
                            .from(Departure::Table, Departure::TrainId)
                            .to(Train::Table, Train::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_departure_origin_station")
                            .from(Departure::Table, Departure::OriginStationId)
                            .to(Station::Table, Station::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_departure_destination_station")
                            .from(Departure::Table, Departure::DestinationStationId)
                            .to(Station::Table, Station::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_departure_route_weekday")
                    .table(Departure::Table)
                    .col(Departure::OriginStationId)
                    .col(Departure::DestinationStationId)
                    .col(Departure::Weekday)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Departure::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Departure {
    Table,
    Id,
    TrainId,
    OriginStationId,
    DestinationStationId,
    DepartureTime,
    ArrivalTime,
    Weekday,
    BaseFare,
    RemainingCapacity,
}
