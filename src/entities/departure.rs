use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A weekly timetable slot. `remaining_capacity` is only ever changed by
/// `services::capacity` while holding the row lock.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "departure")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub train_id: i32,
    pub origin_station_id: i32,
    pub destination_station_id: i32,
    pub departure_time: Time,
    pub arrival_time: Time,
    /// 0 = Sunday .. 6 = Saturday
    pub weekday: i16,
    pub base_fare: f64,
    pub remaining_capacity: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::train::Entity",
        from = "Column::TrainId",
        to = "super::train::Column::Id"
    )]
    Train,
    #[sea_orm(
        belongs_to = "super::station::Entity",
        from = "Column::OriginStationId",
        to = "super::station::Column::Id"
    )]
    OriginStation,
    #[sea_orm(
        belongs_to = "super::station::Entity",
        from = "Column::DestinationStationId",
        to = "super::station::Column::Id"
    )]
    DestinationStation,
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
}

impl Related<super::train::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Train.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
