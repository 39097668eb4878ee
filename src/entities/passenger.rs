use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum PassengerCategory {
    #[sea_orm(string_value = "adult")]
    Adult,
    #[sea_orm(string_value = "senior")]
    Senior,
    #[sea_orm(string_value = "child")]
    Child,
    #[sea_orm(string_value = "infant")]
    Infant,
}

impl PassengerCategory {
    /// Case-insensitive lookup. Unknown categories are `None`; callers decide
    /// whether to fall back.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "adult" => Some(PassengerCategory::Adult),
            "senior" => Some(PassengerCategory::Senior),
            "child" => Some(PassengerCategory::Child),
            "infant" => Some(PassengerCategory::Infant),
            _ => None,
        }
    }

    /// Infants travel on a lap and take no seat.
    pub fn occupies_seat(self) -> bool {
        self != PassengerCategory::Infant
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "passenger")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub booking_id: Uuid,
    pub position: i32,
    pub name: String,
    pub category: PassengerCategory,
    pub seat_label: Option<String>,
    pub fare: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::booking::Entity",
        from = "Column::BookingId",
        to = "super::booking::Column::Id"
    )]
    Booking,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
