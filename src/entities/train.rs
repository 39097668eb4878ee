use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum TrainCategory {
    #[sea_orm(string_value = "express")]
    Express,
    #[sea_orm(string_value = "intercity")]
    Intercity,
    #[sea_orm(string_value = "regional")]
    Regional,
}

impl TrainCategory {
    /// Fare charged per kilometre for one adult.
    pub fn fare_per_km(self) -> f64 {
        match self {
            TrainCategory::Express => 0.25,
            TrainCategory::Intercity => 0.18,
            TrainCategory::Regional => 0.12,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "train")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub number: String,
    pub category: TrainCategory,
    pub has_wifi: bool,
    pub has_catering: bool,
    pub total_seats: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::departure::Entity")]
    Departures,
}

impl Related<super::departure::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Departures.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
