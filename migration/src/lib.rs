pub use sea_orm_migration::prelude::*;

mod m20260901_000001_create_stations;
mod m20260901_000002_create_trains;
mod m20260901_000003_create_departures;
mod m20260901_000004_create_bookings;
mod m20260901_000005_create_passengers;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260901_000001_create_stations::Migration),
            Box::new(m20260901_000002_create_trains::Migration),
            Box::new(m20260901_000003_create_departures::Migration),
            Box::new(m20260901_000004_create_bookings::Migration),
            Box::new(m20260901_000005_create_passengers::Migration),
        ]
    }
}
