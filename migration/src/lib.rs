pub use sea_orm_migration::prelude::*;

mod m20250105_000001_create_users;
mod m20250105_000002_create_flights;
mod m20250105_000003_create_seats;
mod m20250105_000004_create_bookings;
mod m20250105_000005_create_payments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250105_000001_create_users::Migration),
            Box::new(m20250105_000002_create_flights::Migration),
            Box::new(m20250105_000003_create_seats::Migration),
            Box::new(m20250105_000004_create_bookings::Migration),
            Box::new(m20250105_000005_create_payments::Migration),
        ]
    }
}
