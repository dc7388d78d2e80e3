pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_users;
mod m20240601_000002_create_vehicles;
mod m20240601_000003_create_customers_and_drivers;
mod m20240601_000004_create_locations;
mod m20240601_000005_create_bookings;
mod m20240601_000006_create_booking_records;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_users::Migration),
            Box::new(m20240601_000002_create_vehicles::Migration),
            Box::new(m20240601_000003_create_customers_and_drivers::Migration),
            Box::new(m20240601_000004_create_locations::Migration),
            Box::new(m20240601_000005_create_bookings::Migration),
            Box::new(m20240601_000006_create_booking_records::Migration),
        ]
    }
}
