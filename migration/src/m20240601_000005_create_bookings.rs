use sea_orm_migration::{prelude::*, schema::*};

use super::m20240601_000002_create_vehicles::Vehicle;
use super::m20240601_000003_create_customers_and_drivers::{Customer, Driver};
use super::m20240601_000004_create_locations::Location;

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
                    .col(pk_auto(Booking::Id))
                    .col(timestamp_with_time_zone(Booking::BookingDate).not_null())
                    .col(timestamp_with_time_zone(Booking::ReturnDate).not_null())
                    .col(integer(Booking::PickupLocationId).not_null())
                    .col(integer(Booking::DropoffLocationId).not_null())
                    .col(integer(Booking::StartingOdometerReading).not_null())
                    .col(
                        boolean(Booking::IsReturnToSameLocation)
                            .not_null()
                            .default(false),
                    )
                    .col(integer(Booking::CustomerId).not_null())
                    .col(integer(Booking::VehicleId).not_null())
                    .col(string_len(Booking::DrivingType, 20).not_null())
                    .col(integer_null(Booking::DriverId))
                    .col(integer(Booking::NoOfPassengers).not_null())
                    .col(string_len(Booking::FuelResponsibility, 20).not_null())
                    .col(decimal_len(Booking::DepositedAmount, 10, 2).not_null())
                    .col(boolean(Booking::IsVatApplicable).not_null().default(false))
                    .col(string_len(Booking::InsuranceType, 20).not_null())
                    .col(decimal_len_null(Booking::InsuranceValue, 10, 2))
                    .col(string_len_null(Booking::DiscountType, 20))
                    .col(decimal_len_null(Booking::Discount, 10, 2))
                    .col(decimal_len(Booking::TotalAmount, 10, 2).not_null())
                    .col(string_len(Booking::Status, 20).not_null().default("pending"))
                    .col(
                        timestamp_with_time_zone(Booking::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Booking::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_pickup_location")
                            .from(Booking::Table, Booking::PickupLocationId)
                            .to(Location::Table, Location::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_dropoff_location")
                            .from(Booking::Table, Booking::DropoffLocationId)
                            .to(Location::Table, Location::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_customer")
                            .from(Booking::Table, Booking::CustomerId)
                            .to(Customer::Table, Customer::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_vehicle")
                            .from(Booking::Table, Booking::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_driver")
                            .from(Booking::Table, Booking::DriverId)
                            .to(Driver::Table, Driver::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Availability lookups always filter by vehicle and status
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_vehicle_status")
                    .table(Booking::Table)
                    .col(Booking::VehicleId)
                    .col(Booking::Status)
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
    BookingDate,
    ReturnDate,
    PickupLocationId,
    DropoffLocationId,
    StartingOdometerReading,
    IsReturnToSameLocation,
    CustomerId,
    VehicleId,
    DrivingType,
    DriverId,
    NoOfPassengers,
    FuelResponsibility,
    DepositedAmount,
    IsVatApplicable,
    InsuranceType,
    InsuranceValue,
    DiscountType,
    Discount,
    TotalAmount,
    Status,
    CreatedAt,
    UpdatedAt,
}
