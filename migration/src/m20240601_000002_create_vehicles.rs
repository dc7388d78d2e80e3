use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VehicleCategory::Table)
                    .if_not_exists()
                    .col(pk_auto(VehicleCategory::Id))
                    .col(string_len(VehicleCategory::Name, 100).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VehicleSubCategory::Table)
                    .if_not_exists()
                    .col(pk_auto(VehicleSubCategory::Id))
                    .col(integer(VehicleSubCategory::CategoryId).not_null())
                    .col(string_len(VehicleSubCategory::Name, 100).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sub_category_category")
                            .from(VehicleSubCategory::Table, VehicleSubCategory::CategoryId)
                            .to(VehicleCategory::Table, VehicleCategory::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Vehicle::Table)
                    .if_not_exists()
                    .col(pk_auto(Vehicle::Id))
                    .col(integer(Vehicle::CategoryId).not_null())
                    .col(integer(Vehicle::SubCategoryId).not_null())
                    .col(string_len(Vehicle::VehicleName, 100).not_null())
                    .col(integer(Vehicle::EngineCapacity).not_null())
                    .col(string_len(Vehicle::FuelType, 20).not_null())
                    .col(string_len(Vehicle::Color, 50).not_null())
                    .col(string_len(Vehicle::Make, 100).not_null())
                    .col(string_len(Vehicle::Model, 100).not_null())
                    .col(string_len(Vehicle::Transmission, 20).not_null())
                    .col(decimal_len(Vehicle::PricePerDay, 10, 2).not_null())
                    .col(integer(Vehicle::NoOfSeats).not_null())
                    .col(string_len(Vehicle::InsuranceNo, 100).not_null())
                    .col(date(Vehicle::InsuranceExpiry).not_null())
                    .col(string_len(Vehicle::RegistrationNo, 20).not_null().unique_key())
                    .col(string_len(Vehicle::Vin, 50).not_null().unique_key())
                    .col(text_null(Vehicle::Description))
                    .col(integer(Vehicle::BaseKmPerDay).not_null())
                    .col(decimal_len(Vehicle::ExcessKmCharge, 10, 2).not_null())
                    .col(date(Vehicle::RegistrationExpiry).not_null())
                    .col(decimal_len(Vehicle::DepositAmount, 10, 2).not_null())
                    .col(decimal_len(Vehicle::VatAmount, 10, 2).not_null().default(0))
                    .col(integer(Vehicle::OdometerReading).not_null().default(0))
                    .col(decimal_len(Vehicle::LateFee, 10, 2).not_null())
                    .col(boolean(Vehicle::IsUnderMaintenance).not_null().default(false))
                    .col(
                        string_len(Vehicle::Status, 20)
                            .not_null()
                            .default("available"),
                    )
                    .col(
                        timestamp_with_time_zone(Vehicle::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Vehicle::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_category")
                            .from(Vehicle::Table, Vehicle::CategoryId)
                            .to(VehicleCategory::Table, VehicleCategory::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_sub_category")
                            .from(Vehicle::Table, Vehicle::SubCategoryId)
                            .to(VehicleSubCategory::Table, VehicleSubCategory::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vehicle::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VehicleSubCategory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VehicleCategory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum VehicleCategory {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
pub enum VehicleSubCategory {
    Table,
    Id,
    CategoryId,
    Name,
}

#[derive(DeriveIden)]
pub enum Vehicle {
    Table,
    Id,
    CategoryId,
    SubCategoryId,
    VehicleName,
    EngineCapacity,
    FuelType,
    Color,
    Make,
    Model,
    Transmission,
    PricePerDay,
    NoOfSeats,
    InsuranceNo,
    InsuranceExpiry,
    RegistrationNo,
    Vin,
    Description,
    BaseKmPerDay,
    ExcessKmCharge,
    RegistrationExpiry,
    DepositAmount,
    VatAmount,
    OdometerReading,
    LateFee,
    IsUnderMaintenance,
    Status,
    CreatedAt,
    UpdatedAt,
}
