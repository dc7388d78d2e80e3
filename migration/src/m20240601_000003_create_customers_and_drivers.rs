use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customer::Table)
                    .if_not_exists()
                    .col(pk_auto(Customer::Id))
                    .col(string_len(Customer::FirstName, 100).not_null())
                    .col(string_len(Customer::LastName, 100).not_null())
                    .col(string_len(Customer::UserName, 100).not_null().unique_key())
                    .col(string_len(Customer::Email, 255).not_null().unique_key())
                    .col(string_len(Customer::ContactNumber, 20).not_null())
                    .col(text(Customer::Address).not_null())
                    .col(string_len(Customer::Nic, 20).not_null().unique_key())
                    .col(string_len_null(Customer::PassportNumber, 20))
                    .col(string_len(Customer::Nationality, 100).not_null())
                    .col(string_len(Customer::Country, 100).not_null())
                    .col(string_len_null(Customer::DrivingLicenceNumber, 20))
                    .col(string_len(Customer::Status, 20).not_null().default("active"))
                    .col(
                        timestamp_with_time_zone(Customer::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Customer::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Driver::Table)
                    .if_not_exists()
                    .col(pk_auto(Driver::Id))
                    .col(string_len(Driver::FirstName, 100).not_null())
                    .col(string_len(Driver::LastName, 100).not_null())
                    .col(string_len(Driver::Email, 255).not_null().unique_key())
                    .col(string_len(Driver::ContactNumber, 20).not_null())
                    .col(string_len(Driver::Nic, 20).not_null().unique_key())
                    .col(string_len_null(Driver::PassportNumber, 20))
                    .col(string_len(Driver::Country, 100).not_null())
                    .col(string_len(Driver::Nationality, 100).not_null())
                    .col(text(Driver::Address).not_null())
                    .col(boolean(Driver::IsAvailable).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(Driver::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Driver::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Driver::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customer::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Customer {
    Table,
    Id,
    FirstName,
    LastName,
    UserName,
    Email,
    ContactNumber,
    Address,
    Nic,
    PassportNumber,
    Nationality,
    Country,
    DrivingLicenceNumber,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Driver {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    ContactNumber,
    Nic,
    PassportNumber,
    Country,
    Nationality,
    Address,
    IsAvailable,
    CreatedAt,
    UpdatedAt,
}
