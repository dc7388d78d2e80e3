use sea_orm_migration::{prelude::*, schema::*};

use super::m20240601_000005_create_bookings::Booking;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BookingAddOn::Table)
                    .if_not_exists()
                    .col(pk_auto(BookingAddOn::Id))
                    .col(integer(BookingAddOn::BookingId).not_null())
                    .col(string_len(BookingAddOn::AddOnName, 100).not_null())
                    .col(decimal_len(BookingAddOn::AddOnPrice, 10, 2).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_add_on_booking")
                            .from(BookingAddOn::Table, BookingAddOn::BookingId)
                            .to(Booking::Table, Booking::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One return per booking, enforced by the unique booking_id
        manager
            .create_table(
                Table::create()
                    .table(BookingReturn::Table)
                    .if_not_exists()
                    .col(pk_auto(BookingReturn::Id))
                    .col(integer(BookingReturn::BookingId).not_null().unique_key())
                    .col(date(BookingReturn::ReturnDate).not_null())
                    .col(integer(BookingReturn::FinalOdometerReading).not_null())
                    .col(boolean(BookingReturn::IsDamage).not_null().default(false))
                    .col(text_null(BookingReturn::DamageNotes))
                    .col(decimal_len(BookingReturn::RefundedDepositAmount, 10, 2).not_null())
                    .col(decimal_len(BookingReturn::TotalAmount, 10, 2).not_null())
                    .col(
                        timestamp_with_time_zone(BookingReturn::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_return_booking")
                            .from(BookingReturn::Table, BookingReturn::BookingId)
                            .to(Booking::Table, Booking::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BookingExtension::Table)
                    .if_not_exists()
                    .col(pk_auto(BookingExtension::Id))
                    .col(integer(BookingExtension::BookingId).not_null())
                    .col(date(BookingExtension::OriginalReturnDate).not_null())
                    .col(date(BookingExtension::ExtendReturnDate).not_null())
                    .col(integer(BookingExtension::NoOfExtendDays).not_null())
                    .col(decimal_len(BookingExtension::Price, 10, 2).not_null())
                    .col(
                        timestamp_with_time_zone(BookingExtension::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_extension_booking")
                            .from(BookingExtension::Table, BookingExtension::BookingId)
                            .to(Booking::Table, Booking::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BookingExtension::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BookingReturn::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BookingAddOn::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum BookingAddOn {
    Table,
    Id,
    BookingId,
    AddOnName,
    AddOnPrice,
}

#[derive(DeriveIden)]
pub enum BookingReturn {
    Table,
    Id,
    BookingId,
    ReturnDate,
    FinalOdometerReading,
    IsDamage,
    DamageNotes,
    RefundedDepositAmount,
    TotalAmount,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum BookingExtension {
    Table,
    Id,
    BookingId,
    OriginalReturnDate,
    ExtendReturnDate,
    NoOfExtendDays,
    Price,
    CreatedAt,
}
