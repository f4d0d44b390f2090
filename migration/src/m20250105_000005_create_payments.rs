use sea_orm_migration::{prelude::*, schema::*};

use super::m20250105_000004_create_bookings::Bookings;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(pk_auto(Payments::Id))
                    // One payment per booking
                    .col(integer(Payments::BookingId).not_null().unique_key())
                    .col(string_len(Payments::PaymentMethod, 30).not_null())
                    .col(string_len(Payments::PaymentStatus, 20).not_null())
                    .col(string_len(Payments::TransactionId, 64).not_null().unique_key())
                    .col(double(Payments::Amount).not_null())
                    .col(timestamp_with_time_zone(Payments::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_booking")
                            .from(Payments::Table, Payments::BookingId)
                            .to(Bookings::Table, Bookings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Payments {
    Table,
    Id,
    BookingId,
    PaymentMethod,
    PaymentStatus,
    TransactionId,
    Amount,
    CreatedAt,
}
