use sea_orm_migration::{prelude::*, schema::*};

use super::m20250105_000001_create_users::Users;
use super::m20250105_000002_create_flights::Flights;
use super::m20250105_000003_create_seats::Seats;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(pk_auto(Bookings::Id))
                    .col(integer(Bookings::UserId).not_null())
                    .col(integer(Bookings::FlightId).not_null())
                    .col(integer(Bookings::SeatId).not_null())
                    .col(string_len(Bookings::BookingReference, 32).not_null().unique_key())
                    .col(double(Bookings::TotalAmount).not_null())
                    .col(string_len(Bookings::PassengerName, 200).not_null())
                    .col(string_len(Bookings::PassengerEmail, 255).not_null())
                    .col(string_len_null(Bookings::PassengerPhone, 30))
                    .col(string_len(Bookings::Status, 20).not_null().default("confirmed"))
                    .col(timestamp_with_time_zone(Bookings::BookingDate).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_user")
                            .from(Bookings::Table, Bookings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_flight")
                            .from(Bookings::Table, Bookings::FlightId)
                            .to(Flights::Table, Flights::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_seat")
                            .from(Bookings::Table, Bookings::SeatId)
                            .to(Seats::Table, Seats::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_user")
                    .table(Bookings::Table)
                    .col(Bookings::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Bookings {
    Table,
    Id,
    UserId,
    FlightId,
    SeatId,
    BookingReference,
    TotalAmount,
    PassengerName,
    PassengerEmail,
    PassengerPhone,
    Status,
    BookingDate,
}
