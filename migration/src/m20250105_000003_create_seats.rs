use sea_orm_migration::{prelude::*, schema::*};

use super::m20250105_000002_create_flights::Flights;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Seats::Table)
                    .if_not_exists()
                    .col(pk_auto(Seats::Id))
                    .col(integer(Seats::FlightId).not_null())
                    .col(string_len(Seats::SeatNumber, 10).not_null())
                    .col(string_len(Seats::Class, 20).not_null())
                    .col(boolean(Seats::IsAvailable).not_null().default(true))
                    .col(double(Seats::PriceMultiplier).not_null().default(1.0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_seat_flight")
                            .from(Seats::Table, Seats::FlightId)
                            .to(Flights::Table, Flights::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_seats_flight_seat_number")
                    .table(Seats::Table)
                    .col(Seats::FlightId)
                    .col(Seats::SeatNumber)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Seats::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Seats {
    Table,
    Id,
    FlightId,
    SeatNumber,
    Class,
    IsAvailable,
    PriceMultiplier,
}
