use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Flights::Table)
                    .if_not_exists()
                    .col(pk_auto(Flights::Id))
                    .col(string_len(Flights::FlightNumber, 20).not_null())
                    .col(string_len(Flights::Airline, 100).not_null())
                    .col(string_len(Flights::DepartureCity, 100).not_null())
                    .col(string_len(Flights::ArrivalCity, 100).not_null())
                    .col(timestamp_with_time_zone(Flights::DepartureTime).not_null())
                    .col(timestamp_with_time_zone(Flights::ArrivalTime).not_null())
                    .col(double(Flights::Price).not_null())
                    .col(integer(Flights::TotalSeats).not_null())
                    .col(integer(Flights::AvailableSeats).not_null())
                    .col(timestamp_with_time_zone(Flights::CreatedAt).not_null())
                    .to_owned(),
            )
            .await?;

        // Search filters on the city pair and sorts by departure
        manager
            .create_index(
                Index::create()
                    .name("idx_flights_route_departure")
                    .table(Flights::Table)
                    .col(Flights::DepartureCity)
                    .col(Flights::ArrivalCity)
                    .col(Flights::DepartureTime)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Flights::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Flights {
    Table,
    Id,
    FlightNumber,
    Airline,
    DepartureCity,
    ArrivalCity,
    DepartureTime,
    ArrivalTime,
    Price,
    TotalSeats,
    AvailableSeats,
    CreatedAt,
}
