use sea_orm_migration::{prelude::*, schema::*};

use crate::m20240601_000001_create_users_and_profiles::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Addresses::Table)
                    .if_not_exists()
                    .col(pk_auto(Addresses::Id))
                    .col(integer(Addresses::UserId))
                    .col(string_len(Addresses::AddressType, 20))
                    .col(string_len(Addresses::Title, 100))
                    .col(string_len(Addresses::AddressLine1, 255))
                    .col(string_len(Addresses::AddressLine2, 255).default(""))
                    .col(string_len(Addresses::City, 100))
                    .col(string_len(Addresses::State, 100))
                    .col(string_len(Addresses::PostalCode, 20))
                    .col(string_len(Addresses::Country, 100).default("India"))
                    .col(decimal_len_null(Addresses::Latitude, 9, 6))
                    .col(decimal_len_null(Addresses::Longitude, 9, 6))
                    .col(boolean(Addresses::IsDefault).default(false))
                    .col(boolean(Addresses::IsActive).default(true))
                    .col(timestamp_with_time_zone(Addresses::CreatedAt))
                    .col(timestamp_with_time_zone(Addresses::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_addresses_user")
                            .from(Addresses::Table, Addresses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A title names one address within a user's address book
        manager
            .create_index(
                Index::create()
                    .name("idx_addresses_user_title")
                    .table(Addresses::Table)
                    .col(Addresses::UserId)
                    .col(Addresses::Title)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_addresses_user_address_type")
                    .table(Addresses::Table)
                    .col(Addresses::UserId)
                    .col(Addresses::AddressType)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_addresses_is_default")
                    .table(Addresses::Table)
                    .col(Addresses::IsDefault)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_addresses_postal_code")
                    .table(Addresses::Table)
                    .col(Addresses::PostalCode)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Addresses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Addresses {
    Table,
    Id,
    UserId,
    AddressType,
    Title,
    #[sea_orm(iden = "address_line_1")]
    AddressLine1,
    #[sea_orm(iden = "address_line_2")]
    AddressLine2,
    City,
    State,
    PostalCode,
    Country,
    Latitude,
    Longitude,
    IsDefault,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
