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
                    .table(LoginHistory::Table)
                    .if_not_exists()
                    .col(pk_auto(LoginHistory::Id))
                    .col(integer(LoginHistory::UserId))
                    .col(timestamp_with_time_zone(LoginHistory::LoginTime))
                    .col(string_len(LoginHistory::IpAddress, 45))
                    .col(text(LoginHistory::UserAgent).default(""))
                    .col(boolean(LoginHistory::LoginSuccessful).default(true))
                    .col(timestamp_with_time_zone_null(LoginHistory::LogoutTime))
                    .col(big_integer_null(LoginHistory::SessionDurationSeconds))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_login_history_user")
                            .from(LoginHistory::Table, LoginHistory::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_login_history_user_login_time")
                    .table(LoginHistory::Table)
                    .col(LoginHistory::UserId)
                    .col(LoginHistory::LoginTime)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_login_history_login_successful")
                    .table(LoginHistory::Table)
                    .col(LoginHistory::LoginSuccessful)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LoginHistory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LoginHistory {
    #[sea_orm(iden = "login_history")]
    Table,
    Id,
    UserId,
    LoginTime,
    IpAddress,
    UserAgent,
    LoginSuccessful,
    LogoutTime,
    SessionDurationSeconds,
}
