use sea_orm::entity::prelude::*;

use super::user;

/// A single login attempt, kept for security and analytics.
///
/// Entries are append-only. The only later write is closing the session
/// with a logout time and its duration.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "login_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub login_time: DateTimeUtc,
    pub ip_address: String,
    pub user_agent: String,
    pub login_successful: bool,
    pub logout_time: Option<DateTimeUtc>,
    pub session_duration_seconds: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::UserId",
        to = "user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_open(&self) -> bool {
        self.login_successful && self.logout_time.is_none()
    }
}
