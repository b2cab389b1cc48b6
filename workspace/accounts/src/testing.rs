use std::sync::atomic::{AtomicU64, Ordering};

use migration::{Migrator, MigratorTrait};
use model::entities::user::{self, UserType};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};

use crate::users::UserService;
use crate::validation::NewUser;

pub async fn setup_db() -> Result<DatabaseConnection, DbErr> {
    setup_db_with_foreign_keys(true).await
}

/// In-memory database with SQLite foreign key enforcement switched on or off.
pub async fn setup_db_with_foreign_keys(enabled: bool) -> Result<DatabaseConnection, DbErr> {
    // Connect to the SQLite database
    let db = Database::connect("sqlite::memory:").await?;

    let pragma = if enabled { "ON" } else { "OFF" };
    db.execute_unprepared(&format!("PRAGMA foreign_keys = {pragma};")).await?;

    Migrator::up(&db, None).await.expect("Migrations failed.");
    Ok(db)
}

/// A valid, unique mobile number for every call.
pub fn next_phone_number() -> String {
    static PHONE_SEQ: AtomicU64 = AtomicU64::new(0);

    let current = PHONE_SEQ.fetch_add(1, Ordering::SeqCst);
    format!("98{:08}", current)
}

pub fn signup(username: &str, user_type: UserType) -> NewUser {
    NewUser::new(username, next_phone_number(), user_type)
}

/// Creates an account through the service, so its profile is provisioned too.
pub async fn new_user(db: &DatabaseConnection, username: &str, user_type: UserType) -> user::Model {
    let (user, _) = UserService::new(db.clone())
        .create(signup(username, user_type))
        .await
        .expect("Failed to create test user");
    user
}
