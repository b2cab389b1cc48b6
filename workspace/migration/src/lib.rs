pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_users_and_profiles;
mod m20240601_000002_create_addresses;
mod m20240601_000003_create_login_history;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_users_and_profiles::Migration),
            Box::new(m20240601_000002_create_addresses::Migration),
            Box::new(m20240601_000003_create_login_history::Migration),
        ]
    }
}
