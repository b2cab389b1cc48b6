use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tracing::{debug, error, info, trace};

pub async fn init_database(database_url: &str) -> Result<()> {
    trace!("Entering init_database function");
    info!("Initializing database");

    connect_and_migrate(database_url).await?;

    info!("Database initialization completed successfully!");
    Ok(())
}

/// Connect to the database and apply every pending migration
pub(crate) async fn connect_and_migrate(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Database URL: {}", database_url);

    trace!("Attempting to connect to database");
    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{database_url}'"))?;
    info!("Successfully connected to database");

    info!("Running database migrations");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run database migrations: {}", e);
        return Err(e.into());
    }
    info!("Database migrations completed successfully");

    Ok(db)
}
