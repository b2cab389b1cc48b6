use anyhow::{Context, Result};
use sea_orm::Database;

use crate::schemas::AppState;

/// Used when neither `--database-url` nor `DATABASE_URL` is given.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://agrimarket.db?mode=rwc";

/// Used when neither `--bind-address` nor `BIND_ADDRESS` is given.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Loads `.env` into the process environment, if present.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => tracing::trace!("No .env file found"),
        Err(e) => tracing::warn!("Failed to load .env file: {}", e),
    }
}

/// Connect to the database and build the shared application state
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{database_url}'"))?;

    Ok(AppState::new(db))
}
