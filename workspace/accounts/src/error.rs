use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use tracing::error;

/// Error types for the accounts module
#[derive(Error, Debug)]
pub enum AccountsError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Input rejected before it reached the database
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Phone number '{0}' is already registered")]
    DuplicatePhoneNumber(String),

    #[error("Username '{0}' already exists")]
    DuplicateUsername(String),

    #[error("User {user_id} already has an address titled '{title}'")]
    DuplicateAddressTitle { user_id: i32, title: String },

    /// A unique constraint fired that no explicit check caught first
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("User {0} not found")]
    UserNotFound(i32),

    #[error("Address {0} not found")]
    AddressNotFound(i32),

    #[error("No {kind} profile exists for user {user_id}")]
    ProfileNotFound { user_id: i32, kind: &'static str },

    #[error("Login history entry {0} not found")]
    LoginEntryNotFound(i32),

    #[error("Invalid logout: {0}")]
    InvalidLogout(String),

    /// Error from the profile picture processor
    #[error("Profile picture error: {0}")]
    Picture(String),
}

impl From<validator::ValidationErrors> for AccountsError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let err = AccountsError::Validation(errors.to_string());
        error!(?err, "Input validation failed");
        err
    }
}

/// Turns a unique-constraint failure into [`AccountsError::Conflict`] and
/// leaves every other database error untouched.
pub(crate) fn map_unique_violation(err: DbErr) -> AccountsError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => {
            error!(%message, "Unique constraint violated");
            AccountsError::Conflict(message)
        }
        _ => AccountsError::Database(err),
    }
}

/// Type alias for Result with AccountsError
pub type Result<T> = std::result::Result<T, AccountsError>;
