use accounts::{AccountsError, AddressBook, UserService};
use axum::{http::StatusCode, response::Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::{OpenApi, ToSchema};

use crate::handlers::{
    addresses::AddressResponse,
    logins::{LoginEntryResponse, LogoutRequest},
    profiles::{BuyerProfileResponse, FarmerProfileResponse, RecordOrderRequest},
    users::{CreatedUserResponse, UserResponse, VerificationRequest},
};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Account lifecycle service
    pub users: UserService,
    /// Address book service
    pub addresses: AddressBook,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: UserService::new(db.clone()),
            addresses: AddressBook::new(db.clone()),
            db,
        }
    }
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[aliases(
    MessageApiResponse = ApiResponse<String>,
    UserApiResponse = ApiResponse<UserResponse>,
    UserListApiResponse = ApiResponse<Vec<UserResponse>>,
    CreatedUserApiResponse = ApiResponse<CreatedUserResponse>,
    FarmerProfileApiResponse = ApiResponse<FarmerProfileResponse>,
    BuyerProfileApiResponse = ApiResponse<BuyerProfileResponse>,
    AddressApiResponse = ApiResponse<AddressResponse>,
    AddressListApiResponse = ApiResponse<Vec<AddressResponse>>,
    LoginEntryApiResponse = ApiResponse<LoginEntryResponse>,
    LoginEntryListApiResponse = ApiResponse<Vec<LoginEntryResponse>>,
)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Maps a service error onto an HTTP status and error code
pub fn api_error(err: AccountsError) -> ApiError {
    let (status, code) = match &err {
        AccountsError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        AccountsError::DuplicatePhoneNumber(_) => (StatusCode::CONFLICT, "PHONE_NUMBER_ALREADY_EXISTS"),
        AccountsError::DuplicateUsername(_) => (StatusCode::CONFLICT, "USERNAME_ALREADY_EXISTS"),
        AccountsError::DuplicateAddressTitle { .. } => (StatusCode::CONFLICT, "ADDRESS_TITLE_ALREADY_EXISTS"),
        AccountsError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        AccountsError::InvalidLogout(_) => (StatusCode::CONFLICT, "INVALID_LOGOUT"),
        AccountsError::UserNotFound(_) => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
        AccountsError::AddressNotFound(_) => (StatusCode::NOT_FOUND, "ADDRESS_NOT_FOUND"),
        AccountsError::ProfileNotFound { .. } => (StatusCode::NOT_FOUND, "PROFILE_NOT_FOUND"),
        AccountsError::LoginEntryNotFound(_) => (StatusCode::NOT_FOUND, "LOGIN_ENTRY_NOT_FOUND"),
        AccountsError::Picture(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PICTURE_PROCESSING_ERROR"),
        AccountsError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
    };

    // Internal details stay in the logs
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Request failed: {}", err);
        "Internal server error".to_string()
    } else {
        warn!("Request rejected with {}: {}", code, err);
        err.to_string()
    };

    (
        status,
        Json(ErrorResponse {
            error: message,
            code: code.to_string(),
            success: false,
        }),
    )
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::users::create_user,
        crate::handlers::users::get_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::users::verify_user,
        crate::handlers::profiles::get_farmer_profile,
        crate::handlers::profiles::update_farmer_profile,
        crate::handlers::profiles::get_buyer_profile,
        crate::handlers::profiles::update_buyer_profile,
        crate::handlers::profiles::record_order,
        crate::handlers::addresses::get_user_addresses,
        crate::handlers::addresses::create_address,
        crate::handlers::addresses::get_default_address,
        crate::handlers::addresses::get_address,
        crate::handlers::addresses::update_address,
        crate::handlers::addresses::delete_address,
        crate::handlers::addresses::set_default_address,
        crate::handlers::logins::get_logins,
        crate::handlers::logins::record_login,
        crate::handlers::logins::record_logout,
    ),
    components(
        schemas(
            MessageApiResponse,
            UserApiResponse,
            UserListApiResponse,
            CreatedUserApiResponse,
            FarmerProfileApiResponse,
            BuyerProfileApiResponse,
            AddressApiResponse,
            AddressListApiResponse,
            LoginEntryApiResponse,
            LoginEntryListApiResponse,
            ErrorResponse,
            HealthResponse,
            UserResponse,
            CreatedUserResponse,
            VerificationRequest,
            FarmerProfileResponse,
            BuyerProfileResponse,
            RecordOrderRequest,
            AddressResponse,
            LoginEntryResponse,
            LogoutRequest,
            accounts::validation::NewUser,
            accounts::validation::UserChanges,
            accounts::validation::VerificationDecision,
            accounts::validation::NewAddress,
            accounts::validation::AddressChanges,
            accounts::validation::FarmerProfileChanges,
            accounts::validation::BuyerProfileChanges,
            accounts::validation::LoginAttempt,
            model::entities::user::UserType,
            model::entities::user::VerificationStatus,
            model::entities::farmer_profile::FarmingType,
            model::entities::farmer_profile::FarmSize,
            model::entities::buyer_profile::BuyerType,
            model::entities::address::AddressType,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Account management endpoints"),
        (name = "profiles", description = "Farmer and buyer profile endpoints"),
        (name = "addresses", description = "Address book endpoints"),
        (name = "logins", description = "Login history endpoints"),
    ),
    info(
        title = "AgriMarket Accounts API",
        description = "Account, profile and address management for the farmers marketplace",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
