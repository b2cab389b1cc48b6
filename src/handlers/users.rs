use crate::handlers::profiles::{BuyerProfileResponse, FarmerProfileResponse};
use crate::schemas::{api_error, ApiError, ApiResponse, AppState, ErrorResponse};
use accounts::validation::{NewUser, UserChanges, VerificationDecision};
use accounts::{ProfileSync, RoleProfile};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use model::entities::user::{self, UserType, VerificationStatus};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for listing users
#[derive(Debug, Deserialize, IntoParams)]
pub struct UsersQuery {
    /// Restrict the listing to one role (farmer, buyer, admin, vendor)
    #[param(value_type = Option<String>)]
    pub user_type: Option<UserType>,
}

/// Request body for reviewing an account
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct VerificationRequest {
    pub decision: VerificationDecision,
}

/// User response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    /// Username with the role label, e.g. "ravi (Farmer)"
    pub display_name: String,
    pub user_type: UserType,
    /// Human readable role, e.g. "Vendor/Supplier"
    pub user_type_label: String,
    pub phone_number: String,
    pub profile_picture: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address_line_1: String,
    pub address_line_2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub full_address: String,
    pub is_verified: bool,
    pub verification_status: VerificationStatus,
    pub verification_date: Option<DateTime<Utc>>,
    pub business_name: String,
    pub business_registration_number: String,
    pub tax_id: String,
    pub last_login_ip: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            display_name: model.display_name(),
            full_address: model.full_address(),
            user_type_label: model.user_type.label().to_string(),
            id: model.id,
            username: model.username,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            user_type: model.user_type,
            phone_number: model.phone_number,
            profile_picture: model.profile_picture,
            date_of_birth: model.date_of_birth,
            address_line_1: model.address_line_1,
            address_line_2: model.address_line_2,
            city: model.city,
            state: model.state,
            postal_code: model.postal_code,
            country: model.country,
            is_verified: model.is_verified,
            verification_status: model.verification_status,
            verification_date: model.verification_date,
            business_name: model.business_name,
            business_registration_number: model.business_registration_number,
            tax_id: model.tax_id,
            last_login_ip: model.last_login_ip,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// A freshly created account together with the profile provisioned for it
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedUserResponse {
    pub user: UserResponse,
    /// Present for farmers
    pub farmer_profile: Option<FarmerProfileResponse>,
    /// Present for buyers and vendors
    pub buyer_profile: Option<BuyerProfileResponse>,
}

impl CreatedUserResponse {
    fn new(user: user::Model, profile: Option<RoleProfile>) -> Self {
        let (farmer_profile, buyer_profile) = match profile {
            Some(RoleProfile::Farmer(profile)) => (Some(profile.into()), None),
            Some(RoleProfile::Buyer(profile)) => (None, Some(profile.into())),
            None => (None, None),
        };
        Self {
            user: user.into(),
            farmer_profile,
            buyer_profile,
        }
    }
}

/// Create a new user and provision its role profile
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = NewUser,
    responses(
        (status = 201, description = "User created successfully", body = CreatedUserApiResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Username or phone number already in use", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<NewUser>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedUserResponse>>), ApiError> {
    trace!("Entering create_user function");
    debug!("Creating {:?} user with username: {}", request.user_type, request.username);

    let (user_model, profile) = state.users.create(request).await.map_err(api_error)?;

    info!(
        "User created successfully with ID: {}, username: {}, profile: {}",
        user_model.id,
        user_model.username,
        profile.as_ref().map_or("none", RoleProfile::kind)
    );
    let response = ApiResponse::ok(
        CreatedUserResponse::new(user_model, profile),
        "User created successfully",
    );
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get all users, optionally filtered by role
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    params(UsersQuery),
    responses(
        (status = 200, description = "Users retrieved successfully", body = UserListApiResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_users(
    Query(query): Query<UsersQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, ApiError> {
    trace!("Entering get_users function");
    debug!("Fetching users with role filter: {:?}", query.user_type);

    let users = state.users.list(query.user_type).await.map_err(api_error)?;
    let user_count = users.len();
    let user_responses: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    info!("Successfully retrieved {} users", user_count);
    Ok(Json(ApiResponse::ok(user_responses, "Users retrieved successfully")))
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = UserApiResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    trace!("Entering get_user function for user_id: {}", user_id);

    let user_model = state.users.get(user_id).await.map_err(api_error)?;

    info!("Successfully retrieved user with ID: {}, username: {}", user_model.id, user_model.username);
    Ok(Json(ApiResponse::ok(UserResponse::from(user_model), "User retrieved successfully")))
}

/// Update a user. The role cannot be changed.
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = UserChanges,
    responses(
        (status = 200, description = "User updated successfully", body = UserApiResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Phone number already in use", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UserChanges>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    trace!("Entering update_user function for user_id: {}", user_id);

    let (user_model, sync) = state.users.update(user_id, request).await.map_err(api_error)?;

    let message = match sync {
        ProfileSync::Saved(profile) => {
            debug!("Synced {} profile {}", profile.kind(), profile.id());
            "User updated successfully"
        }
        ProfileSync::NoProfileRequired => "User updated successfully",
        ProfileSync::NotProvisioned => {
            warn!("User {} updated but has no role profile yet", user_id);
            "User updated successfully; role profile not provisioned yet"
        }
    };

    info!("User with ID {} updated successfully", user_id);
    Ok(Json(ApiResponse::ok(UserResponse::from(user_model), message)))
}

/// Delete a user together with its profile, addresses and login history
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User deleted successfully", body = MessageApiResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    trace!("Entering delete_user function for user_id: {}", user_id);

    state.users.delete(user_id).await.map_err(api_error)?;

    info!("User with ID {} deleted successfully", user_id);
    Ok(Json(ApiResponse::ok(format!("User {} deleted", user_id), "User deleted successfully")))
}

/// Record the outcome of a manual account review
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/verification",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = VerificationRequest,
    responses(
        (status = 200, description = "Verification recorded", body = UserApiResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn verify_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<VerificationRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    trace!("Entering verify_user function for user_id: {}", user_id);

    let user_model = state
        .users
        .verify(user_id, request.decision)
        .await
        .map_err(api_error)?;

    info!("User {} verification status is now {:?}", user_id, user_model.verification_status);
    Ok(Json(ApiResponse::ok(UserResponse::from(user_model), "Verification recorded")))
}
