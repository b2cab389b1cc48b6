use crate::schemas::{api_error, ApiError, ApiResponse, AppState, ErrorResponse};
use accounts::validation::{AddressChanges, NewAddress};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use model::entities::address::{self, AddressType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;

/// Address response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddressResponse {
    pub id: i32,
    pub user_id: i32,
    pub address_type: AddressType,
    pub title: String,
    pub address_line_1: String,
    pub address_line_2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    /// Non-empty parts joined with ", "
    pub full_address: String,
    #[schema(value_type = Option<String>)]
    pub latitude: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub longitude: Option<Decimal>,
    pub is_default: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<address::Model> for AddressResponse {
    fn from(model: address::Model) -> Self {
        Self {
            full_address: model.full_address(),
            id: model.id,
            user_id: model.user_id,
            address_type: model.address_type,
            title: model.title,
            address_line_1: model.address_line_1,
            address_line_2: model.address_line_2,
            city: model.city,
            state: model.state,
            postal_code: model.postal_code,
            country: model.country,
            latitude: model.latitude,
            longitude: model.longitude,
            is_default: model.is_default,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Get the address book of a user, default address first
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/addresses",
    tag = "addresses",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Addresses retrieved successfully", body = AddressListApiResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_user_addresses(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<AddressResponse>>>, ApiError> {
    trace!("Entering get_user_addresses function for user_id: {}", user_id);

    let addresses = state.addresses.list(user_id).await.map_err(api_error)?;

    debug!("Retrieved {} addresses for user {}", addresses.len(), user_id);
    let responses: Vec<AddressResponse> = addresses.into_iter().map(AddressResponse::from).collect();
    Ok(Json(ApiResponse::ok(responses, "Addresses retrieved successfully")))
}

/// Add an address to a user's address book
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/addresses",
    tag = "addresses",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = NewAddress,
    responses(
        (status = 201, description = "Address created successfully", body = AddressApiResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Address title already used by this user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_address(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<NewAddress>,
) -> Result<(StatusCode, Json<ApiResponse<AddressResponse>>), ApiError> {
    trace!("Entering create_address function for user_id: {}", user_id);
    debug!("Creating address '{}' (default: {})", request.title, request.is_default);

    let created = state.addresses.create(user_id, request).await.map_err(api_error)?;

    info!("Address {} created for user {}", created.id, user_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(AddressResponse::from(created), "Address created successfully")),
    ))
}

/// Get the default address of a user, if any
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/addresses/default",
    tag = "addresses",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Default address retrieved successfully", body = AddressApiResponse),
        (status = 404, description = "User not found or no default address", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_default_address(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AddressResponse>>, ApiError> {
    trace!("Entering get_default_address function for user_id: {}", user_id);

    match state.addresses.default_for(user_id).await.map_err(api_error)? {
        Some(address) => Ok(Json(ApiResponse::ok(
            AddressResponse::from(address),
            "Default address retrieved successfully",
        ))),
        None => {
            debug!("User {} has no default address", user_id);
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("User {} has no default address", user_id),
                    code: "DEFAULT_ADDRESS_NOT_SET".to_string(),
                    success: false,
                }),
            ))
        }
    }
}

/// Get a specific address by ID
#[utoipa::path(
    get,
    path = "/api/v1/addresses/{address_id}",
    tag = "addresses",
    params(
        ("address_id" = i32, Path, description = "Address ID"),
    ),
    responses(
        (status = 200, description = "Address retrieved successfully", body = AddressApiResponse),
        (status = 404, description = "Address not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_address(
    Path(address_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AddressResponse>>, ApiError> {
    trace!("Entering get_address function for address_id: {}", address_id);

    let address = state.addresses.get(address_id).await.map_err(api_error)?;

    Ok(Json(ApiResponse::ok(AddressResponse::from(address), "Address retrieved successfully")))
}

/// Update an address
#[utoipa::path(
    put,
    path = "/api/v1/addresses/{address_id}",
    tag = "addresses",
    params(
        ("address_id" = i32, Path, description = "Address ID"),
    ),
    request_body = AddressChanges,
    responses(
        (status = 200, description = "Address updated successfully", body = AddressApiResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Address not found", body = ErrorResponse),
        (status = 409, description = "Address title already used by this user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_address(
    Path(address_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<AddressChanges>,
) -> Result<Json<ApiResponse<AddressResponse>>, ApiError> {
    trace!("Entering update_address function for address_id: {}", address_id);

    let updated = state.addresses.update(address_id, request).await.map_err(api_error)?;

    info!("Address {} updated successfully", address_id);
    Ok(Json(ApiResponse::ok(AddressResponse::from(updated), "Address updated successfully")))
}

/// Delete an address. No other address becomes the default.
#[utoipa::path(
    delete,
    path = "/api/v1/addresses/{address_id}",
    tag = "addresses",
    params(
        ("address_id" = i32, Path, description = "Address ID"),
    ),
    responses(
        (status = 200, description = "Address deleted successfully", body = MessageApiResponse),
        (status = 404, description = "Address not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_address(
    Path(address_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    trace!("Entering delete_address function for address_id: {}", address_id);

    state.addresses.delete(address_id).await.map_err(api_error)?;

    info!("Address {} deleted successfully", address_id);
    Ok(Json(ApiResponse::ok(
        format!("Address {} deleted", address_id),
        "Address deleted successfully",
    )))
}

/// Make an address its owner's only default
#[utoipa::path(
    post,
    path = "/api/v1/addresses/{address_id}/default",
    tag = "addresses",
    params(
        ("address_id" = i32, Path, description = "Address ID"),
    ),
    responses(
        (status = 200, description = "Default address set", body = AddressApiResponse),
        (status = 404, description = "Address not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn set_default_address(
    Path(address_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AddressResponse>>, ApiError> {
    trace!("Entering set_default_address function for address_id: {}", address_id);

    let address = state.addresses.set_default(address_id).await.map_err(api_error)?;

    info!("Address {} is now the default for user {}", address.id, address.user_id);
    Ok(Json(ApiResponse::ok(AddressResponse::from(address), "Default address set")))
}
