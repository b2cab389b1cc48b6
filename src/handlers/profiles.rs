use crate::schemas::{api_error, ApiError, ApiResponse, AppState, ErrorResponse};
use accounts::validation::{BuyerProfileChanges, FarmerProfileChanges};
use accounts::{profiles, purchases};
use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use model::entities::buyer_profile::{self, BuyerType};
use model::entities::farmer_profile::{self, FarmSize, FarmingType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;

/// Farmer profile response model. Bank and identity documents are omitted.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FarmerProfileResponse {
    pub id: i32,
    pub user_id: i32,
    pub farm_name: String,
    pub farm_size: FarmSize,
    #[schema(value_type = String)]
    pub farm_size_acres: Decimal,
    pub farming_type: FarmingType,
    pub farming_experience_years: i32,
    pub farm_address: String,
    #[schema(value_type = Option<String>)]
    pub farm_latitude: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub farm_longitude: Option<Decimal>,
    pub organic_certified: bool,
    pub organic_certification_number: String,
    pub organic_certification_expiry: Option<NaiveDate>,
    pub farm_photo: Option<String>,
    #[schema(value_type = String)]
    pub average_rating: Decimal,
    pub total_reviews: i32,
    pub is_active_seller: bool,
    pub subscription_plan: String,
    pub subscription_expiry: Option<DateTime<Utc>>,
    /// Whether the subscription expiry lies in the future
    pub subscription_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<farmer_profile::Model> for FarmerProfileResponse {
    fn from(model: farmer_profile::Model) -> Self {
        Self {
            subscription_active: model.is_subscription_active(Utc::now()),
            id: model.id,
            user_id: model.user_id,
            farm_name: model.farm_name,
            farm_size: model.farm_size,
            farm_size_acres: model.farm_size_acres,
            farming_type: model.farming_type,
            farming_experience_years: model.farming_experience_years,
            farm_address: model.farm_address,
            farm_latitude: model.farm_latitude,
            farm_longitude: model.farm_longitude,
            organic_certified: model.organic_certified,
            organic_certification_number: model.organic_certification_number,
            organic_certification_expiry: model.organic_certification_expiry,
            farm_photo: model.farm_photo,
            average_rating: model.average_rating,
            total_reviews: model.total_reviews,
            is_active_seller: model.is_active_seller,
            subscription_plan: model.subscription_plan,
            subscription_expiry: model.subscription_expiry,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Buyer profile response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BuyerProfileResponse {
    pub id: i32,
    pub user_id: i32,
    pub buyer_type: BuyerType,
    pub buyer_type_label: String,
    pub company_name: String,
    pub gst_number: String,
    pub preferred_delivery_time: String,
    pub special_instructions: String,
    pub total_orders: i32,
    #[schema(value_type = String)]
    pub total_spent: Decimal,
    #[schema(value_type = String)]
    pub average_order_value: Decimal,
    pub loyalty_points: i32,
    pub membership_tier: String,
    pub prefers_organic: bool,
    pub max_delivery_distance: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<buyer_profile::Model> for BuyerProfileResponse {
    fn from(model: buyer_profile::Model) -> Self {
        Self {
            buyer_type_label: model.buyer_type.label().to_string(),
            id: model.id,
            user_id: model.user_id,
            buyer_type: model.buyer_type,
            company_name: model.company_name,
            gst_number: model.gst_number,
            preferred_delivery_time: model.preferred_delivery_time,
            special_instructions: model.special_instructions,
            total_orders: model.total_orders,
            total_spent: model.total_spent,
            average_order_value: model.average_order_value,
            loyalty_points: model.loyalty_points,
            membership_tier: model.membership_tier,
            prefers_organic: model.prefers_organic,
            max_delivery_distance: model.max_delivery_distance,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Request body for recording a completed order
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RecordOrderRequest {
    /// Order total, as a decimal string (e.g. "49.99")
    #[schema(value_type = String)]
    pub amount: Decimal,
}

/// Get the farmer profile of a user
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/farmer-profile",
    tag = "profiles",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Farmer profile retrieved successfully", body = FarmerProfileApiResponse),
        (status = 404, description = "No farmer profile for this user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_farmer_profile(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<FarmerProfileResponse>>, ApiError> {
    trace!("Entering get_farmer_profile function for user_id: {}", user_id);

    let profile = profiles::farmer_profile(&state.db, user_id).await.map_err(api_error)?;

    debug!("Found farmer profile {} for user {}", profile.id, user_id);
    Ok(Json(ApiResponse::ok(
        FarmerProfileResponse::from(profile),
        "Farmer profile retrieved successfully",
    )))
}

/// Update the farmer profile of a user
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}/farmer-profile",
    tag = "profiles",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = FarmerProfileChanges,
    responses(
        (status = 200, description = "Farmer profile updated successfully", body = FarmerProfileApiResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "No farmer profile for this user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_farmer_profile(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<FarmerProfileChanges>,
) -> Result<Json<ApiResponse<FarmerProfileResponse>>, ApiError> {
    trace!("Entering update_farmer_profile function for user_id: {}", user_id);

    let profile = profiles::update_farmer_profile(&state.db, user_id, request)
        .await
        .map_err(api_error)?;

    info!("Farmer profile {} updated for user {}", profile.id, user_id);
    Ok(Json(ApiResponse::ok(
        FarmerProfileResponse::from(profile),
        "Farmer profile updated successfully",
    )))
}

/// Get the buyer profile of a user
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/buyer-profile",
    tag = "profiles",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Buyer profile retrieved successfully", body = BuyerProfileApiResponse),
        (status = 404, description = "No buyer profile for this user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_buyer_profile(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<BuyerProfileResponse>>, ApiError> {
    trace!("Entering get_buyer_profile function for user_id: {}", user_id);

    let profile = profiles::buyer_profile(&state.db, user_id).await.map_err(api_error)?;

    debug!("Found buyer profile {} for user {}", profile.id, user_id);
    Ok(Json(ApiResponse::ok(
        BuyerProfileResponse::from(profile),
        "Buyer profile retrieved successfully",
    )))
}

/// Update the buyer profile of a user
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}/buyer-profile",
    tag = "profiles",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = BuyerProfileChanges,
    responses(
        (status = 200, description = "Buyer profile updated successfully", body = BuyerProfileApiResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "No buyer profile for this user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_buyer_profile(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<BuyerProfileChanges>,
) -> Result<Json<ApiResponse<BuyerProfileResponse>>, ApiError> {
    trace!("Entering update_buyer_profile function for user_id: {}", user_id);

    let profile = profiles::update_buyer_profile(&state.db, user_id, request)
        .await
        .map_err(api_error)?;

    info!("Buyer profile {} updated for user {}", profile.id, user_id);
    Ok(Json(ApiResponse::ok(
        BuyerProfileResponse::from(profile),
        "Buyer profile updated successfully",
    )))
}

/// Fold a completed order into the buyer's purchase statistics
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/orders",
    tag = "profiles",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = RecordOrderRequest,
    responses(
        (status = 200, description = "Order recorded", body = BuyerProfileApiResponse),
        (status = 400, description = "Negative order amount", body = ErrorResponse),
        (status = 404, description = "No buyer profile for this user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn record_order(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<RecordOrderRequest>,
) -> Result<Json<ApiResponse<BuyerProfileResponse>>, ApiError> {
    trace!("Entering record_order function for user_id: {}", user_id);
    debug!("Recording order of {} for user {}", request.amount, user_id);

    let profile = purchases::record_order(&state.db, user_id, request.amount)
        .await
        .map_err(api_error)?;

    info!(
        "Order recorded for user {}: {} orders, {} spent",
        user_id, profile.total_orders, profile.total_spent
    );
    Ok(Json(ApiResponse::ok(BuyerProfileResponse::from(profile), "Order recorded")))
}
