use crate::schemas::{api_error, ApiError, ApiResponse, AppState, ErrorResponse};
use accounts::login_history;
use accounts::validation::LoginAttempt;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use model::entities::login_history as login_entry;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::{IntoParams, ToSchema};

const DEFAULT_LOGIN_LIMIT: u64 = 20;

/// Query parameters for listing login history
#[derive(Debug, Deserialize, IntoParams)]
pub struct LoginsQuery {
    /// Maximum number of entries to return (default 20)
    pub limit: Option<u64>,
}

/// Request body for closing a session
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct LogoutRequest {
    /// Logout time; defaults to now
    pub at: Option<DateTime<Utc>>,
}

/// Login history entry response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginEntryResponse {
    pub id: i32,
    pub user_id: i32,
    pub login_time: DateTime<Utc>,
    pub ip_address: String,
    pub user_agent: String,
    pub login_successful: bool,
    pub logout_time: Option<DateTime<Utc>>,
    pub session_duration_seconds: Option<i64>,
}

impl From<login_entry::Model> for LoginEntryResponse {
    fn from(model: login_entry::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            login_time: model.login_time,
            ip_address: model.ip_address,
            user_agent: model.user_agent,
            login_successful: model.login_successful,
            logout_time: model.logout_time,
            session_duration_seconds: model.session_duration_seconds,
        }
    }
}

/// Get the most recent login attempts of a user
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/logins",
    tag = "logins",
    params(
        ("user_id" = i32, Path, description = "User ID"),
        LoginsQuery,
    ),
    responses(
        (status = 200, description = "Login history retrieved successfully", body = LoginEntryListApiResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_logins(
    Path(user_id): Path<i32>,
    Query(query): Query<LoginsQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<LoginEntryResponse>>>, ApiError> {
    trace!("Entering get_logins function for user_id: {}", user_id);
    let limit = query.limit.unwrap_or(DEFAULT_LOGIN_LIMIT);

    let entries = login_history::recent(&state.db, user_id, limit)
        .await
        .map_err(api_error)?;

    debug!("Retrieved {} login entries for user {}", entries.len(), user_id);
    let responses: Vec<LoginEntryResponse> = entries.into_iter().map(LoginEntryResponse::from).collect();
    Ok(Json(ApiResponse::ok(responses, "Login history retrieved successfully")))
}

/// Record a login attempt
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/logins",
    tag = "logins",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = LoginAttempt,
    responses(
        (status = 201, description = "Login recorded", body = LoginEntryApiResponse),
        (status = 400, description = "Invalid IP address", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn record_login(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<LoginAttempt>,
) -> Result<(StatusCode, Json<ApiResponse<LoginEntryResponse>>), ApiError> {
    trace!("Entering record_login function for user_id: {}", user_id);

    let entry = login_history::record_login(&state.db, user_id, request)
        .await
        .map_err(api_error)?;

    info!("Login entry {} recorded for user {}", entry.id, user_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(LoginEntryResponse::from(entry), "Login recorded")),
    ))
}

/// Close an open session
#[utoipa::path(
    post,
    path = "/api/v1/logins/{entry_id}/logout",
    tag = "logins",
    params(
        ("entry_id" = i32, Path, description = "Login history entry ID"),
    ),
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Logout recorded", body = LoginEntryApiResponse),
        (status = 404, description = "Login entry not found", body = ErrorResponse),
        (status = 409, description = "Session already closed, failed login, or logout before login", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn record_logout(
    Path(entry_id): Path<i32>,
    State(state): State<AppState>,
    request: Option<Json<LogoutRequest>>,
) -> Result<Json<ApiResponse<LoginEntryResponse>>, ApiError> {
    trace!("Entering record_logout function for entry_id: {}", entry_id);
    let at = request.and_then(|Json(body)| body.at).unwrap_or_else(Utc::now);

    let entry = login_history::record_logout(&state.db, entry_id, at)
        .await
        .map_err(api_error)?;

    info!(
        "Session {} closed after {} seconds",
        entry_id,
        entry.session_duration_seconds.unwrap_or_default()
    );
    Ok(Json(ApiResponse::ok(LoginEntryResponse::from(entry), "Logout recorded")))
}
