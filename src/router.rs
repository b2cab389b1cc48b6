use crate::handlers::{
    addresses::{
        create_address, delete_address, get_address, get_default_address, get_user_addresses,
        set_default_address, update_address,
    },
    health::health_check,
    logins::{get_logins, record_login, record_logout},
    profiles::{
        get_buyer_profile, get_farmer_profile, record_order, update_buyer_profile,
        update_farmer_profile,
    },
    users::{create_user, delete_user, get_user, get_users, update_user, verify_user},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Account routes
        .route("/api/v1/users", post(create_user).get(get_users))
        .route(
            "/api/v1/users/:user_id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/api/v1/users/:user_id/verification", post(verify_user))
        // Role profile routes
        .route(
            "/api/v1/users/:user_id/farmer-profile",
            get(get_farmer_profile).put(update_farmer_profile),
        )
        .route(
            "/api/v1/users/:user_id/buyer-profile",
            get(get_buyer_profile).put(update_buyer_profile),
        )
        .route("/api/v1/users/:user_id/orders", post(record_order))
        // Address book routes
        .route(
            "/api/v1/users/:user_id/addresses",
            get(get_user_addresses).post(create_address),
        )
        .route("/api/v1/users/:user_id/addresses/default", get(get_default_address))
        .route(
            "/api/v1/addresses/:address_id",
            get(get_address).put(update_address).delete(delete_address),
        )
        .route("/api/v1/addresses/:address_id/default", post(set_default_address))
        // Login history routes
        .route(
            "/api/v1/users/:user_id/logins",
            get(get_logins).post(record_login),
        )
        .route("/api/v1/logins/:entry_id/logout", post(record_logout))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
