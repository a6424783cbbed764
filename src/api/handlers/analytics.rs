//! Analytics handlers. Figures are recomputed on every request.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::{DashboardStats, SellerStats};
use crate::error::{ErrorResponse, HubError};

/// `GET /api/analytics/seller` — The caller's seller statistics.
///
/// # Errors
///
/// Returns [`HubError::Unauthorized`] without a valid token.
#[utoipa::path(
    get,
    path = "/api/analytics/seller",
    tag = "Analytics",
    summary = "Seller statistics",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Seller statistics", body = SellerStats),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn seller_stats(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<SellerStats>, HubError> {
    Ok(Json(state.analytics.seller_stats(&caller.id).await?))
}

/// `GET /api/analytics/dashboard` — Platform totals.
///
/// # Errors
///
/// Returns [`HubError::Unauthorized`] without a valid token.
#[utoipa::path(
    get,
    path = "/api/analytics/dashboard",
    tag = "Analytics",
    summary = "Dashboard statistics",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Platform totals", body = DashboardStats),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    _caller: AuthUser,
) -> Result<Json<DashboardStats>, HubError> {
    Ok(Json(state.analytics.dashboard_stats().await?))
}

/// Analytics routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analytics/seller", get(seller_stats))
        .route("/analytics/dashboard", get(dashboard_stats))
}
