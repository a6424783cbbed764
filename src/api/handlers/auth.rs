//! Current-user endpoint.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::User;
use crate::error::{ErrorResponse, HubError};

/// `GET /api/auth/user` — Profile of the caller.
///
/// # Errors
///
/// Returns [`HubError::Unauthorized`] without a valid token.
#[utoipa::path(
    get,
    path = "/api/auth/user",
    tag = "Auth",
    summary = "Current user",
    description = "Synchronizes the caller's profile from the token claims and returns the stored row.",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's profile", body = User),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn current_user(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<User>, HubError> {
    Ok(Json(state.accounts.sync(&caller).await?))
}

/// Auth routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/user", get(current_user))
}
