//! Message read-state handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::CountResponse;
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::MessageId;
use crate::error::{ErrorResponse, HubError};

/// `POST /api/messages/{id}/read` — Mark a received message as read.
///
/// # Errors
///
/// Returns [`HubError::Forbidden`] unless the caller is the receiver.
#[utoipa::path(
    post,
    path = "/api/messages/{id}/read",
    tag = "Messages",
    summary = "Mark a message read",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Message UUID")),
    responses(
        (status = 204, description = "Marked read"),
        (status = 403, description = "Not the receiver", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
    )
)]
pub async fn mark_read(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<MessageId>,
) -> Result<StatusCode, HubError> {
    state.messages.mark_read(&caller.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/messages/unread-count` — Unread messages for the caller.
///
/// # Errors
///
/// Returns [`HubError::Unauthorized`] without a valid token.
#[utoipa::path(
    get,
    path = "/api/messages/unread-count",
    tag = "Messages",
    summary = "Unread message count",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Unread count", body = CountResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn unread_count(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<CountResponse>, HubError> {
    let count = state.messages.unread_count(&caller.id).await?;
    Ok(Json(CountResponse { count }))
}

/// Message routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/messages/{id}/read", post(mark_read))
        .route("/messages/unread-count", get(unread_count))
}
