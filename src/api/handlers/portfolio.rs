//! Portfolio handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::api::dto::CreatePortfolioItemRequest;
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::{PortfolioId, PortfolioItem, UserId};
use crate::error::{ErrorResponse, HubError};

/// `GET /api/users/{id}/portfolio` — A user's public portfolio.
///
/// # Errors
///
/// Returns [`HubError::PersistenceError`] on storage failures.
#[utoipa::path(
    get,
    path = "/api/users/{id}/portfolio",
    tag = "Portfolio",
    summary = "List a user's portfolio",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Public items, newest first", body = Vec<PortfolioItem>),
    )
)]
pub async fn user_portfolio(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Result<Json<Vec<PortfolioItem>>, HubError> {
    Ok(Json(state.catalog.portfolio(&UserId::new(user)).await?))
}

/// `POST /api/portfolio` — Add to the caller's portfolio.
///
/// # Errors
///
/// Returns [`HubError::InvalidRequest`] for a blank title.
#[utoipa::path(
    post,
    path = "/api/portfolio",
    tag = "Portfolio",
    summary = "Add a portfolio item",
    security(("bearer_auth" = [])),
    request_body = CreatePortfolioItemRequest,
    responses(
        (status = 201, description = "Item created", body = PortfolioItem),
        (status = 400, description = "Invalid item", body = ErrorResponse),
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(req): Json<CreatePortfolioItemRequest>,
) -> Result<impl IntoResponse, HubError> {
    let item = state.catalog.add_portfolio_item(&caller, req.into()).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// `DELETE /api/portfolio/{id}` — Remove one of the caller's items.
///
/// # Errors
///
/// Returns [`HubError::Forbidden`] for someone else's item.
#[utoipa::path(
    delete,
    path = "/api/portfolio/{id}",
    tag = "Portfolio",
    summary = "Delete a portfolio item",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Portfolio item UUID")),
    responses(
        (status = 204, description = "Item removed"),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<PortfolioId>,
) -> Result<StatusCode, HubError> {
    state.catalog.remove_portfolio_item(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Portfolio routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/{id}/portfolio", get(user_portfolio))
        .route("/portfolio", post(create_item))
        .route("/portfolio/{id}", delete(delete_item))
}
