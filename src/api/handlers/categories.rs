//! Category handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::CreateCategoryRequest;
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::Category;
use crate::error::{ErrorResponse, HubError};

/// `GET /api/categories` — Active categories in display order.
///
/// # Errors
///
/// Returns [`HubError::PersistenceError`] on storage failures.
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Categories",
    summary = "List categories",
    responses(
        (status = 200, description = "Categories", body = Vec<Category>),
    )
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, HubError> {
    Ok(Json(state.catalog.categories().await?))
}

/// `POST /api/categories` — Add a category (admin).
///
/// # Errors
///
/// Returns [`HubError::Forbidden`] for non-admins.
#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Categories",
    summary = "Create a category",
    security(("bearer_auth" = [])),
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 409, description = "Slug already taken", body = ErrorResponse),
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, HubError> {
    let category = state.catalog.create_category(&caller, req.into()).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Category routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/categories", get(list_categories).post(create_category))
}
