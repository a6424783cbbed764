//! Search and recommendations.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{RecommendedQuery, SearchQuery};
use crate::app_state::AppState;
use crate::domain::Service;
use crate::error::{ErrorResponse, HubError};

/// `GET /api/search` — Text search over active listings.
///
/// # Errors
///
/// Returns [`HubError::InvalidRequest`] when `q` is missing or blank.
#[utoipa::path(
    get,
    path = "/api/search",
    tag = "Discovery",
    summary = "Search services",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching listings", body = Vec<Service>),
        (status = 400, description = "Missing query", body = ErrorResponse),
    )
)]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Service>>, HubError> {
    Ok(Json(state.catalog.search(query.into()).await?))
}

/// `GET /api/recommended` — Newest active listings.
///
/// # Errors
///
/// Returns [`HubError::PersistenceError`] on storage failures.
#[utoipa::path(
    get,
    path = "/api/recommended",
    tag = "Discovery",
    summary = "Recommended services",
    params(RecommendedQuery),
    responses(
        (status = 200, description = "Recommended listings", body = Vec<Service>),
    )
)]
pub async fn recommended(
    State(state): State<AppState>,
    Query(query): Query<RecommendedQuery>,
) -> Result<Json<Vec<Service>>, HubError> {
    Ok(Json(state.catalog.recommended(query.limit).await?))
}

/// Discovery routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(search))
        .route("/recommended", get(recommended))
}
