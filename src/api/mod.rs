//! REST API layer: route handlers, DTOs, OpenAPI document and router
//! composition.
//!
//! Resource endpoints are mounted under `/api`; `/health` and the API
//! documentation live at the root.

pub mod docs;
pub mod dto;
pub mod handlers;

use axum::Router;
#[cfg(not(feature = "swagger-ui"))]
use axum::{Json, routing::get};
use utoipa::OpenApi;

use crate::app_state::{AppState, UploadSettings};

/// Path the OpenAPI JSON is served at.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Builds the complete API router with all REST endpoints.
///
/// `uploads` sizes the request body limit of the upload route.
pub fn build_router(uploads: &UploadSettings) -> Router<AppState> {
    Router::new()
        .nest("/api", handlers::routes(uploads))
        .merge(handlers::system::routes())
        .merge(docs_router())
}

#[cfg(feature = "swagger-ui")]
fn docs_router() -> Router<AppState> {
    Router::new().merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url(OPENAPI_PATH, docs::ApiDoc::openapi()),
    )
}

#[cfg(not(feature = "swagger-ui"))]
fn docs_router() -> Router<AppState> {
    let spec = docs::ApiDoc::openapi();
    Router::new().route(OPENAPI_PATH, get(move || async move { Json(spec) }))
}
