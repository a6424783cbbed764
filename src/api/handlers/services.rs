//! Listing handlers: browse, create, update, delete and per-listing
//! reviews and rating.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{CreateServiceRequest, ListServicesQuery, UpdateServiceRequest};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::{Review, Service, ServiceId, ServiceRating};
use crate::error::{ErrorResponse, HubError};

/// `GET /api/services` — Browse active listings.
///
/// # Errors
///
/// Returns [`HubError::InvalidRequest`] for inverted price bounds.
#[utoipa::path(
    get,
    path = "/api/services",
    tag = "Services",
    summary = "List services",
    description = "Active listings, newest first, filtered by category, free text and price range.",
    params(ListServicesQuery),
    responses(
        (status = 200, description = "Listings", body = Vec<Service>),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
    )
)]
pub async fn list_services(
    State(state): State<AppState>,
    Query(query): Query<ListServicesQuery>,
) -> Result<Json<Vec<Service>>, HubError> {
    Ok(Json(state.catalog.list_services(query.into()).await?))
}

/// `POST /api/services` — Publish a listing.
///
/// # Errors
///
/// Returns [`HubError::InvalidRequest`] for invalid fields and
/// [`HubError::Conflict`] for a taken slug.
#[utoipa::path(
    post,
    path = "/api/services",
    tag = "Services",
    summary = "Create a service",
    description = "Publishes a listing owned by the caller. The slug is derived from the title when omitted.",
    security(("bearer_auth" = [])),
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Listing created", body = Service),
        (status = 400, description = "Invalid listing", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 409, description = "Slug already taken", body = ErrorResponse),
    )
)]
pub async fn create_service(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(req): Json<CreateServiceRequest>,
) -> Result<impl IntoResponse, HubError> {
    let draft = req.into_draft(caller.id.clone());
    let service = state.catalog.create_service(&caller, draft).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

/// `GET /api/services/{id}` — Listing details.
///
/// # Errors
///
/// Returns [`HubError::ServiceNotFound`] for unknown ids.
#[utoipa::path(
    get,
    path = "/api/services/{id}",
    tag = "Services",
    summary = "Get a service",
    params(("id" = String, Path, description = "Service UUID")),
    responses(
        (status = 200, description = "Listing", body = Service),
        (status = 404, description = "Not found", body = ErrorResponse),
    )
)]
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<ServiceId>,
) -> Result<Json<Service>, HubError> {
    Ok(Json(state.catalog.get_service(id).await?))
}

/// `GET /api/services/slug/{slug}` — Listing by URL handle.
///
/// # Errors
///
/// Returns [`HubError::ServiceNotFound`] for unknown slugs.
#[utoipa::path(
    get,
    path = "/api/services/slug/{slug}",
    tag = "Services",
    summary = "Get a service by slug",
    params(("slug" = String, Path, description = "Listing slug")),
    responses(
        (status = 200, description = "Listing", body = Service),
        (status = 404, description = "Not found", body = ErrorResponse),
    )
)]
pub async fn get_service_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Service>, HubError> {
    Ok(Json(state.catalog.get_service_by_slug(&slug).await?))
}

/// `PATCH /api/services/{id}` — Edit a listing.
///
/// # Errors
///
/// Returns [`HubError::Forbidden`] unless the caller is the seller.
#[utoipa::path(
    patch,
    path = "/api/services/{id}",
    tag = "Services",
    summary = "Update a service",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Service UUID")),
    request_body = UpdateServiceRequest,
    responses(
        (status = 200, description = "Updated listing", body = Service),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 403, description = "Not the seller", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
    )
)]
pub async fn update_service(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<ServiceId>,
    Json(req): Json<UpdateServiceRequest>,
) -> Result<Json<Service>, HubError> {
    Ok(Json(state.catalog.update_service(&caller, id, req.into()).await?))
}

/// `DELETE /api/services/{id}` — Deactivate a listing.
///
/// # Errors
///
/// Returns [`HubError::Forbidden`] unless the caller is the seller or an
/// admin.
#[utoipa::path(
    delete,
    path = "/api/services/{id}",
    tag = "Services",
    summary = "Delete a service",
    description = "Soft delete: the listing leaves browse and search but existing orders keep referencing it.",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Service UUID")),
    responses(
        (status = 204, description = "Listing deactivated"),
        (status = 403, description = "Not the seller", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
    )
)]
pub async fn delete_service(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<ServiceId>,
) -> Result<StatusCode, HubError> {
    state.catalog.delete_service(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/services/{id}/reviews` — Public reviews of a listing.
///
/// # Errors
///
/// Returns [`HubError::ServiceNotFound`] for unknown ids.
#[utoipa::path(
    get,
    path = "/api/services/{id}/reviews",
    tag = "Services",
    summary = "List service reviews",
    params(("id" = String, Path, description = "Service UUID")),
    responses(
        (status = 200, description = "Reviews, newest first", body = Vec<Review>),
        (status = 404, description = "Not found", body = ErrorResponse),
    )
)]
pub async fn service_reviews(
    State(state): State<AppState>,
    Path(id): Path<ServiceId>,
) -> Result<Json<Vec<Review>>, HubError> {
    Ok(Json(state.catalog.service_reviews(id).await?))
}

/// `GET /api/services/{id}/rating` — Average rating of a listing.
///
/// # Errors
///
/// Returns [`HubError::ServiceNotFound`] for unknown ids.
#[utoipa::path(
    get,
    path = "/api/services/{id}/rating",
    tag = "Services",
    summary = "Service rating",
    params(("id" = String, Path, description = "Service UUID")),
    responses(
        (status = 200, description = "Average and count", body = ServiceRating),
        (status = 404, description = "Not found", body = ErrorResponse),
    )
)]
pub async fn service_rating(
    State(state): State<AppState>,
    Path(id): Path<ServiceId>,
) -> Result<Json<ServiceRating>, HubError> {
    Ok(Json(state.catalog.service_rating(id).await?))
}

/// `GET /api/my-services` — The caller's listings, including inactive ones.
///
/// # Errors
///
/// Returns [`HubError::Unauthorized`] without a valid token.
#[utoipa::path(
    get,
    path = "/api/my-services",
    tag = "Services",
    summary = "List own services",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's listings", body = Vec<Service>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn my_services(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Vec<Service>>, HubError> {
    Ok(Json(state.catalog.services_by_seller(&caller.id).await?))
}

/// Listing routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/services", get(list_services).post(create_service))
        .route(
            "/services/{id}",
            get(get_service).patch(update_service).delete(delete_service),
        )
        .route("/services/slug/{slug}", get(get_service_by_slug))
        .route("/services/{id}/reviews", get(service_reviews))
        .route("/services/{id}/rating", get(service_rating))
        .route("/my-services", get(my_services))
}
