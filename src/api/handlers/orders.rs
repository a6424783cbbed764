//! Order handlers, including the order-scoped chat and review endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    CreateOrderRequest, CreateReviewRequest, ListOrdersQuery, SendMessageRequest,
    UpdateOrderRequest,
};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::{ChatMessage, Order, OrderId, OrderStatus, Rating, Review};
use crate::error::{ErrorResponse, HubError};
use crate::service::OrderRole;

/// `GET /api/orders` — The caller's orders as buyer or seller.
///
/// # Errors
///
/// Returns [`HubError::InvalidRequest`] for an unknown role or status.
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    summary = "List orders",
    security(("bearer_auth" = [])),
    params(ListOrdersQuery),
    responses(
        (status = 200, description = "Orders, newest first", body = Vec<Order>),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn list_orders(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<Order>>, HubError> {
    let role = query
        .role
        .as_deref()
        .map(str::parse::<OrderRole>)
        .transpose()?
        .unwrap_or_default();
    let status = query
        .status
        .as_deref()
        .map(str::parse::<OrderStatus>)
        .transpose()
        .map_err(HubError::InvalidRequest)?;
    let orders = state
        .orders
        .list_orders(&caller.id, role, status, query.limit, query.offset)
        .await?;
    Ok(Json(orders))
}

/// `POST /api/orders` — Place an order.
///
/// # Errors
///
/// Returns [`HubError::ServiceNotFound`] for unknown or inactive listings.
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    summary = "Place an order",
    description = "Creates a pending order. Title, price and seller are copied from the listing; the due date is its delivery time from now.",
    security(("bearer_auth" = [])),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = Order),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Listing not found", body = ErrorResponse),
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(req): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, HubError> {
    let (service_id, request) = req.into_parts();
    let order = state.orders.place_order(&caller, service_id, request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /api/orders/{id}` — Order details.
///
/// # Errors
///
/// Returns [`HubError::Forbidden`] unless the caller is buyer or seller.
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    summary = "Get an order",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 403, description = "Not a participant", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, HubError> {
    Ok(Json(state.orders.get_order(&caller.id, id).await?))
}

/// `PATCH /api/orders/{id}` — Seller updates status, notes or deliverables.
///
/// # Errors
///
/// Returns [`HubError::InvalidTransition`] for an unreachable status.
#[utoipa::path(
    patch,
    path = "/api/orders/{id}",
    tag = "Orders",
    summary = "Update an order",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Order UUID")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Updated order", body = Order),
        (status = 400, description = "Invalid status transition", body = ErrorResponse),
        (status = 403, description = "Not the seller", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
    )
)]
pub async fn update_order(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<OrderId>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<Json<Order>, HubError> {
    Ok(Json(state.orders.update_order(&caller.id, id, req.into()).await?))
}

/// `GET /api/orders/{id}/messages` — The order's conversation.
///
/// # Errors
///
/// Returns [`HubError::Forbidden`] unless the caller is buyer or seller.
#[utoipa::path(
    get,
    path = "/api/orders/{id}/messages",
    tag = "Messages",
    summary = "List order messages",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Messages, oldest first", body = Vec<ChatMessage>),
        (status = 403, description = "Not a participant", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
    )
)]
pub async fn list_messages(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Vec<ChatMessage>>, HubError> {
    Ok(Json(state.messages.list_messages(&caller.id, id).await?))
}

/// `POST /api/orders/{id}/messages` — Send a message to the other party.
///
/// # Errors
///
/// Returns [`HubError::InvalidRequest`] for a blank message.
#[utoipa::path(
    post,
    path = "/api/orders/{id}/messages",
    tag = "Messages",
    summary = "Send a message",
    description = "Stores the message and pushes it to the receiver's relay sockets.",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Order UUID")),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message stored", body = ChatMessage),
        (status = 400, description = "Blank message", body = ErrorResponse),
        (status = 403, description = "Not a participant", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<OrderId>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, HubError> {
    let message = state
        .messages
        .send_message(&caller, id, &req.message, req.attachments)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// `POST /api/orders/{id}/reviews` — Review a completed order.
///
/// # Errors
///
/// Returns [`HubError::OrderNotCompleted`] or [`HubError::Conflict`] for a
/// second review.
#[utoipa::path(
    post,
    path = "/api/orders/{id}/reviews",
    tag = "Reviews",
    summary = "Review an order",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Order UUID")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review stored", body = Review),
        (status = 400, description = "Bad rating or order not completed", body = ErrorResponse),
        (status = 403, description = "Not the buyer", body = ErrorResponse),
        (status = 409, description = "Already reviewed", body = ErrorResponse),
    )
)]
pub async fn create_review(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<OrderId>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, HubError> {
    let rating = Rating::new(req.rating).map_err(HubError::InvalidRequest)?;
    let review = state
        .reviews
        .create_review(&caller, id, rating, req.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order).patch(update_order))
        .route("/orders/{id}/messages", get(list_messages).post(send_message))
        .route("/orders/{id}/reviews", post(create_review))
}
