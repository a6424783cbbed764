//! Order DTOs.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{OrderRequest, OrderStatus, OrderUpdate, Priority, ServiceId};

/// Body of `POST /api/orders`. Price, title and seller come from the
/// listing.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Listing being ordered.
    pub service_id: ServiceId,
    /// Buyer's brief.
    pub description: Option<String>,
    /// Answers to the listing's requirements.
    pub requirements: Option<serde_json::Value>,
    /// Priority (default normal).
    pub priority: Option<Priority>,
    /// Payment method label.
    pub payment_method: Option<String>,
}

impl CreateOrderRequest {
    /// Splits into the listing id and the buyer's request.
    #[must_use]
    pub fn into_parts(self) -> (ServiceId, OrderRequest) {
        (
            self.service_id,
            OrderRequest {
                description: self.description,
                requirements: self.requirements,
                priority: self.priority.unwrap_or_default(),
                payment_method: self.payment_method,
            },
        )
    }
}

/// Query of `GET /api/orders`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersQuery {
    /// `buyer` (default) or `seller`.
    pub role: Option<String>,
    /// Status filter, e.g. `in_progress`.
    pub status: Option<String>,
    /// Page size (default 20, max 100).
    pub limit: Option<u32>,
    /// Rows to skip.
    pub offset: Option<u32>,
}

/// Body of `PATCH /api/orders/{id}`. Omitted fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    /// Next lifecycle status.
    pub status: Option<OrderStatus>,
    /// Seller's notes.
    pub seller_notes: Option<String>,
    /// Delivered files.
    pub deliverables: Option<serde_json::Value>,
    /// New due date.
    pub due_date: Option<DateTime<Utc>>,
    /// New priority.
    pub priority: Option<Priority>,
}

impl From<UpdateOrderRequest> for OrderUpdate {
    fn from(r: UpdateOrderRequest) -> Self {
        Self {
            status: r.status,
            seller_notes: r.seller_notes,
            deliverables: r.deliverables,
            due_date: r.due_date,
            priority: r.priority,
        }
    }
}

/// Body of `POST /api/orders/{id}/reviews`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    /// Stars, 1 to 5.
    #[schema(minimum = 1, maximum = 5)]
    pub rating: i32,
    /// Optional comment.
    pub comment: Option<String>,
}
