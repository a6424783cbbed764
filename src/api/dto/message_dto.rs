//! Chat DTOs.

use serde::Deserialize;
use utoipa::ToSchema;

/// Body of `POST /api/orders/{id}/messages`. The receiver is the other
/// party of the order.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    /// Message text.
    pub message: String,
    /// Uploaded file references.
    pub attachments: Option<serde_json::Value>,
}
