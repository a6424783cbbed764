//! Order-scoped chat messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{MessageId, OrderId, UserId};

/// A chat message between the two parties of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Message identifier.
    pub id: MessageId,
    /// Order the conversation belongs to.
    pub order_id: OrderId,
    /// Author.
    pub sender_id: UserId,
    /// The other party of the order.
    pub receiver_id: UserId,
    /// Message body.
    pub message: String,
    /// Attached file descriptors.
    pub attachments: Option<serde_json::Value>,
    /// Set once the receiver has seen it.
    pub is_read: bool,
    /// Creation timestamp; conversation order.
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Builds an unread message.
    #[must_use]
    pub fn new(
        order_id: OrderId,
        sender_id: UserId,
        receiver_id: UserId,
        message: String,
        attachments: Option<serde_json::Value>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            order_id,
            sender_id,
            receiver_id,
            message,
            attachments,
            is_read: false,
            created_at: now,
        }
    }
}
