//! Message service: order-scoped chat and relay fan-out.

use std::sync::Arc;

use chrono::Utc;

use crate::auth::AuthUser;
use crate::domain::{ChatMessage, MessageId, Order, OrderId, RelayBus, RelayEvent, UserId};
use crate::error::HubError;
use crate::persistence::MarketStore;

use super::{ensure_account, require_text};

/// Chat between the two parties of an order.
///
/// Messages are persisted first and then published on the [`RelayBus`].
/// Publishing is best effort: with nobody listening the message is simply
/// picked up by the recipient's next poll.
#[derive(Debug, Clone)]
pub struct MessageService {
    store: Arc<dyn MarketStore>,
    relay: RelayBus,
}

impl MessageService {
    /// Creates a new `MessageService`.
    #[must_use]
    pub fn new(store: Arc<dyn MarketStore>, relay: RelayBus) -> Self {
        Self { store, relay }
    }

    /// Returns a reference to the relay bus.
    #[must_use]
    pub fn relay(&self) -> &RelayBus {
        &self.relay
    }

    /// Conversation of an order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::OrderNotFound`] or [`HubError::Forbidden`] for
    /// outsiders.
    pub async fn list_messages(
        &self,
        caller: &UserId,
        order_id: OrderId,
    ) -> Result<Vec<ChatMessage>, HubError> {
        self.participant_order(caller, order_id).await?;
        self.store.list_messages(order_id).await
    }

    /// Sends a message to the other party of the order.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::OrderNotFound`], [`HubError::Forbidden`] for
    /// outsiders, or [`HubError::InvalidRequest`] for a blank message.
    pub async fn send_message(
        &self,
        caller: &AuthUser,
        order_id: OrderId,
        text: &str,
        attachments: Option<serde_json::Value>,
    ) -> Result<ChatMessage, HubError> {
        let text = require_text("message", text)?;
        let order = self.participant_order(&caller.id, order_id).await?;
        let receiver = order
            .counterpart(&caller.id)
            .cloned()
            .ok_or_else(|| HubError::Forbidden("not a participant of this order".to_string()))?;

        ensure_account(self.store.as_ref(), caller).await?;
        let message = ChatMessage::new(
            order_id,
            caller.id.clone(),
            receiver,
            text,
            attachments,
            Utc::now(),
        );
        let message = self.store.create_message(message).await?;

        let delivered = self.relay.publish(RelayEvent::NewMessage(message.clone()));
        tracing::debug!(
            message_id = %message.id,
            order_id = %order_id,
            receiver_id = %message.receiver_id,
            subscribers = delivered,
            "message relayed"
        );
        Ok(message)
    }

    /// Marks a message as read. Only its receiver may do so; repeating the
    /// call is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::MessageNotFound`] or [`HubError::Forbidden`].
    pub async fn mark_read(&self, caller: &UserId, id: MessageId) -> Result<(), HubError> {
        let message = self
            .store
            .get_message(id)
            .await?
            .ok_or_else(|| HubError::MessageNotFound(*id.as_uuid()))?;
        if &message.receiver_id != caller {
            return Err(HubError::Forbidden(
                "only the receiver may mark a message read".to_string(),
            ));
        }
        if message.is_read {
            return Ok(());
        }
        if !self.store.mark_message_read(id).await? {
            return Err(HubError::MessageNotFound(*id.as_uuid()));
        }
        Ok(())
    }

    /// Unread messages addressed to the caller.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn unread_count(&self, caller: &UserId) -> Result<i64, HubError> {
        self.store.unread_count(caller).await
    }

    async fn participant_order(&self, caller: &UserId, id: OrderId) -> Result<Order, HubError> {
        let order = self
            .store
            .get_order(id)
            .await?
            .ok_or_else(|| HubError::OrderNotFound(*id.as_uuid()))?;
        if !order.is_participant(caller) {
            return Err(HubError::Forbidden("not a participant of this order".to_string()));
        }
        Ok(order)
    }
}
