//! Events pushed through the chat relay.
//!
//! The relay only ever carries data that has already been persisted. Each
//! event names exactly one recipient; sockets tagged with any other user
//! ignore it.

use serde::Serialize;

use super::{ChatMessage, UserId};

/// An event routed to a single user's sockets.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RelayEvent {
    /// A chat message was stored for the recipient.
    NewMessage(ChatMessage),
}

impl RelayEvent {
    /// Returns the user whose sockets should receive this event.
    #[must_use]
    pub fn recipient(&self) -> &UserId {
        match self {
            Self::NewMessage(msg) => &msg.receiver_id,
        }
    }

    /// Returns the wire type tag.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::NewMessage(_) => "new_message",
        }
    }
}
