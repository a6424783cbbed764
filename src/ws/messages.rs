//! Relay wire frames: JSON objects discriminated by `type`.

use serde::{Deserialize, Serialize};

use crate::domain::{ChatMessage, RelayEvent, UserId};

/// Frames a client may send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Tags the socket with the token's user.
    Auth {
        /// Bearer token, as used on the REST API.
        token: String,
    },
    /// Keep-alive; answered with [`ServerFrame::Pong`].
    Ping,
    /// Reply to a server ping. Ignored.
    Pong,
}

/// Payload of [`ServerFrame::Authenticated`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthAck {
    /// User the socket is now tagged with.
    pub user_id: UserId,
}

/// Payload of [`ServerFrame::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Human-readable reason.
    pub message: String,
}

/// Frames the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerFrame {
    /// The auth frame was accepted.
    Authenticated(AuthAck),
    /// Answer to a client ping.
    Pong,
    /// A frame was rejected; the socket stays open.
    Error(ErrorPayload),
    /// A chat message addressed to this socket's user.
    NewMessage(ChatMessage),
}

impl ServerFrame {
    /// Builds an error frame.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            message: message.into(),
        })
    }

    /// Serializes the frame to JSON text.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"type":"error","data":{"message":"encoding failed"}}"#.into())
    }
}

impl From<RelayEvent> for ServerFrame {
    fn from(event: RelayEvent) -> Self {
        match event {
            RelayEvent::NewMessage(msg) => Self::NewMessage(msg),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn client_frames_parse() {
        let Ok(frame) = serde_json::from_str::<ClientFrame>(r#"{"type":"auth","token":"t"}"#)
        else {
            panic!("auth frame rejected");
        };
        assert_eq!(
            frame,
            ClientFrame::Auth {
                token: "t".to_string()
            }
        );
        assert!(matches!(
            serde_json::from_str::<ClientFrame>(r#"{"type":"ping"}"#),
            Ok(ClientFrame::Ping)
        ));
        assert!(serde_json::from_str::<ClientFrame>(r#"{"type":"subscribe"}"#).is_err());
    }

    #[test]
    fn server_frames_shape() {
        assert_eq!(ServerFrame::Pong.to_json(), r#"{"type":"pong"}"#);
        assert_eq!(
            ServerFrame::error("bad").to_json(),
            r#"{"type":"error","data":{"message":"bad"}}"#
        );
        let ack = ServerFrame::Authenticated(AuthAck {
            user_id: UserId::new("u-1"),
        });
        assert_eq!(
            ack.to_json(),
            r#"{"type":"authenticated","data":{"userId":"u-1"}}"#
        );
    }
}
