//! WebSocket connection loop.
//!
//! Reads client frames and forwards relay events addressed to the
//! socket's user.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{AuthAck, ClientFrame, ServerFrame};
use super::session::RelaySession;
use crate::auth::TokenVerifier;
use crate::domain::{RelayEvent, UserId};

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads frames from the client and answers them.
/// - Forwards events from the [`broadcast::Receiver`] whose recipient is
///   the authenticated user.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<RelayEvent>,
    tokens: TokenVerifier,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut session = RelaySession::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(&text, &mut session, &tokens);
                        if let Some(frame) = reply
                            && ws_tx.send(Message::text(frame.to_json())).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        let frame = ServerFrame::error("binary frames are not supported");
                        if ws_tx.send(Message::text(frame.to_json())).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "ws read failed");
                        break;
                    }
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(event) => {
                        if session.accepts(&event) {
                            let frame = ServerFrame::from(event);
                            if ws_tx.send(Message::text(frame.to_json())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(
                            lagged = n,
                            user_id = ?session.user().map(UserId::as_str),
                            "ws client lagged behind relay bus"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!(user_id = ?session.user().map(UserId::as_str), "ws connection closed");
}

/// Handles a text frame from the client, returning the reply to send.
fn handle_text_message(
    text: &str,
    session: &mut RelaySession,
    tokens: &TokenVerifier,
) -> Option<ServerFrame> {
    let frame = match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) => frame,
        Err(e) => return Some(ServerFrame::error(format!("unrecognized frame: {e}"))),
    };

    match frame {
        ClientFrame::Auth { token } => match tokens.verify(&token) {
            Ok(claims) => {
                let user_id = UserId::new(claims.sub);
                tracing::debug!(user_id = %user_id, "ws socket authenticated");
                session.authenticate(user_id.clone());
                Some(ServerFrame::Authenticated(AuthAck { user_id }))
            }
            Err(e) => Some(ServerFrame::error(e.to_string())),
        },
        ClientFrame::Ping => Some(ServerFrame::Pong),
        ClientFrame::Pong => None,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::auth::Claims;

    fn verifier() -> TokenVerifier {
        TokenVerifier::new("relay-secret")
    }

    #[test]
    fn ping_gets_pong() {
        let mut session = RelaySession::new();
        let reply = handle_text_message(r#"{"type":"ping"}"#, &mut session, &verifier());
        assert_eq!(reply, Some(ServerFrame::Pong));
    }

    #[test]
    fn malformed_frame_gets_error_and_no_tag() {
        let mut session = RelaySession::new();
        let reply = handle_text_message("not json", &mut session, &verifier());
        assert!(matches!(reply, Some(ServerFrame::Error(_))));
        assert!(session.user().is_none());
    }

    #[test]
    fn valid_token_tags_session() {
        let tokens = verifier();
        let Ok(token) = tokens.issue(&Claims::new("alice", Duration::hours(1))) else {
            panic!("issue failed");
        };
        let mut session = RelaySession::new();
        let text = format!(r#"{{"type":"auth","token":"{token}"}}"#);
        let reply = handle_text_message(&text, &mut session, &tokens);
        assert!(matches!(reply, Some(ServerFrame::Authenticated(_))));
        assert_eq!(session.user(), Some(&UserId::new("alice")));
    }

    #[test]
    fn forged_token_is_rejected() {
        let Ok(token) = TokenVerifier::new("other").issue(&Claims::new("mallory", Duration::hours(1)))
        else {
            panic!("issue failed");
        };
        let mut session = RelaySession::new();
        let text = format!(r#"{{"type":"auth","token":"{token}"}}"#);
        let reply = handle_text_message(&text, &mut session, &verifier());
        assert!(matches!(reply, Some(ServerFrame::Error(_))));
        assert!(session.user().is_none());
    }
}
