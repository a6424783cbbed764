//! Per-connection relay session.

use crate::domain::{RelayEvent, UserId};

/// Identity a relay socket is tagged with.
///
/// Sockets start untagged and receive nothing. Authenticating again with
/// another token moves the tag.
#[derive(Debug, Default)]
pub struct RelaySession {
    user: Option<UserId>,
}

impl RelaySession {
    /// Creates an untagged session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags the session with `user`.
    pub fn authenticate(&mut self, user: UserId) {
        self.user = Some(user);
    }

    /// The tagged user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    /// Returns `true` if `event` is addressed to the tagged user.
    #[must_use]
    pub fn accepts(&self, event: &RelayEvent) -> bool {
        self.user.as_ref().is_some_and(|u| u == event.recipient())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{ChatMessage, OrderId};

    fn to(receiver: &str) -> RelayEvent {
        RelayEvent::NewMessage(ChatMessage::new(
            OrderId::new(),
            UserId::new("sender"),
            UserId::new(receiver),
            "hi".to_string(),
            None,
            Utc::now(),
        ))
    }

    #[test]
    fn untagged_accepts_nothing() {
        assert!(!RelaySession::new().accepts(&to("alice")));
    }

    #[test]
    fn tagged_accepts_own_events_only() {
        let mut session = RelaySession::new();
        session.authenticate(UserId::new("alice"));
        assert!(session.accepts(&to("alice")));
        assert!(!session.accepts(&to("bob")));
    }

    #[test]
    fn reauthentication_moves_tag() {
        let mut session = RelaySession::new();
        session.authenticate(UserId::new("alice"));
        session.authenticate(UserId::new("bob"));
        assert_eq!(session.user(), Some(&UserId::new("bob")));
        assert!(!session.accepts(&to("alice")));
    }
}
