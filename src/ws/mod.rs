//! WebSocket layer: the chat relay.
//!
//! The endpoint at `/ws` pushes stored chat messages to their recipients.
//! A socket receives nothing until it authenticates with the same bearer
//! token the REST API accepts; from then on it gets every `new_message`
//! addressed to that user, in the order the messages were stored.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod session;
