//! Relay client: a reconnecting WebSocket consumer of `/ws`.
//!
//! Used by the `relay-listen` binary and by integration tests. It
//! authenticates with a bearer token, keeps the socket alive with pings and
//! reconnects with capped exponential backoff.

pub mod backoff;
pub mod relay_client;

pub use backoff::{Backoff, ConnectionState, ReconnectPolicy};
pub use relay_client::{RelayClient, RelayClientConfig, RelayClientError};
