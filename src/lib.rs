//! # freelance-hub
//!
//! REST API and WebSocket chat relay for a freelance-services marketplace.
//!
//! Sellers publish service listings, buyers place orders on them, both
//! parties chat inside an order, buyers review completed orders and sellers
//! read recomputed statistics. Chat messages are pushed to connected
//! recipients through a thin relay; clients also poll as a fallback.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)        ── AuthUser extractor (auth)
//!     ├── WS Relay (ws/)
//!     │
//!     ├── Catalog / Order / Message / Review / Analytics services (service/)
//!     ├── RelayBus (domain/)
//!     │
//!     └── MarketStore (persistence/)
//!           ├── PostgresStore (sqlx)
//!           └── MemoryStore
//! ```
//!
//! The [`client`] module holds the reconnecting relay consumer used by the
//! `relay-listen` binary.

pub mod api;
pub mod app_state;
pub mod auth;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// Builds the full application: REST API, docs, `/ws` relay and the HTTP
/// middleware stack.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(api::build_router(&state.uploads))
        .route("/ws", get(ws::handler::ws_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
