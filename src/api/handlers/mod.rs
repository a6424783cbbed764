//! REST endpoint handlers organized by resource.

pub mod analytics;
pub mod auth;
pub mod categories;
pub mod discovery;
pub mod messages;
pub mod orders;
pub mod portfolio;
pub mod services;
pub mod system;
pub mod upload;

use axum::Router;

use crate::app_state::{AppState, UploadSettings};

/// Composes all resource routes under `/api`.
pub fn routes(uploads: &UploadSettings) -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(services::routes())
        .merge(orders::routes())
        .merge(messages::routes())
        .merge(discovery::routes())
        .merge(analytics::routes())
        .merge(categories::routes())
        .merge(portfolio::routes())
        .merge(upload::routes(uploads))
}
