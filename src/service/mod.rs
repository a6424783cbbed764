//! Service layer: business rules over the storage seam.
//!
//! Each service owns an `Arc<dyn MarketStore>` and enforces the rules the
//! schema cannot: who may touch a row, which order transitions are legal,
//! when a review may be left. Handlers stay thin and only translate DTOs.

pub mod account_service;
pub mod analytics_service;
pub mod catalog_service;
pub mod message_service;
pub mod order_service;
pub mod review_service;

use crate::auth::AuthUser;
use crate::domain::User;
use crate::error::HubError;
use crate::persistence::MarketStore;

pub use account_service::AccountService;
pub use analytics_service::AnalyticsService;
pub use catalog_service::CatalogService;
pub use message_service::MessageService;
pub use order_service::{OrderRole, OrderService};
pub use review_service::ReviewService;

/// Upserts the caller's users row from its claims before it is referenced
/// by a new listing, order, message, review or portfolio item.
///
/// # Errors
///
/// Returns [`HubError::Conflict`] if the claimed email belongs to another
/// account, or a persistence error.
pub async fn ensure_account(store: &dyn MarketStore, caller: &AuthUser) -> Result<User, HubError> {
    let user = store.upsert_user(caller.claims.to_upsert()).await?;
    tracing::debug!(user_id = %user.id, "account refreshed from claims");
    Ok(user)
}

/// Rejects blank text and returns it trimmed.
pub(crate) fn require_text(field: &str, value: &str) -> Result<String, HubError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(HubError::InvalidRequest(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}
