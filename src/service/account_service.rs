//! Account synchronization with the identity provider.

use std::sync::Arc;

use crate::auth::AuthUser;
use crate::domain::User;
use crate::error::HubError;
use crate::persistence::MarketStore;

/// Keeps the users table in step with token claims.
#[derive(Debug, Clone)]
pub struct AccountService {
    store: Arc<dyn MarketStore>,
}

impl AccountService {
    /// Creates a new `AccountService`.
    #[must_use]
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    /// Upserts the caller's profile from its claims and returns the row.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Conflict`] if the email belongs to another
    /// account, or a persistence error.
    pub async fn sync(&self, caller: &AuthUser) -> Result<User, HubError> {
        let user = self.store.upsert_user(caller.claims.to_upsert()).await?;
        tracing::debug!(user_id = %user.id, "account synchronized");
        Ok(user)
    }
}
