//! Seller and platform analytics. Every call runs fresh aggregates.

use std::sync::Arc;

use crate::domain::{DashboardStats, SellerStats, UserId};
use crate::error::HubError;
use crate::persistence::MarketStore;

/// Read-only aggregate queries.
#[derive(Debug, Clone)]
pub struct AnalyticsService {
    store: Arc<dyn MarketStore>,
}

impl AnalyticsService {
    /// Creates a new `AnalyticsService`.
    #[must_use]
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    /// Statistics of the listings and orders sold by `seller`.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn seller_stats(&self, seller: &UserId) -> Result<SellerStats, HubError> {
        self.store.seller_stats(seller).await
    }

    /// Platform totals.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, HubError> {
        self.store.dashboard_stats().await
    }
}
