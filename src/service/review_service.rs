//! Review service: buyers rate completed orders.

use std::sync::Arc;

use chrono::Utc;

use crate::auth::AuthUser;
use crate::domain::{OrderId, OrderStatus, Rating, Review};
use crate::error::HubError;
use crate::persistence::MarketStore;

use super::ensure_account;

/// Review creation rules.
#[derive(Debug, Clone)]
pub struct ReviewService {
    store: Arc<dyn MarketStore>,
}

impl ReviewService {
    /// Creates a new `ReviewService`.
    #[must_use]
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    /// Leaves the buyer's review on a completed order.
    ///
    /// The listing and the reviewee are taken from the order. The order row
    /// itself is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::OrderNotFound`], [`HubError::Forbidden`] for
    /// anyone but the buyer, [`HubError::OrderNotCompleted`], or
    /// [`HubError::Conflict`] if the order was already reviewed.
    pub async fn create_review(
        &self,
        caller: &AuthUser,
        order_id: OrderId,
        rating: Rating,
        comment: Option<String>,
    ) -> Result<Review, HubError> {
        let order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or_else(|| HubError::OrderNotFound(*order_id.as_uuid()))?;
        if order.buyer_id != caller.id {
            return Err(HubError::Forbidden("only the buyer may review an order".to_string()));
        }
        if order.status != OrderStatus::Completed {
            return Err(HubError::OrderNotCompleted);
        }
        if self.store.review_for_order(order_id).await?.is_some() {
            return Err(HubError::Conflict(format!("order {order_id} already reviewed")));
        }

        ensure_account(self.store.as_ref(), caller).await?;
        let comment = comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let review = Review::for_order(&order, rating, comment, Utc::now());
        let review = self.store.create_review(review).await?;
        tracing::info!(
            review_id = %review.id,
            order_id = %order_id,
            service_id = %review.service_id,
            rating = review.rating.get(),
            "review created"
        );
        Ok(review)
    }
}
