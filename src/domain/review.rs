//! Buyer reviews of completed orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Order, OrderId, ReviewId, ServiceId, UserId};

/// A star rating between 1 and 5 inclusive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(try_from = "i32", into = "i32")]
#[sqlx(transparent)]
#[schema(value_type = i32)]
pub struct Rating(i32);

impl Rating {
    /// Lowest accepted rating.
    pub const MIN: i32 = 1;
    /// Highest accepted rating.
    pub const MAX: i32 = 5;

    /// Validates a raw star count.
    ///
    /// # Errors
    ///
    /// Returns a message when `value` is outside `1..=5`.
    pub fn new(value: i32) -> Result<Self, String> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!("rating must be between 1 and 5, got {value}"))
        }
    }

    /// Returns the star count.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Rating {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for i32 {
    fn from(r: Rating) -> Self {
        r.0
    }
}

/// A review left by the buyer of a completed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Review identifier.
    pub id: ReviewId,
    /// Reviewed order.
    pub order_id: OrderId,
    /// Listing the order was for.
    pub service_id: ServiceId,
    /// Buyer.
    pub reviewer_id: UserId,
    /// Seller.
    pub reviewee_id: UserId,
    /// Star rating.
    #[schema(value_type = i32, minimum = 1, maximum = 5)]
    pub rating: Rating,
    /// Free-text comment.
    pub comment: Option<String>,
    /// Hidden reviews are excluded from listings.
    pub is_public: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Builds a public review of `order` by its buyer.
    #[must_use]
    pub fn for_order(
        order: &Order,
        rating: Rating,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ReviewId::new(),
            order_id: order.id,
            service_id: order.service_id,
            reviewer_id: order.buyer_id.clone(),
            reviewee_id: order.seller_id.clone(),
            rating,
            comment,
            is_public: true,
            created_at: now,
        }
    }
}
