//! Aggregates computed on every read.

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

/// Per-seller analytics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerStats {
    /// Orders received, any status.
    pub total_orders: i64,
    /// Orders in `completed`.
    pub completed_orders: i64,
    /// Sum of order prices, any status.
    pub total_earnings: Decimal,
    /// Mean rating received, 0 without reviews.
    pub average_rating: f64,
    /// Listings still active.
    pub active_services: i64,
}

/// Platform-wide totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Known accounts.
    pub total_users: i64,
    /// Listings, active or not.
    pub total_services: i64,
    /// Orders, any status.
    pub total_orders: i64,
    /// Sum of order prices.
    pub total_revenue: Decimal,
}

/// Rating summary of a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRating {
    /// Mean rating, 0 without reviews.
    pub average_rating: f64,
    /// Number of reviews.
    pub total_reviews: i64,
}

/// Mean of a set of star ratings, 0 for an empty set.
#[must_use]
pub fn mean_rating(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = sum as f64 / ratings.len() as f64;
    mean
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_zero() {
        assert!(mean_rating(&[]).abs() < f64::EPSILON);
    }

    #[test]
    fn mean_of_ratings() {
        assert!((mean_rating(&[5, 4, 3]) - 4.0).abs() < f64::EPSILON);
    }
}
