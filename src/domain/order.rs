//! Orders and their status lifecycle.
//!
//! ```text
//! pending ──► in_progress ──► completed
//!    │            │  ▲
//!    │            ▼  │
//!    │         revision ──► completed
//!    │            │
//!    └────────────┴──────► cancelled
//! ```
//!
//! `completed` and `cancelled` are terminal.

use std::fmt;

use chrono::{DateTime, Datelike, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{OrderId, Service, ServiceId, UserId};

/// Order status.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, not yet started by the seller.
    #[default]
    Pending,
    /// Seller is working on it.
    InProgress,
    /// Buyer asked for changes.
    Revision,
    /// Delivered and accepted.
    Completed,
    /// Abandoned.
    Cancelled,
}

impl OrderStatus {
    /// Returns `true` if the lifecycle allows moving from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InProgress | Self::Cancelled)
                | (
                    Self::InProgress,
                    Self::Revision | Self::Completed | Self::Cancelled
                )
                | (
                    Self::Revision,
                    Self::InProgress | Self::Completed | Self::Cancelled
                )
        )
    }

    /// Returns `true` for `completed` and `cancelled`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Revision => "revision",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "revision" => Ok(Self::Revision),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// Payment status of an order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Not yet paid.
    #[default]
    Pending,
    /// Funds captured.
    Paid,
    /// Charge failed.
    Failed,
    /// Funds returned.
    Refunded,
}

/// Order priority.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "priority", rename_all = "snake_case")]
pub enum Priority {
    /// Default queueing.
    #[default]
    Normal,
    /// Expedited.
    Urgent,
}

/// A buyer's purchase of a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order identifier.
    pub id: OrderId,
    /// Human-facing number, `ALP-<year>-<6 digits>`.
    pub order_number: String,
    /// Purchasing user.
    pub buyer_id: UserId,
    /// Purchased listing.
    pub service_id: ServiceId,
    /// Listing owner at purchase time.
    pub seller_id: UserId,
    /// Listing title at purchase time.
    pub title: String,
    /// Buyer's brief.
    pub description: Option<String>,
    /// Listing price at purchase time.
    pub price: Decimal,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Payment status.
    pub payment_status: PaymentStatus,
    /// Payment method label.
    pub payment_method: Option<String>,
    /// Expected delivery.
    pub due_date: Option<DateTime<Utc>>,
    /// Priority.
    pub priority: Priority,
    /// Answers to the listing's requirement form.
    pub requirements: Option<serde_json::Value>,
    /// Delivered files.
    pub deliverables: Option<serde_json::Value>,
    /// Seller's notes.
    pub seller_notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Buyer-supplied fields when placing an order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderRequest {
    /// Buyer's brief.
    pub description: Option<String>,
    /// Requirement answers.
    pub requirements: Option<serde_json::Value>,
    /// Priority.
    pub priority: Priority,
    /// Payment method label.
    pub payment_method: Option<String>,
}

impl Order {
    /// Builds a pending order for `buyer` from the listing's current terms.
    ///
    /// Returns `None` when the listing's delivery time pushes the due date
    /// past the representable range.
    #[must_use]
    pub fn place(
        service: &Service,
        buyer: UserId,
        req: OrderRequest,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let due_date =
            now.checked_add_signed(Duration::try_days(i64::from(service.delivery_time))?)?;
        Some(Self {
            id: OrderId::new(),
            order_number: order_number(now),
            buyer_id: buyer,
            service_id: service.id,
            seller_id: service.seller_id.clone(),
            title: service.title.clone(),
            description: req.description,
            price: service.price,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: req.payment_method,
            due_date: Some(due_date),
            priority: req.priority,
            requirements: req.requirements,
            deliverables: None,
            seller_notes: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns `true` if `user` is the buyer or the seller.
    #[must_use]
    pub fn is_participant(&self, user: &UserId) -> bool {
        &self.buyer_id == user || &self.seller_id == user
    }

    /// Returns the other party of the order, or `None` for outsiders.
    #[must_use]
    pub fn counterpart(&self, user: &UserId) -> Option<&UserId> {
        if &self.buyer_id == user {
            Some(&self.seller_id)
        } else if &self.seller_id == user {
            Some(&self.buyer_id)
        } else {
            None
        }
    }
}

/// Seller-side changes to an order. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderUpdate {
    /// Target status; must be a legal transition.
    pub status: Option<OrderStatus>,
    /// Seller notes.
    pub seller_notes: Option<String>,
    /// Delivered files.
    pub deliverables: Option<serde_json::Value>,
    /// New due date.
    pub due_date: Option<DateTime<Utc>>,
    /// New priority.
    pub priority: Option<Priority>,
}

impl OrderUpdate {
    /// Applies the update in place and bumps `updated_at`.
    ///
    /// The status transition must already have been validated.
    pub fn apply(self, order: &mut Order, now: DateTime<Utc>) {
        if let Some(v) = self.status {
            order.status = v;
        }
        if self.seller_notes.is_some() {
            order.seller_notes = self.seller_notes;
        }
        if self.deliverables.is_some() {
            order.deliverables = self.deliverables;
        }
        if self.due_date.is_some() {
            order.due_date = self.due_date;
        }
        if let Some(v) = self.priority {
            order.priority = v;
        }
        order.updated_at = now;
    }
}

/// Order listing filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    /// Only orders bought by this user.
    pub buyer_id: Option<UserId>,
    /// Only orders sold by this user.
    pub seller_id: Option<UserId>,
    /// Only orders in this status.
    pub status: Option<OrderStatus>,
    /// Page size.
    pub limit: Option<u32>,
    /// Rows to skip.
    pub offset: Option<u32>,
}

impl OrderFilter {
    /// Returns `true` if `order` passes every predicate except paging.
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        self.buyer_id.as_ref().is_none_or(|b| &order.buyer_id == b)
            && self.seller_id.as_ref().is_none_or(|s| &order.seller_id == s)
            && self.status.is_none_or(|s| order.status == s)
    }
}

/// Formats an order number as `ALP-<year>-<last 6 digits of epoch millis>`.
#[must_use]
pub fn order_number(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().rem_euclid(1_000_000);
    format!("ALP-{}-{millis:06}", now.year())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::NewService;
    use chrono::TimeZone;

    fn listing() -> Service {
        NewService {
            title: "Landing page".to_string(),
            slug: "landing-page".to_string(),
            description: "One responsive page".to_string(),
            short_description: None,
            price: Decimal::new(12000, 2),
            delivery_time: 5,
            revisions: 2,
            category: "web".to_string(),
            subcategory: None,
            featured_image: None,
            gallery: vec![],
            requirements: None,
            seller_id: UserId::new("seller"),
        }
        .into_service(Utc::now())
    }

    #[test]
    fn lifecycle_allows_forward_path() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Revision));
        assert!(Revision.can_transition_to(InProgress));
        assert!(Revision.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Completed));
    }

    #[test]
    fn lifecycle_rejects_skips_and_terminal_moves() {
        use OrderStatus::*;
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Revision));
        assert!(!Completed.can_transition_to(InProgress));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!InProgress.can_transition_to(InProgress));
    }

    #[test]
    fn any_open_order_can_be_cancelled() {
        use OrderStatus::*;
        for s in [Pending, InProgress, Revision] {
            assert!(s.can_transition_to(Cancelled));
        }
        assert!(Completed.is_terminal());
        assert!(Cancelled.is_terminal());
    }

    #[test]
    fn status_parses_wire_names() {
        assert_eq!("in_progress".parse::<OrderStatus>(), Ok(OrderStatus::InProgress));
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn order_number_format() {
        let Some(now) = Utc.timestamp_millis_opt(1_717_171_234_567).single() else {
            panic!("valid timestamp");
        };
        assert_eq!(order_number(now), "ALP-2024-234567");
    }

    #[test]
    fn place_copies_listing_terms() {
        let service = listing();
        let now = Utc::now();
        let Some(order) = Order::place(&service, UserId::new("buyer"), OrderRequest::default(), now)
        else {
            panic!("place failed");
        };
        assert_eq!(order.seller_id, service.seller_id);
        assert_eq!(order.price, service.price);
        assert_eq!(order.title, service.title);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.due_date, Some(now + Duration::days(5)));
    }

    #[test]
    fn unrepresentable_due_date_is_refused() {
        let mut service = listing();
        service.delivery_time = i32::MAX;
        let order = Order::place(&service, UserId::new("buyer"), OrderRequest::default(), Utc::now());
        assert!(order.is_none());
    }

    #[test]
    fn counterpart_is_the_other_party() {
        let Some(order) = Order::place(
            &listing(),
            UserId::new("buyer"),
            OrderRequest::default(),
            Utc::now(),
        ) else {
            panic!("place failed");
        };
        assert_eq!(order.counterpart(&UserId::new("buyer")), Some(&UserId::new("seller")));
        assert_eq!(order.counterpart(&UserId::new("seller")), Some(&UserId::new("buyer")));
        assert_eq!(order.counterpart(&UserId::new("stranger")), None);
    }
}
