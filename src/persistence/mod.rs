//! Persistence layer: the storage seam and its two implementations.
//!
//! [`MarketStore`] is the only way the service layer touches durable
//! state. [`PostgresStore`] is the production implementation on
//! `sqlx::PgPool`; [`MemoryStore`] keeps the same semantics in process and
//! backs development runs with persistence disabled as well as the tests.
//!
//! Every mutation is a single-row insert or update. Aggregates are
//! recomputed on every call and never cached.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::{
    Category, ChatMessage, DashboardStats, MessageId, Order, OrderFilter, OrderId, OrderUpdate,
    PortfolioId, PortfolioItem, Review, SellerStats, Service, ServiceFilter, ServiceId,
    ServiceRating, ServiceUpdate, UpsertUser, User, UserId,
};
use crate::error::HubError;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Default page size for list queries without an explicit limit.
pub const DEFAULT_LIMIT: u32 = 20;

/// Upper bound on any page size.
pub const MAX_LIMIT: u32 = 100;

/// Clamps a requested page size into `1..=MAX_LIMIT`.
#[must_use]
pub fn clamp_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Storage operations of the marketplace.
///
/// Lookups return `Ok(None)` for missing rows; the service layer turns that
/// into the matching not-found error. Every method fails with
/// [`HubError::PersistenceError`] when the backend is unreachable.
#[allow(clippy::missing_errors_doc)]
#[async_trait]
pub trait MarketStore: std::fmt::Debug + Send + Sync {
    // ── Users ──────────────────────────────────────────────────────────

    /// Fetches a user by id.
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, HubError>;

    /// Inserts the user or refreshes its profile fields.
    async fn upsert_user(&self, user: UpsertUser) -> Result<User, HubError>;

    // ── Services ───────────────────────────────────────────────────────

    /// Lists active services matching `filter`, newest first.
    async fn list_services(&self, filter: &ServiceFilter) -> Result<Vec<Service>, HubError>;

    /// Fetches a service by id regardless of its active flag.
    async fn get_service(&self, id: ServiceId) -> Result<Option<Service>, HubError>;

    /// Fetches a service by slug regardless of its active flag.
    async fn get_service_by_slug(&self, slug: &str) -> Result<Option<Service>, HubError>;

    /// Inserts a service. Fails with [`HubError::Conflict`] on a duplicate slug.
    async fn create_service(&self, service: Service) -> Result<Service, HubError>;

    /// Applies a partial update and returns the new row.
    async fn update_service(
        &self,
        id: ServiceId,
        update: ServiceUpdate,
    ) -> Result<Option<Service>, HubError>;

    /// Soft-deletes a service by clearing its active flag.
    async fn deactivate_service(&self, id: ServiceId) -> Result<bool, HubError>;

    /// Lists every service of a seller, active or not, newest first.
    async fn services_by_seller(&self, seller: &UserId) -> Result<Vec<Service>, HubError>;

    /// Newest active services.
    async fn recommended_services(&self, limit: u32) -> Result<Vec<Service>, HubError>;

    // ── Orders ─────────────────────────────────────────────────────────

    /// Lists orders matching `filter`, newest first.
    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, HubError>;

    /// Fetches an order by id.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, HubError>;

    /// Inserts an order.
    async fn create_order(&self, order: Order) -> Result<Order, HubError>;

    /// Applies a partial update and returns the new row.
    async fn update_order(
        &self,
        id: OrderId,
        update: OrderUpdate,
    ) -> Result<Option<Order>, HubError>;

    // ── Chat ───────────────────────────────────────────────────────────

    /// Lists the messages of an order, oldest first.
    async fn list_messages(&self, order: OrderId) -> Result<Vec<ChatMessage>, HubError>;

    /// Fetches a message by id.
    async fn get_message(&self, id: MessageId) -> Result<Option<ChatMessage>, HubError>;

    /// Inserts a message.
    async fn create_message(&self, message: ChatMessage) -> Result<ChatMessage, HubError>;

    /// Sets the read flag. Returns `false` if the message does not exist.
    async fn mark_message_read(&self, id: MessageId) -> Result<bool, HubError>;

    /// Counts unread messages addressed to `user`.
    async fn unread_count(&self, user: &UserId) -> Result<i64, HubError>;

    // ── Reviews ────────────────────────────────────────────────────────

    /// Lists public reviews, optionally for one service and/or reviewee,
    /// newest first.
    async fn list_reviews(
        &self,
        service: Option<ServiceId>,
        reviewee: Option<&UserId>,
    ) -> Result<Vec<Review>, HubError>;

    /// Fetches the review of an order, if any.
    async fn review_for_order(&self, order: OrderId) -> Result<Option<Review>, HubError>;

    /// Inserts a review. Fails with [`HubError::Conflict`] if the order
    /// already has one.
    async fn create_review(&self, review: Review) -> Result<Review, HubError>;

    /// Average rating and review count of a service.
    async fn service_rating(&self, service: ServiceId) -> Result<ServiceRating, HubError>;

    // ── Portfolio ──────────────────────────────────────────────────────

    /// Lists a user's public portfolio, newest first.
    async fn list_portfolio(&self, user: &UserId) -> Result<Vec<PortfolioItem>, HubError>;

    /// Fetches a portfolio item by id.
    async fn get_portfolio_item(&self, id: PortfolioId)
    -> Result<Option<PortfolioItem>, HubError>;

    /// Inserts a portfolio item.
    async fn create_portfolio_item(&self, item: PortfolioItem)
    -> Result<PortfolioItem, HubError>;

    /// Deletes a portfolio item. Returns `false` if it did not exist.
    async fn delete_portfolio_item(&self, id: PortfolioId) -> Result<bool, HubError>;

    // ── Categories ─────────────────────────────────────────────────────

    /// Lists active categories by ascending sort order.
    async fn list_categories(&self) -> Result<Vec<Category>, HubError>;

    /// Inserts a category. Fails with [`HubError::Conflict`] on a duplicate slug.
    async fn create_category(&self, category: Category) -> Result<Category, HubError>;

    // ── Analytics ──────────────────────────────────────────────────────

    /// Recomputes a seller's statistics.
    async fn seller_stats(&self, seller: &UserId) -> Result<SellerStats, HubError>;

    /// Recomputes platform totals.
    async fn dashboard_stats(&self) -> Result<DashboardStats, HubError>;
}
