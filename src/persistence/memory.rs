//! In-process implementation of [`MarketStore`].
//!
//! All tables live behind one [`tokio::sync::RwLock`]. Reads run
//! concurrently, writes are serialized. Rows are kept in insertion order so
//! that "newest first" listings are stable when timestamps tie.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use super::MarketStore;
use crate::domain::stats::mean_rating;
use crate::domain::{
    Category, ChatMessage, DashboardStats, MessageId, Order, OrderFilter, OrderId, OrderStatus,
    OrderUpdate, PortfolioId, PortfolioItem, Review, SellerStats, Service, ServiceFilter,
    ServiceId, ServiceRating, ServiceUpdate, UpsertUser, User, UserId,
};
use crate::error::HubError;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    services: Vec<Service>,
    orders: Vec<Order>,
    messages: Vec<ChatMessage>,
    reviews: Vec<Review>,
    portfolio: Vec<PortfolioItem>,
    categories: Vec<Category>,
}

/// Memory-backed store with the same observable semantics as
/// [`super::PostgresStore`]. Contents are lost on shutdown.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Applies offset/limit paging to an already ordered iterator.
fn page<T>(rows: impl Iterator<Item = T>, limit: Option<u32>, offset: Option<u32>) -> Vec<T> {
    let skip = offset.map_or(0, |o| o as usize);
    let take = limit.map_or(usize::MAX, |l| l as usize);
    rows.skip(skip).take(take).collect()
}

/// Newest-first ordering: reverse insertion order, then a stable sort on
/// the creation timestamp.
fn newest_first<'a, T: 'a + Clone>(
    rows: impl DoubleEndedIterator<Item = &'a T>,
    created_at: impl Fn(&T) -> chrono::DateTime<Utc>,
) -> Vec<T> {
    let mut out: Vec<T> = rows.rev().cloned().collect();
    out.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    out
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, HubError> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn upsert_user(&self, user: UpsertUser) -> Result<User, HubError> {
        let mut t = self.tables.write().await;
        if let Some(email) = &user.email
            && t
                .users
                .values()
                .any(|u| u.id != user.id && u.email.as_ref() == Some(email))
        {
            return Err(HubError::Conflict(format!("email {email} already in use")));
        }
        let now = Utc::now();
        let row = match t.users.get_mut(&user.id) {
            Some(existing) => {
                existing.apply_upsert(user, now);
                existing.clone()
            }
            None => {
                let row = User::from_upsert(user, now);
                t.users.insert(row.id.clone(), row.clone());
                row
            }
        };
        Ok(row)
    }

    async fn list_services(&self, filter: &ServiceFilter) -> Result<Vec<Service>, HubError> {
        let t = self.tables.read().await;
        let sorted = newest_first(t.services.iter(), |s| s.created_at);
        Ok(page(
            sorted.into_iter().filter(|s| filter.matches(s)),
            filter.limit,
            filter.offset,
        ))
    }

    async fn get_service(&self, id: ServiceId) -> Result<Option<Service>, HubError> {
        let t = self.tables.read().await;
        Ok(t.services.iter().find(|s| s.id == id).cloned())
    }

    async fn get_service_by_slug(&self, slug: &str) -> Result<Option<Service>, HubError> {
        let t = self.tables.read().await;
        Ok(t.services.iter().find(|s| s.slug == slug).cloned())
    }

    async fn create_service(&self, service: Service) -> Result<Service, HubError> {
        let mut t = self.tables.write().await;
        if t.services.iter().any(|s| s.slug == service.slug) {
            return Err(HubError::Conflict(format!(
                "service slug {} already exists",
                service.slug
            )));
        }
        t.services.push(service.clone());
        Ok(service)
    }

    async fn update_service(
        &self,
        id: ServiceId,
        update: ServiceUpdate,
    ) -> Result<Option<Service>, HubError> {
        let mut t = self.tables.write().await;
        let Some(row) = t.services.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        update.apply(row, Utc::now());
        Ok(Some(row.clone()))
    }

    async fn deactivate_service(&self, id: ServiceId) -> Result<bool, HubError> {
        let mut t = self.tables.write().await;
        let Some(row) = t.services.iter_mut().find(|s| s.id == id) else {
            return Ok(false);
        };
        row.is_active = false;
        row.updated_at = Utc::now();
        Ok(true)
    }

    async fn services_by_seller(&self, seller: &UserId) -> Result<Vec<Service>, HubError> {
        let t = self.tables.read().await;
        Ok(newest_first(
            t.services.iter().filter(|s| &s.seller_id == seller),
            |s| s.created_at,
        ))
    }

    async fn recommended_services(&self, limit: u32) -> Result<Vec<Service>, HubError> {
        let t = self.tables.read().await;
        let sorted = newest_first(t.services.iter(), |s| s.created_at);
        Ok(page(
            sorted.into_iter().filter(|s| s.is_active),
            Some(limit),
            None,
        ))
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, HubError> {
        let t = self.tables.read().await;
        let sorted = newest_first(t.orders.iter(), |o| o.created_at);
        Ok(page(
            sorted.into_iter().filter(|o| filter.matches(o)),
            filter.limit,
            filter.offset,
        ))
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, HubError> {
        let t = self.tables.read().await;
        Ok(t.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn create_order(&self, order: Order) -> Result<Order, HubError> {
        let mut t = self.tables.write().await;
        if t.orders.iter().any(|o| o.order_number == order.order_number) {
            return Err(HubError::Conflict(format!(
                "order number {} already exists",
                order.order_number
            )));
        }
        t.orders.push(order.clone());
        Ok(order)
    }

    async fn update_order(
        &self,
        id: OrderId,
        update: OrderUpdate,
    ) -> Result<Option<Order>, HubError> {
        let mut t = self.tables.write().await;
        let Some(row) = t.orders.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };
        update.apply(row, Utc::now());
        Ok(Some(row.clone()))
    }

    async fn list_messages(&self, order: OrderId) -> Result<Vec<ChatMessage>, HubError> {
        let t = self.tables.read().await;
        let mut out: Vec<ChatMessage> = t
            .messages
            .iter()
            .filter(|m| m.order_id == order)
            .cloned()
            .collect();
        out.sort_by_key(|m| m.created_at);
        Ok(out)
    }

    async fn get_message(&self, id: MessageId) -> Result<Option<ChatMessage>, HubError> {
        let t = self.tables.read().await;
        Ok(t.messages.iter().find(|m| m.id == id).cloned())
    }

    async fn create_message(&self, message: ChatMessage) -> Result<ChatMessage, HubError> {
        self.tables.write().await.messages.push(message.clone());
        Ok(message)
    }

    async fn mark_message_read(&self, id: MessageId) -> Result<bool, HubError> {
        let mut t = self.tables.write().await;
        let Some(row) = t.messages.iter_mut().find(|m| m.id == id) else {
            return Ok(false);
        };
        row.is_read = true;
        Ok(true)
    }

    async fn unread_count(&self, user: &UserId) -> Result<i64, HubError> {
        let t = self.tables.read().await;
        let n = t
            .messages
            .iter()
            .filter(|m| &m.receiver_id == user && !m.is_read)
            .count();
        Ok(i64::try_from(n).unwrap_or(i64::MAX))
    }

    async fn list_reviews(
        &self,
        service: Option<ServiceId>,
        reviewee: Option<&UserId>,
    ) -> Result<Vec<Review>, HubError> {
        let t = self.tables.read().await;
        Ok(newest_first(
            t.reviews.iter().filter(|r| {
                r.is_public
                    && service.is_none_or(|s| r.service_id == s)
                    && reviewee.is_none_or(|u| &r.reviewee_id == u)
            }),
            |r| r.created_at,
        ))
    }

    async fn review_for_order(&self, order: OrderId) -> Result<Option<Review>, HubError> {
        let t = self.tables.read().await;
        Ok(t.reviews.iter().find(|r| r.order_id == order).cloned())
    }

    async fn create_review(&self, review: Review) -> Result<Review, HubError> {
        let mut t = self.tables.write().await;
        if t.reviews.iter().any(|r| r.order_id == review.order_id) {
            return Err(HubError::Conflict(format!(
                "order {} already has a review",
                review.order_id
            )));
        }
        t.reviews.push(review.clone());
        Ok(review)
    }

    async fn service_rating(&self, service: ServiceId) -> Result<ServiceRating, HubError> {
        let t = self.tables.read().await;
        let ratings: Vec<i32> = t
            .reviews
            .iter()
            .filter(|r| r.service_id == service)
            .map(|r| r.rating.get())
            .collect();
        Ok(ServiceRating {
            average_rating: mean_rating(&ratings),
            total_reviews: i64::try_from(ratings.len()).unwrap_or(i64::MAX),
        })
    }

    async fn list_portfolio(&self, user: &UserId) -> Result<Vec<PortfolioItem>, HubError> {
        let t = self.tables.read().await;
        Ok(newest_first(
            t.portfolio
                .iter()
                .filter(|p| &p.user_id == user && p.is_public),
            |p| p.created_at,
        ))
    }

    async fn get_portfolio_item(
        &self,
        id: PortfolioId,
    ) -> Result<Option<PortfolioItem>, HubError> {
        let t = self.tables.read().await;
        Ok(t.portfolio.iter().find(|p| p.id == id).cloned())
    }

    async fn create_portfolio_item(
        &self,
        item: PortfolioItem,
    ) -> Result<PortfolioItem, HubError> {
        self.tables.write().await.portfolio.push(item.clone());
        Ok(item)
    }

    async fn delete_portfolio_item(&self, id: PortfolioId) -> Result<bool, HubError> {
        let mut t = self.tables.write().await;
        let before = t.portfolio.len();
        t.portfolio.retain(|p| p.id != id);
        Ok(t.portfolio.len() != before)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, HubError> {
        let t = self.tables.read().await;
        let mut out: Vec<Category> = t.categories.iter().filter(|c| c.is_active).cloned().collect();
        out.sort_by_key(|c| c.sort_order);
        Ok(out)
    }

    async fn create_category(&self, category: Category) -> Result<Category, HubError> {
        let mut t = self.tables.write().await;
        if t.categories.iter().any(|c| c.slug == category.slug) {
            return Err(HubError::Conflict(format!(
                "category slug {} already exists",
                category.slug
            )));
        }
        t.categories.push(category.clone());
        Ok(category)
    }

    async fn seller_stats(&self, seller: &UserId) -> Result<SellerStats, HubError> {
        let t = self.tables.read().await;
        let sold: Vec<&Order> = t.orders.iter().filter(|o| &o.seller_id == seller).collect();
        let ratings: Vec<i32> = t
            .reviews
            .iter()
            .filter(|r| &r.reviewee_id == seller)
            .map(|r| r.rating.get())
            .collect();
        let active = t
            .services
            .iter()
            .filter(|s| &s.seller_id == seller && s.is_active)
            .count();
        Ok(SellerStats {
            total_orders: i64::try_from(sold.len()).unwrap_or(i64::MAX),
            completed_orders: i64::try_from(
                sold.iter()
                    .filter(|o| o.status == OrderStatus::Completed)
                    .count(),
            )
            .unwrap_or(i64::MAX),
            total_earnings: sold.iter().map(|o| o.price).sum::<Decimal>(),
            average_rating: mean_rating(&ratings),
            active_services: i64::try_from(active).unwrap_or(i64::MAX),
        })
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, HubError> {
        let t = self.tables.read().await;
        Ok(DashboardStats {
            total_users: i64::try_from(t.users.len()).unwrap_or(i64::MAX),
            total_services: i64::try_from(t.services.len()).unwrap_or(i64::MAX),
            total_orders: i64::try_from(t.orders.len()).unwrap_or(i64::MAX),
            total_revenue: t.orders.iter().map(|o| o.price).sum::<Decimal>(),
        })
    }
}
