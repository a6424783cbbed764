//! PostgreSQL implementation of [`MarketStore`].

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;

use super::MarketStore;
use crate::config::HubConfig;
use crate::domain::{
    Category, ChatMessage, DashboardStats, MessageId, Order, OrderFilter, OrderId, OrderStatus,
    OrderUpdate, PortfolioId, PortfolioItem, Review, SellerStats, Service, ServiceFilter,
    ServiceId, ServiceRating, ServiceUpdate, UpsertUser, User, UserId,
};
use crate::error::HubError;

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, profile_image_url, role, status, created_at, updated_at";

const SERVICE_COLUMNS: &str = "id, title, slug, description, short_description, price, \
     delivery_time, revisions, category, subcategory, is_active, featured_image, gallery, \
     requirements, seller_id, created_at, updated_at";

const ORDER_COLUMNS: &str = "id, order_number, buyer_id, service_id, seller_id, title, \
     description, price, status, payment_status, payment_method, due_date, priority, \
     requirements, deliverables, seller_notes, created_at, updated_at";

const MESSAGE_COLUMNS: &str =
    "id, order_id, sender_id, receiver_id, message, attachments, is_read, created_at";

const REVIEW_COLUMNS: &str = "id, order_id, service_id, reviewer_id, reviewee_id, rating, \
     comment, is_public, created_at";

const PORTFOLIO_COLUMNS: &str = "id, user_id, title, description, images, project_url, \
     category, tags, is_public, created_at";

const CATEGORY_COLUMNS: &str =
    "id, name, slug, description, icon, parent_id, is_active, sort_order";

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::PersistenceError`] if the database is unreachable.
    pub async fn connect(config: &HubConfig) -> Result<Self, HubError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations under `migrations/`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::PersistenceError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), HubError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| HubError::PersistenceError(e.to_string()))
    }
}

/// `ILIKE` pattern matching `term` as a literal substring.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn to_i64(v: Option<u32>) -> Option<i64> {
    v.map(i64::from)
}

#[async_trait]
impl MarketStore for PostgresStore {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, HubError> {
        let row = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn upsert_user(&self, user: UpsertUser) -> Result<User, HubError> {
        let row = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, first_name, last_name, email, profile_image_url, role) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (id) DO UPDATE SET \
                first_name = EXCLUDED.first_name, \
                last_name = EXCLUDED.last_name, \
                email = EXCLUDED.email, \
                profile_image_url = EXCLUDED.profile_image_url, \
                role = EXCLUDED.role, \
                updated_at = now() \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.profile_image_url)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_services(&self, filter: &ServiceFilter) -> Result<Vec<Service>, HubError> {
        let pattern = filter.search.as_deref().map(contains_pattern);
        let rows = sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services \
             WHERE is_active \
               AND ($1::text IS NULL OR category = $1) \
               AND ($2::text IS NULL \
                    OR title ILIKE $2 ESCAPE '\\' \
                    OR description ILIKE $2 ESCAPE '\\' \
                    OR category ILIKE $2 ESCAPE '\\') \
               AND ($3::numeric IS NULL OR price >= $3) \
               AND ($4::numeric IS NULL OR price <= $4) \
             ORDER BY created_at DESC \
             LIMIT $5 OFFSET COALESCE($6, 0)"
        ))
        .bind(&filter.category)
        .bind(pattern)
        .bind(filter.min_price)
        .bind(filter.max_price)
        .bind(to_i64(filter.limit))
        .bind(to_i64(filter.offset))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_service(&self, id: ServiceId) -> Result<Option<Service>, HubError> {
        let row = sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_service_by_slug(&self, slug: &str) -> Result<Option<Service>, HubError> {
        let row = sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_service(&self, service: Service) -> Result<Service, HubError> {
        let row = sqlx::query_as::<_, Service>(&format!(
            "INSERT INTO services ({SERVICE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             RETURNING {SERVICE_COLUMNS}"
        ))
        .bind(service.id)
        .bind(&service.title)
        .bind(&service.slug)
        .bind(&service.description)
        .bind(&service.short_description)
        .bind(service.price)
        .bind(service.delivery_time)
        .bind(service.revisions)
        .bind(&service.category)
        .bind(&service.subcategory)
        .bind(service.is_active)
        .bind(&service.featured_image)
        .bind(Json(&service.gallery))
        .bind(&service.requirements)
        .bind(&service.seller_id)
        .bind(service.created_at)
        .bind(service.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_service(
        &self,
        id: ServiceId,
        update: ServiceUpdate,
    ) -> Result<Option<Service>, HubError> {
        let row = sqlx::query_as::<_, Service>(&format!(
            "UPDATE services SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                short_description = COALESCE($4, short_description), \
                price = COALESCE($5, price), \
                delivery_time = COALESCE($6, delivery_time), \
                revisions = COALESCE($7, revisions), \
                category = COALESCE($8, category), \
                subcategory = COALESCE($9, subcategory), \
                featured_image = COALESCE($10, featured_image), \
                gallery = COALESCE($11, gallery), \
                requirements = COALESCE($12, requirements), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {SERVICE_COLUMNS}"
        ))
        .bind(id)
        .bind(update.title)
        .bind(update.description)
        .bind(update.short_description)
        .bind(update.price)
        .bind(update.delivery_time)
        .bind(update.revisions)
        .bind(update.category)
        .bind(update.subcategory)
        .bind(update.featured_image)
        .bind(update.gallery.map(Json))
        .bind(update.requirements)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn deactivate_service(&self, id: ServiceId) -> Result<bool, HubError> {
        let result =
            sqlx::query("UPDATE services SET is_active = FALSE, updated_at = now() WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn services_by_seller(&self, seller: &UserId) -> Result<Vec<Service>, HubError> {
        let rows = sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE seller_id = $1 ORDER BY created_at DESC"
        ))
        .bind(seller)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn recommended_services(&self, limit: u32) -> Result<Vec<Service>, HubError> {
        let rows = sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE is_active \
             ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, HubError> {
        let rows = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE ($1::text IS NULL OR buyer_id = $1) \
               AND ($2::text IS NULL OR seller_id = $2) \
               AND ($3::order_status IS NULL OR status = $3) \
             ORDER BY created_at DESC \
             LIMIT $4 OFFSET COALESCE($5, 0)"
        ))
        .bind(&filter.buyer_id)
        .bind(&filter.seller_id)
        .bind(filter.status)
        .bind(to_i64(filter.limit))
        .bind(to_i64(filter.offset))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, HubError> {
        let row = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_order(&self, order: Order) -> Result<Order, HubError> {
        let row = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders ({ORDER_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.id)
        .bind(&order.order_number)
        .bind(&order.buyer_id)
        .bind(order.service_id)
        .bind(&order.seller_id)
        .bind(&order.title)
        .bind(&order.description)
        .bind(order.price)
        .bind(order.status)
        .bind(order.payment_status)
        .bind(&order.payment_method)
        .bind(order.due_date)
        .bind(order.priority)
        .bind(&order.requirements)
        .bind(&order.deliverables)
        .bind(&order.seller_notes)
        .bind(order.created_at)
        .bind(order.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_order(
        &self,
        id: OrderId,
        update: OrderUpdate,
    ) -> Result<Option<Order>, HubError> {
        let row = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET \
                status = COALESCE($2, status), \
                seller_notes = COALESCE($3, seller_notes), \
                deliverables = COALESCE($4, deliverables), \
                due_date = COALESCE($5, due_date), \
                priority = COALESCE($6, priority), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(update.status)
        .bind(update.seller_notes)
        .bind(update.deliverables)
        .bind(update.due_date)
        .bind(update.priority)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_messages(&self, order: OrderId) -> Result<Vec<ChatMessage>, HubError> {
        let rows = sqlx::query_as::<_, ChatMessage>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM chat_messages WHERE order_id = $1 ORDER BY created_at ASC"
        ))
        .bind(order)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_message(&self, id: MessageId) -> Result<Option<ChatMessage>, HubError> {
        let row = sqlx::query_as::<_, ChatMessage>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM chat_messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_message(&self, message: ChatMessage) -> Result<ChatMessage, HubError> {
        let row = sqlx::query_as::<_, ChatMessage>(&format!(
            "INSERT INTO chat_messages ({MESSAGE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(message.id)
        .bind(message.order_id)
        .bind(&message.sender_id)
        .bind(&message.receiver_id)
        .bind(&message.message)
        .bind(&message.attachments)
        .bind(message.is_read)
        .bind(message.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn mark_message_read(&self, id: MessageId) -> Result<bool, HubError> {
        let result = sqlx::query("UPDATE chat_messages SET is_read = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn unread_count(&self, user: &UserId) -> Result<i64, HubError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM chat_messages WHERE receiver_id = $1 AND NOT is_read",
        )
        .bind(user)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn list_reviews(
        &self,
        service: Option<ServiceId>,
        reviewee: Option<&UserId>,
    ) -> Result<Vec<Review>, HubError> {
        let rows = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews \
             WHERE is_public \
               AND ($1::uuid IS NULL OR service_id = $1) \
               AND ($2::text IS NULL OR reviewee_id = $2) \
             ORDER BY created_at DESC"
        ))
        .bind(service)
        .bind(reviewee)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn review_for_order(&self, order: OrderId) -> Result<Option<Review>, HubError> {
        let row = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE order_id = $1"
        ))
        .bind(order)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_review(&self, review: Review) -> Result<Review, HubError> {
        let row = sqlx::query_as::<_, Review>(&format!(
            "INSERT INTO reviews ({REVIEW_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(review.id)
        .bind(review.order_id)
        .bind(review.service_id)
        .bind(&review.reviewer_id)
        .bind(&review.reviewee_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.is_public)
        .bind(review.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn service_rating(&self, service: ServiceId) -> Result<ServiceRating, HubError> {
        let (average_rating, total_reviews) = sqlx::query_as::<_, (Option<f64>, i64)>(
            "SELECT AVG(rating)::float8, COUNT(*) FROM reviews WHERE service_id = $1",
        )
        .bind(service)
        .fetch_one(&self.pool)
        .await?;
        Ok(ServiceRating {
            average_rating: average_rating.unwrap_or(0.0),
            total_reviews,
        })
    }

    async fn list_portfolio(&self, user: &UserId) -> Result<Vec<PortfolioItem>, HubError> {
        let rows = sqlx::query_as::<_, PortfolioItem>(&format!(
            "SELECT {PORTFOLIO_COLUMNS} FROM portfolio \
             WHERE user_id = $1 AND is_public ORDER BY created_at DESC"
        ))
        .bind(user)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_portfolio_item(
        &self,
        id: PortfolioId,
    ) -> Result<Option<PortfolioItem>, HubError> {
        let row = sqlx::query_as::<_, PortfolioItem>(&format!(
            "SELECT {PORTFOLIO_COLUMNS} FROM portfolio WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_portfolio_item(
        &self,
        item: PortfolioItem,
    ) -> Result<PortfolioItem, HubError> {
        let row = sqlx::query_as::<_, PortfolioItem>(&format!(
            "INSERT INTO portfolio ({PORTFOLIO_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {PORTFOLIO_COLUMNS}"
        ))
        .bind(item.id)
        .bind(&item.user_id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(Json(&item.images))
        .bind(&item.project_url)
        .bind(&item.category)
        .bind(Json(&item.tags))
        .bind(item.is_public)
        .bind(item.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_portfolio_item(&self, id: PortfolioId) -> Result<bool, HubError> {
        let result = sqlx::query("DELETE FROM portfolio WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, HubError> {
        let rows = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE is_active ORDER BY sort_order ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_category(&self, category: Category) -> Result<Category, HubError> {
        let row = sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories ({CATEGORY_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(&category.icon)
        .bind(category.parent_id)
        .bind(category.is_active)
        .bind(category.sort_order)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn seller_stats(&self, seller: &UserId) -> Result<SellerStats, HubError> {
        let (total_orders, total_earnings) = sqlx::query_as::<_, (i64, Decimal)>(
            "SELECT COUNT(*), COALESCE(SUM(price), 0) FROM orders WHERE seller_id = $1",
        )
        .bind(seller)
        .fetch_one(&self.pool)
        .await?;

        let completed_orders = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM orders WHERE seller_id = $1 AND status = $2",
        )
        .bind(seller)
        .bind(OrderStatus::Completed)
        .fetch_one(&self.pool)
        .await?;

        let average_rating = sqlx::query_scalar::<_, Option<f64>>(
            "SELECT AVG(rating)::float8 FROM reviews WHERE reviewee_id = $1",
        )
        .bind(seller)
        .fetch_one(&self.pool)
        .await?;

        let active_services = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM services WHERE seller_id = $1 AND is_active",
        )
        .bind(seller)
        .fetch_one(&self.pool)
        .await?;

        Ok(SellerStats {
            total_orders,
            completed_orders,
            total_earnings,
            average_rating: average_rating.unwrap_or(0.0),
            active_services,
        })
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, HubError> {
        let total_users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        let total_services = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM services")
            .fetch_one(&self.pool)
            .await?;
        let (total_orders, total_revenue) = sqlx::query_as::<_, (i64, Decimal)>(
            "SELECT COUNT(*), COALESCE(SUM(price), 0) FROM orders",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardStats {
            total_users,
            total_services,
            total_orders,
            total_revenue,
        })
    }
}
