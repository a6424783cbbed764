//! Catalog service: listings, search, categories, portfolios and the
//! public review feed of a listing.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::auth::AuthUser;
use crate::domain::service::{MAX_DELIVERY_DAYS, PRICE_LIMIT, PRICE_SCALE};
use crate::domain::{
    Category, CategoryId, NewService, PortfolioId, PortfolioItem, Review, Service, ServiceFilter,
    ServiceId, ServiceRating, ServiceUpdate, UserId,
};
use crate::error::HubError;
use crate::persistence::{MarketStore, clamp_limit};

use super::{ensure_account, require_text};

/// Default number of recommended listings.
pub const DEFAULT_RECOMMENDED: u32 = 10;

/// Input for a new category.
#[derive(Debug, Clone, Default)]
pub struct NewCategory {
    /// Display name.
    pub name: String,
    /// URL handle; derived from the name when absent.
    pub slug: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Icon name.
    pub icon: Option<String>,
    /// Parent category.
    pub parent_id: Option<CategoryId>,
    /// Display position.
    pub sort_order: i32,
}

/// Input for a new portfolio entry.
#[derive(Debug, Clone, Default)]
pub struct NewPortfolioItem {
    /// Project name.
    pub title: String,
    /// Project summary.
    pub description: Option<String>,
    /// Image URLs.
    pub images: Vec<String>,
    /// Live project link.
    pub project_url: Option<String>,
    /// Category name.
    pub category: Option<String>,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Hidden when `false`.
    pub is_public: bool,
}

/// Listing management and discovery.
#[derive(Debug, Clone)]
pub struct CatalogService {
    store: Arc<dyn MarketStore>,
}

impl CatalogService {
    /// Creates a new `CatalogService`.
    #[must_use]
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    // ── Listings ───────────────────────────────────────────────────────

    /// Browses active listings.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidRequest`] if the price bounds are inverted.
    pub async fn list_services(&self, mut filter: ServiceFilter) -> Result<Vec<Service>, HubError> {
        check_price_bounds(filter.min_price, filter.max_price)?;
        filter.limit = Some(clamp_limit(filter.limit));
        self.store.list_services(&filter).await
    }

    /// Full-text search over active listings. The query is mandatory.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidRequest`] for a blank query or inverted
    /// price bounds.
    pub async fn search(&self, mut filter: ServiceFilter) -> Result<Vec<Service>, HubError> {
        let query = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| HubError::InvalidRequest("search query is required".to_string()))?
            .to_string();
        filter.search = Some(query);
        self.list_services(filter).await
    }

    /// Newest active listings.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn recommended(&self, limit: Option<u32>) -> Result<Vec<Service>, HubError> {
        let limit = clamp_limit(Some(limit.unwrap_or(DEFAULT_RECOMMENDED)));
        self.store.recommended_services(limit).await
    }

    /// Fetches a listing by id.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::ServiceNotFound`] if it does not exist.
    pub async fn get_service(&self, id: ServiceId) -> Result<Service, HubError> {
        self.store
            .get_service(id)
            .await?
            .ok_or_else(|| HubError::ServiceNotFound(id.to_string()))
    }

    /// Fetches a listing by slug.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::ServiceNotFound`] if no listing has that slug.
    pub async fn get_service_by_slug(&self, slug: &str) -> Result<Service, HubError> {
        self.store
            .get_service_by_slug(slug)
            .await?
            .ok_or_else(|| HubError::ServiceNotFound(slug.to_string()))
    }

    /// Publishes a listing owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidRequest`] for invalid fields and
    /// [`HubError::Conflict`] if the slug is taken.
    pub async fn create_service(
        &self,
        caller: &AuthUser,
        mut draft: NewService,
    ) -> Result<Service, HubError> {
        draft.title = require_text("title", &draft.title)?;
        draft.description = require_text("description", &draft.description)?;
        draft.category = require_text("category", &draft.category)?;
        check_slug(&draft.slug)?;
        check_terms(Some(draft.price), Some(draft.delivery_time), Some(draft.revisions))?;
        draft.seller_id = caller.id.clone();

        ensure_account(self.store.as_ref(), caller).await?;
        let service = self.store.create_service(draft.into_service(Utc::now())).await?;
        tracing::info!(
            service_id = %service.id,
            seller_id = %service.seller_id,
            slug = %service.slug,
            "service created"
        );
        Ok(service)
    }

    /// Applies the owner's partial update.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::ServiceNotFound`], [`HubError::Forbidden`] for
    /// anyone but the seller, or [`HubError::InvalidRequest`] for invalid
    /// fields.
    pub async fn update_service(
        &self,
        caller: &AuthUser,
        id: ServiceId,
        mut update: ServiceUpdate,
    ) -> Result<Service, HubError> {
        let existing = self.get_service(id).await?;
        if existing.seller_id != caller.id {
            return Err(HubError::Forbidden("only the seller may edit a listing".to_string()));
        }
        update.title = trimmed("title", update.title.as_deref())?;
        update.description = trimmed("description", update.description.as_deref())?;
        update.category = trimmed("category", update.category.as_deref())?;
        check_terms(update.price, update.delivery_time, update.revisions)?;

        let updated = self
            .store
            .update_service(id, update)
            .await?
            .ok_or_else(|| HubError::ServiceNotFound(id.to_string()))?;
        tracing::info!(service_id = %id, "service updated");
        Ok(updated)
    }

    /// Soft-deletes a listing. Allowed for its seller and for admins.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::ServiceNotFound`] or [`HubError::Forbidden`].
    pub async fn delete_service(&self, caller: &AuthUser, id: ServiceId) -> Result<(), HubError> {
        let existing = self.get_service(id).await?;
        if existing.seller_id != caller.id && !caller.is_admin() {
            return Err(HubError::Forbidden(
                "only the seller or an admin may remove a listing".to_string(),
            ));
        }
        if !self.store.deactivate_service(id).await? {
            return Err(HubError::ServiceNotFound(id.to_string()));
        }
        tracing::info!(service_id = %id, by = %caller.id, "service deactivated");
        Ok(())
    }

    /// All listings of a seller, including deactivated ones.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn services_by_seller(&self, seller: &UserId) -> Result<Vec<Service>, HubError> {
        self.store.services_by_seller(seller).await
    }

    // ── Reviews ────────────────────────────────────────────────────────

    /// Public reviews of a listing, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::ServiceNotFound`] for an unknown listing.
    pub async fn service_reviews(&self, id: ServiceId) -> Result<Vec<Review>, HubError> {
        self.get_service(id).await?;
        self.store.list_reviews(Some(id), None).await
    }

    /// Average rating of a listing.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::ServiceNotFound`] for an unknown listing.
    pub async fn service_rating(&self, id: ServiceId) -> Result<ServiceRating, HubError> {
        self.get_service(id).await?;
        self.store.service_rating(id).await
    }

    // ── Categories ─────────────────────────────────────────────────────

    /// Active categories in display order.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn categories(&self) -> Result<Vec<Category>, HubError> {
        self.store.list_categories().await
    }

    /// Adds a category. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Forbidden`] for non-admins,
    /// [`HubError::InvalidRequest`] for a blank name and
    /// [`HubError::Conflict`] for a duplicate slug.
    pub async fn create_category(
        &self,
        caller: &AuthUser,
        input: NewCategory,
    ) -> Result<Category, HubError> {
        if !caller.is_admin() {
            return Err(HubError::Forbidden("admin role required".to_string()));
        }
        let name = require_text("name", &input.name)?;
        let slug = match input.slug {
            Some(slug) => slug,
            None => slug_base(&name),
        };
        check_slug(&slug)?;

        let category = Category {
            id: CategoryId::new(),
            name,
            slug,
            description: input.description,
            icon: input.icon,
            parent_id: input.parent_id,
            is_active: true,
            sort_order: input.sort_order,
        };
        let category = self.store.create_category(category).await?;
        tracing::info!(category_id = %category.id, slug = %category.slug, "category created");
        Ok(category)
    }

    // ── Portfolio ──────────────────────────────────────────────────────

    /// A user's public portfolio.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn portfolio(&self, user: &UserId) -> Result<Vec<PortfolioItem>, HubError> {
        self.store.list_portfolio(user).await
    }

    /// Adds an entry to the caller's portfolio.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidRequest`] for a blank title.
    pub async fn add_portfolio_item(
        &self,
        caller: &AuthUser,
        input: NewPortfolioItem,
    ) -> Result<PortfolioItem, HubError> {
        let title = require_text("title", &input.title)?;
        ensure_account(self.store.as_ref(), caller).await?;
        let item = PortfolioItem {
            id: PortfolioId::new(),
            user_id: caller.id.clone(),
            title,
            description: input.description,
            images: input.images,
            project_url: input.project_url,
            category: input.category,
            tags: input.tags,
            is_public: input.is_public,
            created_at: Utc::now(),
        };
        self.store.create_portfolio_item(item).await
    }

    /// Removes one of the caller's portfolio entries.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::PortfolioItemNotFound`] or
    /// [`HubError::Forbidden`] when the entry belongs to someone else.
    pub async fn remove_portfolio_item(
        &self,
        caller: &AuthUser,
        id: PortfolioId,
    ) -> Result<(), HubError> {
        let item = self
            .store
            .get_portfolio_item(id)
            .await?
            .ok_or_else(|| HubError::PortfolioItemNotFound(*id.as_uuid()))?;
        if item.user_id != caller.id {
            return Err(HubError::Forbidden("not your portfolio item".to_string()));
        }
        if !self.store.delete_portfolio_item(id).await? {
            return Err(HubError::PortfolioItemNotFound(*id.as_uuid()));
        }
        Ok(())
    }
}

fn check_price_bounds(min: Option<Decimal>, max: Option<Decimal>) -> Result<(), HubError> {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(HubError::InvalidRequest(
                "minPrice must not exceed maxPrice".to_string(),
            ));
        }
    }
    Ok(())
}

fn trimmed(field: &str, value: Option<&str>) -> Result<Option<String>, HubError> {
    value.map(|v| require_text(field, v)).transpose()
}

fn check_terms(
    price: Option<Decimal>,
    delivery_time: Option<i32>,
    revisions: Option<i32>,
) -> Result<(), HubError> {
    if let Some(price) = price {
        if price <= Decimal::ZERO {
            return Err(HubError::InvalidRequest("price must be positive".to_string()));
        }
        if price.normalize().scale() > PRICE_SCALE {
            return Err(HubError::InvalidRequest(
                "price must not have more than two decimal places".to_string(),
            ));
        }
        if price >= PRICE_LIMIT {
            return Err(HubError::InvalidRequest(format!(
                "price must be below {PRICE_LIMIT}"
            )));
        }
    }
    if delivery_time.is_some_and(|d| !(1..=MAX_DELIVERY_DAYS).contains(&d)) {
        return Err(HubError::InvalidRequest(format!(
            "deliveryTime must be between 1 and {MAX_DELIVERY_DAYS} days"
        )));
    }
    if revisions.is_some_and(|r| r < 0) {
        return Err(HubError::InvalidRequest("revisions must not be negative".to_string()));
    }
    Ok(())
}

/// Slugs are non-empty runs of lowercase ASCII letters, digits and `-`.
fn check_slug(slug: &str) -> Result<(), HubError> {
    let valid = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(HubError::InvalidRequest(format!("invalid slug: {slug:?}")))
    }
}

fn slug_base(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
