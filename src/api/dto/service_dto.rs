//! Listing DTOs: browse, search, create and update.

use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::domain::service::{DEFAULT_REVISIONS, slugify};
use crate::domain::{NewService, ServiceFilter, ServiceUpdate, UserId};

/// Query of `GET /api/services`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ListServicesQuery {
    /// Exact category name.
    pub category: Option<String>,
    /// Case-insensitive text match on title, description and category.
    pub search: Option<String>,
    /// Inclusive lower price bound.
    #[param(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    #[param(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
    /// Page size (default 20, max 100).
    pub limit: Option<u32>,
    /// Rows to skip.
    pub offset: Option<u32>,
}

impl From<ListServicesQuery> for ServiceFilter {
    fn from(q: ListServicesQuery) -> Self {
        Self {
            category: q.category,
            search: q.search,
            min_price: q.min_price,
            max_price: q.max_price,
            limit: q.limit,
            offset: q.offset,
        }
    }
}

/// Query of `GET /api/search`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct SearchQuery {
    /// Search text (required).
    pub q: Option<String>,
    /// Exact category name.
    pub category: Option<String>,
    /// Inclusive lower price bound.
    #[param(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    #[param(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
    /// Page size (default 20, max 100).
    pub limit: Option<u32>,
    /// Rows to skip.
    pub offset: Option<u32>,
}

impl From<SearchQuery> for ServiceFilter {
    fn from(q: SearchQuery) -> Self {
        Self {
            category: q.category,
            search: q.q,
            min_price: q.min_price,
            max_price: q.max_price,
            limit: q.limit,
            offset: q.offset,
        }
    }
}

/// Query of `GET /api/recommended`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecommendedQuery {
    /// Number of listings (default 10).
    pub limit: Option<u32>,
}

/// Body of `POST /api/services`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    /// Listing title.
    pub title: String,
    /// URL handle; derived from the title when omitted.
    pub slug: Option<String>,
    /// Full description.
    pub description: String,
    /// Card blurb.
    pub short_description: Option<String>,
    /// Base price.
    #[schema(value_type = String, example = "150.00")]
    pub price: Decimal,
    /// Delivery time in days.
    pub delivery_time: i32,
    /// Included revisions (default 3).
    pub revisions: Option<i32>,
    /// Category name.
    pub category: String,
    /// Subcategory name.
    pub subcategory: Option<String>,
    /// Cover image URL.
    pub featured_image: Option<String>,
    /// Gallery image URLs.
    #[serde(default)]
    pub gallery: Vec<String>,
    /// What the seller needs from buyers.
    pub requirements: Option<serde_json::Value>,
}

impl CreateServiceRequest {
    /// Converts into a draft owned by `seller`.
    #[must_use]
    pub fn into_draft(self, seller: UserId) -> NewService {
        let slug = self.slug.unwrap_or_else(|| slugify(&self.title));
        NewService {
            title: self.title,
            slug,
            description: self.description,
            short_description: self.short_description,
            price: self.price,
            delivery_time: self.delivery_time,
            revisions: self.revisions.unwrap_or(DEFAULT_REVISIONS),
            category: self.category,
            subcategory: self.subcategory,
            featured_image: self.featured_image,
            gallery: self.gallery,
            requirements: self.requirements,
            seller_id: seller,
        }
    }
}

/// Body of `PATCH /api/services/{id}`. Omitted fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequest {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New blurb.
    pub short_description: Option<String>,
    /// New price.
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    /// New delivery time in days.
    pub delivery_time: Option<i32>,
    /// New revision count.
    pub revisions: Option<i32>,
    /// New category.
    pub category: Option<String>,
    /// New subcategory.
    pub subcategory: Option<String>,
    /// New cover image.
    pub featured_image: Option<String>,
    /// New gallery.
    pub gallery: Option<Vec<String>>,
    /// New buyer requirements.
    pub requirements: Option<serde_json::Value>,
}

impl From<UpdateServiceRequest> for ServiceUpdate {
    fn from(r: UpdateServiceRequest) -> Self {
        Self {
            title: r.title,
            description: r.description,
            short_description: r.short_description,
            price: r.price,
            delivery_time: r.delivery_time,
            revisions: r.revisions,
            category: r.category,
            subcategory: r.subcategory,
            featured_image: r.featured_image,
            gallery: r.gallery,
            requirements: r.requirements,
        }
    }
}
