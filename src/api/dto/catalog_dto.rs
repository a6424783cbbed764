//! Category and portfolio DTOs.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::CategoryId;
use crate::service::catalog_service::{NewCategory, NewPortfolioItem};

/// Body of `POST /api/categories`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    /// Display name.
    pub name: String,
    /// URL handle; derived from the name when omitted.
    pub slug: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Icon name.
    pub icon: Option<String>,
    /// Parent category.
    pub parent_id: Option<CategoryId>,
    /// Display position.
    #[serde(default)]
    pub sort_order: i32,
}

impl From<CreateCategoryRequest> for NewCategory {
    fn from(r: CreateCategoryRequest) -> Self {
        Self {
            name: r.name,
            slug: r.slug,
            description: r.description,
            icon: r.icon,
            parent_id: r.parent_id,
            sort_order: r.sort_order,
        }
    }
}

/// Body of `POST /api/portfolio`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePortfolioItemRequest {
    /// Project name.
    pub title: String,
    /// Project summary.
    pub description: Option<String>,
    /// Image URLs.
    #[serde(default)]
    pub images: Vec<String>,
    /// Live project link.
    pub project_url: Option<String>,
    /// Category name.
    pub category: Option<String>,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Visible in listings (default `true`).
    pub is_public: Option<bool>,
}

impl From<CreatePortfolioItemRequest> for NewPortfolioItem {
    fn from(r: CreatePortfolioItemRequest) -> Self {
        Self {
            title: r.title,
            description: r.description,
            images: r.images,
            project_url: r.project_url,
            category: r.category,
            tags: r.tags,
            is_public: r.is_public.unwrap_or(true),
        }
    }
}
