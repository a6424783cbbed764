//! Seller portfolio entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{PortfolioId, UserId};

/// A showcased past project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    /// Item identifier.
    pub id: PortfolioId,
    /// Owner.
    pub user_id: UserId,
    /// Project name.
    pub title: String,
    /// Project summary.
    pub description: Option<String>,
    /// Image URLs.
    #[sqlx(json)]
    pub images: Vec<String>,
    /// Live project link.
    pub project_url: Option<String>,
    /// Category name.
    pub category: Option<String>,
    /// Free-form tags.
    #[sqlx(json)]
    pub tags: Vec<String>,
    /// Hidden items are excluded from listings.
    pub is_public: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
