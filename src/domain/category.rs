//! Service categories.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::CategoryId;

/// A browsable category, optionally nested under a parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Category identifier.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Unique URL handle.
    pub slug: String,
    /// Description.
    pub description: Option<String>,
    /// Icon name.
    pub icon: Option<String>,
    /// Parent category.
    pub parent_id: Option<CategoryId>,
    /// Inactive categories are hidden.
    pub is_active: bool,
    /// Ascending display position.
    pub sort_order: i32,
}
