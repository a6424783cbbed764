//! Service listings offered by sellers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ServiceId, UserId};

/// Revision count used when a listing does not specify one.
pub const DEFAULT_REVISIONS: i32 = 3;

/// Longest delivery time a listing may promise, in days.
pub const MAX_DELIVERY_DAYS: i32 = 365;

/// Prices carry at most cents.
pub const PRICE_SCALE: u32 = 2;

/// Exclusive upper bound of a price (`NUMERIC(10,2)`).
pub const PRICE_LIMIT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

/// A service listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Listing identifier.
    pub id: ServiceId,
    /// Headline.
    pub title: String,
    /// URL-safe unique handle.
    pub slug: String,
    /// Full description.
    pub description: String,
    /// Teaser shown on cards.
    pub short_description: Option<String>,
    /// Price in the marketplace currency, two decimal places.
    pub price: Decimal,
    /// Delivery time in days.
    pub delivery_time: i32,
    /// Included revision rounds.
    pub revisions: i32,
    /// Category name.
    pub category: String,
    /// Optional subcategory name.
    pub subcategory: Option<String>,
    /// `false` once the seller removed the listing.
    pub is_active: bool,
    /// Cover image URL.
    pub featured_image: Option<String>,
    /// Gallery image URLs.
    #[sqlx(json)]
    pub gallery: Vec<String>,
    /// Buyer requirement form definition.
    pub requirements: Option<serde_json::Value>,
    /// Owner of the listing.
    pub seller_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for a new listing.
#[derive(Debug, Clone, PartialEq)]
pub struct NewService {
    /// Headline.
    pub title: String,
    /// Unique handle.
    pub slug: String,
    /// Full description.
    pub description: String,
    /// Teaser.
    pub short_description: Option<String>,
    /// Price.
    pub price: Decimal,
    /// Delivery time in days.
    pub delivery_time: i32,
    /// Included revisions.
    pub revisions: i32,
    /// Category.
    pub category: String,
    /// Subcategory.
    pub subcategory: Option<String>,
    /// Cover image.
    pub featured_image: Option<String>,
    /// Gallery images.
    pub gallery: Vec<String>,
    /// Requirement form.
    pub requirements: Option<serde_json::Value>,
    /// Owner.
    pub seller_id: UserId,
}

impl NewService {
    /// Materializes the listing row.
    #[must_use]
    pub fn into_service(self, now: DateTime<Utc>) -> Service {
        Service {
            id: ServiceId::new(),
            title: self.title,
            slug: self.slug,
            description: self.description,
            short_description: self.short_description,
            price: self.price,
            delivery_time: self.delivery_time,
            revisions: self.revisions,
            category: self.category,
            subcategory: self.subcategory,
            is_active: true,
            featured_image: self.featured_image,
            gallery: self.gallery,
            requirements: self.requirements,
            seller_id: self.seller_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a listing. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceUpdate {
    /// New headline.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New teaser.
    pub short_description: Option<String>,
    /// New price.
    pub price: Option<Decimal>,
    /// New delivery time.
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
    /// New requirement form.
    pub requirements: Option<serde_json::Value>,
}

impl ServiceUpdate {
    /// Applies the update in place and bumps `updated_at`.
    pub fn apply(self, service: &mut Service, now: DateTime<Utc>) {
        if let Some(v) = self.title {
            service.title = v;
        }
        if let Some(v) = self.description {
            service.description = v;
        }
        if self.short_description.is_some() {
            service.short_description = self.short_description;
        }
        if let Some(v) = self.price {
            service.price = v;
        }
        if let Some(v) = self.delivery_time {
            service.delivery_time = v;
        }
        if let Some(v) = self.revisions {
            service.revisions = v;
        }
        if let Some(v) = self.category {
            service.category = v;
        }
        if self.subcategory.is_some() {
            service.subcategory = self.subcategory;
        }
        if self.featured_image.is_some() {
            service.featured_image = self.featured_image;
        }
        if let Some(v) = self.gallery {
            service.gallery = v;
        }
        if self.requirements.is_some() {
            service.requirements = self.requirements;
        }
        service.updated_at = now;
    }
}

/// Browse and search filter. Only active listings are ever returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Case-insensitive substring over title, description and category.
    pub search: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    pub max_price: Option<Decimal>,
    /// Page size.
    pub limit: Option<u32>,
    /// Rows to skip.
    pub offset: Option<u32>,
}

impl ServiceFilter {
    /// Returns `true` if `service` passes every predicate except paging.
    #[must_use]
    pub fn matches(&self, service: &Service) -> bool {
        if !service.is_active {
            return false;
        }
        if let Some(category) = &self.category
            && &service.category != category
        {
            return false;
        }
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            let hit = service.title.to_lowercase().contains(&term)
                || service.description.to_lowercase().contains(&term)
                || service.category.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }
        if let Some(min) = self.min_price
            && service.price < min
        {
            return false;
        }
        if let Some(max) = self.max_price
            && service.price > max
        {
            return false;
        }
        true
    }
}

/// Derives a URL handle from a title: lowercase ASCII alphanumeric runs
/// joined by `-`, followed by an 8-character random suffix.
#[must_use]
pub fn slugify(title: &str) -> String {
    let base = title
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    let suffix: String = uuid::Uuid::new_v4().simple().to_string().chars().take(8).collect();
    if base.is_empty() {
        suffix
    } else {
        format!("{base}-{suffix}")
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn listing() -> Service {
        NewService {
            title: "Logo Design".to_string(),
            slug: "logo-design".to_string(),
            description: "A crisp vector logo".to_string(),
            short_description: None,
            price: Decimal::new(5000, 2),
            delivery_time: 3,
            revisions: DEFAULT_REVISIONS,
            category: "design".to_string(),
            subcategory: None,
            featured_image: None,
            gallery: vec![],
            requirements: None,
            seller_id: UserId::new("seller"),
        }
        .into_service(Utc::now())
    }

    #[test]
    fn slugify_joins_alphanumeric_runs() {
        let slug = slugify("Modern  Logo & Brand Kit!");
        assert!(slug.starts_with("modern-logo-brand-kit-"));
        assert_eq!(slug.len(), "modern-logo-brand-kit-".len() + 8);
    }

    #[test]
    fn slugify_without_usable_title_is_suffix_only() {
        assert_eq!(slugify("!!!").len(), 8);
    }

    #[test]
    fn filter_skips_inactive() {
        let mut s = listing();
        s.is_active = false;
        assert!(!ServiceFilter::default().matches(&s));
    }

    #[test]
    fn filter_search_is_case_insensitive() {
        let s = listing();
        let filter = ServiceFilter {
            search: Some("VECTOR".to_string()),
            ..ServiceFilter::default()
        };
        assert!(filter.matches(&s));
        let miss = ServiceFilter {
            search: Some("video".to_string()),
            ..ServiceFilter::default()
        };
        assert!(!miss.matches(&s));
    }

    #[test]
    fn filter_price_bounds_are_inclusive() {
        let s = listing();
        let filter = ServiceFilter {
            min_price: Some(Decimal::new(5000, 2)),
            max_price: Some(Decimal::new(5000, 2)),
            ..ServiceFilter::default()
        };
        assert!(filter.matches(&s));
        let too_cheap = ServiceFilter {
            max_price: Some(Decimal::new(4999, 2)),
            ..ServiceFilter::default()
        };
        assert!(!too_cheap.matches(&s));
    }

    #[test]
    fn update_touches_only_given_fields() {
        let mut s = listing();
        let before = s.clone();
        ServiceUpdate {
            price: Some(Decimal::new(7500, 2)),
            ..ServiceUpdate::default()
        }
        .apply(&mut s, Utc::now());
        assert_eq!(s.price, Decimal::new(7500, 2));
        assert_eq!(s.title, before.title);
        assert_eq!(s.slug, before.slug);
    }
}
