//! OpenAPI document.
//!
//! - OpenAPI JSON: `/api-docs/openapi.json`
//! - Swagger UI: `/swagger-ui` (with the `swagger-ui` feature)

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::dto::{
    CountResponse, CreateCategoryRequest, CreateOrderRequest, CreatePortfolioItemRequest,
    CreateReviewRequest, CreateServiceRequest, SendMessageRequest, UpdateOrderRequest,
    UpdateServiceRequest, UploadResponse, UploadedFile,
};
use crate::api::handlers;
use crate::domain::{
    Category, ChatMessage, DashboardStats, Order, OrderStatus, PaymentStatus, PortfolioItem,
    Priority, Review, SellerStats, Service, ServiceRating, User, UserRole, UserStatus,
};
use crate::error::{ErrorBody, ErrorResponse};

/// Registers the bearer token scheme.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Marketplace API documentation.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Freelance Hub API",
        description = "Services marketplace: listings, orders, order chat, reviews and seller analytics."
    ),
    paths(
        handlers::system::health_handler,
        handlers::auth::current_user,
        handlers::services::list_services,
        handlers::services::create_service,
        handlers::services::get_service,
        handlers::services::get_service_by_slug,
        handlers::services::update_service,
        handlers::services::delete_service,
        handlers::services::service_reviews,
        handlers::services::service_rating,
        handlers::services::my_services,
        handlers::orders::list_orders,
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::orders::update_order,
        handlers::orders::list_messages,
        handlers::orders::send_message,
        handlers::orders::create_review,
        handlers::messages::mark_read,
        handlers::messages::unread_count,
        handlers::discovery::search,
        handlers::discovery::recommended,
        handlers::analytics::seller_stats,
        handlers::analytics::dashboard_stats,
        handlers::categories::list_categories,
        handlers::categories::create_category,
        handlers::portfolio::user_portfolio,
        handlers::portfolio::create_item,
        handlers::portfolio::delete_item,
        handlers::upload::upload,
    ),
    components(schemas(
        User, UserRole, UserStatus, Service, Order, OrderStatus, PaymentStatus, Priority,
        ChatMessage, Review, PortfolioItem, Category, SellerStats, DashboardStats,
        ServiceRating, CreateServiceRequest, UpdateServiceRequest, CreateOrderRequest,
        UpdateOrderRequest, SendMessageRequest, CreateReviewRequest, CreateCategoryRequest,
        CreatePortfolioItemRequest, CountResponse, UploadResponse, UploadedFile,
        ErrorResponse, ErrorBody,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "System", description = "Health checks"),
        (name = "Auth", description = "Current user"),
        (name = "Services", description = "Service listings"),
        (name = "Orders", description = "Orders and their lifecycle"),
        (name = "Messages", description = "Order-scoped chat"),
        (name = "Reviews", description = "Reviews of completed orders"),
        (name = "Discovery", description = "Search and recommendations"),
        (name = "Analytics", description = "Seller and platform statistics"),
        (name = "Categories", description = "Service categories"),
        (name = "Portfolio", description = "Seller portfolios"),
        (name = "Uploads", description = "File uploads"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn spec_lists_routes_and_bearer_scheme() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/api/orders/{id}/messages"));
        assert!(spec.paths.paths.contains_key("/health"));
        assert!(
            spec.components
                .is_some_and(|c| c.security_schemes.contains_key("bearer_auth"))
        );
    }

    #[test]
    fn ratings_are_documented_as_one_to_five() {
        let Ok(doc) = serde_json::to_value(ApiDoc::openapi()) else {
            panic!("openapi document does not serialize");
        };
        for schema in ["Review", "CreateReviewRequest"] {
            let rating = &doc["components"]["schemas"][schema]["properties"]["rating"];
            assert_eq!(rating["minimum"].as_f64(), Some(1.0), "{schema}");
            assert_eq!(rating["maximum"].as_f64(), Some(5.0), "{schema}");
        }
    }
}
