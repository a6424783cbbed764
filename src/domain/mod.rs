//! Domain layer: marketplace entities, lifecycle rules, and the relay bus.
//!
//! Entities mirror the relational schema one-to-one. Business rules that
//! do not need storage (order transitions, rating bounds, filters, order
//! numbers) live on the types themselves.

pub mod category;
pub mod ids;
pub mod message;
pub mod order;
pub mod portfolio;
pub mod relay_bus;
pub mod relay_event;
pub mod review;
pub mod service;
pub mod stats;
pub mod user;

pub use category::Category;
pub use ids::{CategoryId, MessageId, OrderId, PortfolioId, ReviewId, ServiceId, UserId};
pub use message::ChatMessage;
pub use order::{
    Order, OrderFilter, OrderRequest, OrderStatus, OrderUpdate, PaymentStatus, Priority,
};
pub use portfolio::PortfolioItem;
pub use relay_bus::RelayBus;
pub use relay_event::RelayEvent;
pub use review::{Rating, Review};
pub use service::{NewService, Service, ServiceFilter, ServiceUpdate};
pub use stats::{DashboardStats, SellerStats, ServiceRating};
pub use user::{UpsertUser, User, UserRole, UserStatus};
