//! Data Transfer Objects for REST request/response serialization.
//!
//! Field names are camelCase on the wire. Money amounts are decimal
//! strings so no precision is lost in transit.

pub mod catalog_dto;
pub mod common_dto;
pub mod message_dto;
pub mod order_dto;
pub mod service_dto;

pub use catalog_dto::*;
pub use common_dto::*;
pub use message_dto::*;
pub use order_dto::*;
pub use service_dto::*;
