//! Shared types for OrbitCloud
//!
//! Common types used across the server and (via JSON API) the storefront:
//! product catalog entities, order entities and inbound request payloads.

pub mod models;
pub mod request;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{
    EggConfig, Order, OrderStatus, Product, ProductCategory, ServerCredentials,
};
pub use request::CreateOrderRequest;
