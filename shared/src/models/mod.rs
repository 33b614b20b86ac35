//! Data models
//!
//! Shared between orbit-server and the storefront (via API).
//! All JSON field names are camelCase to match the public API contract.

pub mod order;
pub mod product;

// Re-exports
pub use order::*;
pub use product::*;
