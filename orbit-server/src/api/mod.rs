//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查 (演示/生产模式报告)
//! - [`products`] - 套餐目录接口 (只读)
//! - [`orders`] - 订单创建、查询、状态轮询、模拟支付
//! - [`webhook`] - Pakasir 支付 Webhook 入口
//!
//! 路由层只做提取和转发：所有状态转换都发生在
//! [`crate::orders::OrdersManager`] 中，编排器从不反向调用路由层。

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

pub mod health;
pub mod orders;
pub mod products;
pub mod webhook;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

/// Build a router with all routes registered (no middleware)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(products::router())
        .merge(orders::router())
        .merge(webhook::router())
        .merge(health::router())
}

/// Build a fully configured application with middleware
pub fn build_app() -> Router<ServerState> {
    build_router()
        // CORS - Handle cross-origin requests (storefront runs on another origin)
        .layer(CorsLayer::permissive())
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
}
