//! Webhook API Module
//!
//! Pakasir 支付通知入口。除载荷结构无效 (400) 和订单不存在 (404)
//! 之外一律返回 success 形响应；重复投递幂等处理。

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

/// Webhook router
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/webhook/pakasir", post(handler::pakasir))
}
