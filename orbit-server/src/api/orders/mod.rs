//! Order API Module
//!
//! 订单创建与查询。所有状态转换都经由 OrdersManager；
//! 模拟支付保留原始路径 `/api/simulate-payment/{order_id}`。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/orders", routes())
        // 运维/测试辅助：跳过支付网关直接推进订单
        .route(
            "/api/simulate-payment/{order_id}",
            post(handler::simulate_payment),
        )
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        // 状态轮询：读取路径执行惰性过期检查
        .route("/{id}/status", get(handler::get_status))
}
