//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use shared::models::Order;
use shared::request::CreateOrderRequest;
use validator::Validate;

use crate::core::ServerState;
use crate::utils::AppResult;

/// POST /api/orders - 创建订单
///
/// 验证失败返回逐字段错误；支付网关失败不影响创建 (兜底 QR)。
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<Order>)> {
    payload.validate()?;

    let order = state.orders.create_order(&payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders/{id} - 获取订单
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.get_order(&id).await?))
}

/// GET /api/orders/{id}/status - 状态轮询 (惰性过期检查)
pub async fn get_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.get_order_status(&id).await?))
}

/// Response for simulate-payment
#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    pub success: bool,
    pub order: Order,
}

/// POST /api/simulate-payment/{order_id} - 模拟支付
///
/// 仅 pending 订单可模拟；开通失败时兜底合成凭据完成订单。
pub async fn simulate_payment(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
) -> AppResult<Json<SimulateResponse>> {
    let order = state.orders.simulate_payment(&order_id).await?;
    Ok(Json(SimulateResponse {
        success: true,
        order,
    }))
}
