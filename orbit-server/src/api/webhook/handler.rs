//! Webhook API Handlers

use axum::{Json, extract::State};
use serde_json::Value;

use crate::core::ServerState;
use crate::orders::WebhookAck;
use crate::utils::AppResult;

/// POST /api/webhook/pakasir - 支付结果通知
pub async fn pakasir(
    State(state): State<ServerState>,
    Json(payload): Json<Value>,
) -> AppResult<Json<WebhookAck>> {
    tracing::info!(payload = %payload, "Received webhook payload");

    let ack = state.orders.handle_webhook(&payload).await?;
    Ok(Json(ack))
}
