//! 健康检查路由
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/health | GET | 存活 + 各外部适配器配置状态 |
//! | /api/health/detailed | GET | 含面板连通性探测的详细检查 |
//!
//! # 响应示例
//!
//! ```json
//! {
//!   "status": "ok",
//!   "services": { "pakasir": false, "pterodactyl": false },
//!   "mode": "demo"
//! }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;
use serde::Serialize;

use crate::core::ServerState;

/// 健康检查路由 - 公共路由
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/health/detailed", get(detailed_health))
}

/// 各外部适配器的配置状态
#[derive(Serialize)]
pub struct ServiceFlags {
    /// Pakasir 支付网关是否配置
    pakasir: bool,
    /// Pterodactyl 面板是否配置
    pterodactyl: bool,
}

/// 简单健康检查响应
#[derive(Serialize)]
pub struct HealthResponse {
    /// 状态 (ok | error)
    status: &'static str,
    /// 版本号
    version: &'static str,
    timestamp: String,
    services: ServiceFlags,
    /// 运行模式 (production = 两个适配器均已配置，否则 demo)
    mode: &'static str,
}

/// 详细健康检查响应
#[derive(Serialize)]
pub struct DetailedHealthResponse {
    status: &'static str,
    version: &'static str,
    services: ServiceFlags,
    mode: &'static str,
    /// 面板连通性 (仅 configured 模式下探测，demo 模式恒为 false)
    panel_reachable: bool,
}

fn flags(state: &ServerState) -> ServiceFlags {
    ServiceFlags {
        pakasir: state.payment.is_configured(),
        pterodactyl: state.provisioning.is_configured(),
    }
}

fn mode(state: &ServerState) -> &'static str {
    if state.is_production_mode() {
        "production"
    } else {
        "demo"
    }
}

/// 基础健康检查
///
/// 报告演示/生产模式，让运维一眼看出哪个适配器缺配置
pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
        services: flags(&state),
        mode: mode(&state),
    })
}

/// 包含面板连通性探测的详细健康检查
pub async fn detailed_health(State(state): State<ServerState>) -> Json<DetailedHealthResponse> {
    let panel_reachable = state.provisioning.test_connection().await;

    Json(DetailedHealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        services: flags(&state),
        mode: mode(&state),
        panel_reachable,
    })
}
