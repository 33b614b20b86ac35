//! Product API Module
//!
//! 只读目录接口。套餐在启动时装载，进程生命周期内不变。

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Product router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
}
