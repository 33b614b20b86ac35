//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::Product;

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// GET /api/products - 获取所有套餐
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(state.catalog.list().to_vec()))
}

/// GET /api/products/{id} - 获取单个套餐
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let product = state
        .catalog
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::not_found(format!("Product {id}")))?;
    Ok(Json(product))
}
