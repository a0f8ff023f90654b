use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::models::{CreateItemRequest, InventoryItem, ItemPatch, QuantityUpdate};
use crate::routes::AppState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `GET /items`
pub async fn list_items(State(state): State<AppState>) -> AppResult<Json<Vec<InventoryItem>>> {
    let items = state.items.list_items().await?;
    Ok(Json(items))
}

/// `GET /items/:code`
pub async fn get_item(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<InventoryItem>> {
    let item = state.items.get_item(&code).await?;
    Ok(Json(item))
}

/// `POST /items`
pub async fn create_item(
    State(state): State<AppState>,
    payload: Result<Json<CreateItemRequest>, JsonRejection>,
) -> AppResult<Json<InventoryItem>> {
    let Json(req) = payload?;
    let item = state.items.create_item(req).await?;
    Ok(Json(item))
}

/// `PUT /items/:code`
pub async fn update_item(
    State(state): State<AppState>,
    Path(code): Path<String>,
    payload: Result<Json<ItemPatch>, JsonRejection>,
) -> AppResult<Json<InventoryItem>> {
    let Json(patch) = payload?;
    let item = state.items.update_item(&code, patch).await?;
    Ok(Json(item))
}

/// `PATCH /items/:code/quantity`
pub async fn update_quantity(
    State(state): State<AppState>,
    Path(code): Path<String>,
    payload: Result<Json<QuantityUpdate>, JsonRejection>,
) -> AppResult<Json<InventoryItem>> {
    let Json(update) = payload?;
    let item = state.items.update_quantity(&code, update.quantity).await?;
    Ok(Json(item))
}

/// `DELETE /items/:code`
pub async fn delete_item(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.items.delete_item(&code).await?;
    Ok(Json(MessageResponse {
        message: "Item deleted".to_string(),
    }))
}
