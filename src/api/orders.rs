//! Order endpoints: list, detail, create, edit, delete
//!
//! Every handler runs behind the auth middleware and receives the caller's
//! [`Identity`]. Mutating and reading a specific order starts with
//! [`verify_order`], so the ownership rule lives in one place.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::Identity;
use crate::config::UnknownItemPolicy;
use crate::db;
use crate::db::orders::NewItem;
use crate::error::ApiError;
use crate::state::AppState;
use crate::util::now_millis;

use super::ApiResult;

/// Upper bound on a single line's quantity. Keeps totals far away from
/// `i64` overflow no matter what the client submits.
const MAX_ITEM_QUANTITY: i64 = 1_000;

// ── Request / Response types ──

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub menu_item_id: i64,
    pub quantity: i64,
}

#[derive(Deserialize)]
pub struct OrderRequest {
    pub items: Vec<OrderItemRequest>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    pub menu_item_id: i64,
    pub item_name: String,
    pub price: i64,
    pub quantity: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: i64,
    pub created_at: i64,
    pub total_price: i64,
    pub items: Vec<OrderItemDto>,
}

// ── Helpers ──

/// Ownership guard: the order must exist and belong to the caller. A foreign
/// order yields the same `NotFound` as a missing one.
async fn verify_order(
    state: &AppState,
    order_id: i64,
    user_id: i64,
) -> Result<db::orders::Order, ApiError> {
    db::orders::find_for_user(&state.pool, order_id, user_id)
        .await?
        .ok_or(ApiError::NotFound)
}

/// Resolve submitted lines against the catalog, snapshotting name and price.
/// Unknown menu item ids are dropped or rejected per the configured policy.
async fn resolve_items(
    state: &AppState,
    requested: &[OrderItemRequest],
) -> Result<Vec<NewItem>, ApiError> {
    let mut items = Vec::with_capacity(requested.len());
    for line in requested {
        if line.quantity < 1 || line.quantity > MAX_ITEM_QUANTITY {
            return Err(ApiError::Validation(format!(
                "Quantity must be between 1 and {MAX_ITEM_QUANTITY}"
            )));
        }
        match db::menu::find_by_id(&state.pool, line.menu_item_id).await? {
            Some(menu_item) => items.push(NewItem {
                menu_item_id: menu_item.id,
                item_name: menu_item.name,
                price_cents: menu_item.price_cents,
                quantity: line.quantity,
            }),
            None => match state.unknown_item_policy {
                UnknownItemPolicy::Skip => {
                    tracing::debug!(menu_item_id = line.menu_item_id, "skipping unknown menu item");
                }
                UnknownItemPolicy::Reject => {
                    return Err(ApiError::Validation(format!(
                        "Unknown menu item id {}",
                        line.menu_item_id
                    )));
                }
            },
        }
    }
    Ok(items)
}

async fn order_dto(state: &AppState, order: db::orders::Order) -> Result<OrderDto, ApiError> {
    let items = db::orders::items_for_order(&state.pool, order.id)
        .await?
        .into_iter()
        .map(|i| OrderItemDto {
            menu_item_id: i.menu_item_id,
            item_name: i.item_name,
            price: i.price_cents,
            quantity: i.quantity,
        })
        .collect();

    Ok(OrderDto {
        id: order.id,
        created_at: order.created_at,
        total_price: order.total_cents,
        items,
    })
}

// ── Handlers ──

#[derive(Serialize)]
pub struct OrdersResponse {
    pub orders: Vec<OrderDto>,
}

/// GET /orders
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<OrdersResponse> {
    let mut orders = Vec::new();
    for order in db::orders::list_for_user(&state.pool, identity.user_id).await? {
        orders.push(order_dto(&state, order).await?);
    }
    Ok(Json(OrdersResponse { orders }))
}

/// GET /orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(order_id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    let order = verify_order(&state, order_id, identity.user_id).await?;
    let dto = order_dto(&state, order).await?;
    Ok(Json(json!({ "order": dto })))
}

/// POST /orders
pub async fn create_order(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<OrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let items = resolve_items(&state, &req.items).await?;
    let order_id =
        db::orders::create(&state.pool, identity.user_id, &items, now_millis()).await?;

    tracing::info!(user_id = identity.user_id, order_id, "order created");

    Ok((StatusCode::CREATED, Json(json!({ "orderId": order_id }))))
}

/// PUT /orders/{id}
pub async fn edit_order(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(order_id): Path<i64>,
    Json(req): Json<OrderRequest>,
) -> ApiResult<serde_json::Value> {
    verify_order(&state, order_id, identity.user_id).await?;

    let items = resolve_items(&state, &req.items).await?;
    db::orders::replace_items(&state.pool, order_id, &items, now_millis()).await?;

    tracing::info!(user_id = identity.user_id, order_id, "order edited");

    Ok(Json(json!({ "message": "Order updated" })))
}

/// DELETE /orders/{id}
pub async fn delete_order(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(order_id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    verify_order(&state, order_id, identity.user_id).await?;

    db::orders::delete(&state.pool, order_id).await?;

    tracing::info!(user_id = identity.user_id, order_id, "order deleted");

    Ok(Json(json!({ "message": "Order deleted" })))
}
