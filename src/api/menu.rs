//! Public menu endpoint

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::db;
use crate::state::AppState;

use super::ApiResult;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemDto {
    pub id: i64,
    pub name: String,
    pub price: i64,
}

#[derive(Serialize)]
pub struct MenuResponse {
    pub menu: Vec<MenuItemDto>,
}

/// GET /orders/menu
pub async fn list_menu(State(state): State<AppState>) -> ApiResult<MenuResponse> {
    let menu = db::menu::list(&state.pool)
        .await?
        .into_iter()
        .map(|m| MenuItemDto {
            id: m.id,
            name: m.name,
            price: m.price_cents,
        })
        .collect();

    Ok(Json(MenuResponse { menu }))
}
