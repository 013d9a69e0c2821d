//! HTTP routes for cafeteria-server

pub mod auth;
pub mod health;
pub mod menu;
pub mod orders;

use axum::routing::{get, post};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::auth_middleware;
use crate::error::ApiError;
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, ApiError>;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Public: no token required. Logout sits here as well — it inspects the
    // Authorization header itself and acks regardless of token validity.
    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/orders/menu", get(menu::list_menu));

    // Order routes: bearer-token authenticated, scoped to the caller.
    let protected = Router::new()
        .route(
            "/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route(
            "/orders/{id}",
            get(orders::get_order)
                .put(orders::edit_order)
                .delete(orders::delete_order),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
