//! HTTP layer: thin translation between requests and the service layer.
//! Handlers validate input shape, call one service method, and wrap the
//! result; all domain rules live below.

pub mod collections;
pub mod common;
pub mod health;
pub mod inventory;
pub mod legacy;
pub mod locations;
pub mod media;
pub mod orders;
pub mod products;

use crate::AppState;
use axum::Router;

/// All API routes mounted under `/api/v1`.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/items", products::items_router())
        .nest("/option-sets", products::option_sets_router())
        .nest("/collections", collections::router())
        .nest("/inventory", inventory::router())
        .nest("/locations", locations::router())
        .nest("/orders", orders::router())
        .nest("/media", media::router())
        .nest("/admin/legacy-stock", legacy::router())
}
