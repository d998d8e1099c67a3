use crate::{
    errors::ServiceError,
    services::inventory::{AdjustStockInput, TransferStockInput},
    AppState,
};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::common::{created_response, success_response, Paginated, PaginationParams};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/adjustments", get(list_adjustments).post(adjust_stock))
        .route("/transfers", post(transfer_stock))
        .route("/levels", get(get_level).put(set_level))
}

#[utoipa::path(
    post,
    path = "/api/v1/inventory/adjustments",
    tag = "inventory",
    request_body = AdjustStockInput,
    responses(
        (status = 201, description = "Stock adjusted; audit record returned", body = crate::entities::inventory_adjustment::Model),
        (status = 400, description = "Zero delta or invalid input")
    )
)]
pub async fn adjust_stock(
    State(state): State<AppState>,
    Json(input): Json<AdjustStockInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let (level, adjustment) = state.services.inventory.adjust(input).await?;
    Ok(created_response(serde_json::json!({
        "level": level,
        "adjustment": adjustment,
    })))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AdjustmentFilters {
    pub item_id: Option<Uuid>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    20
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/adjustments",
    tag = "inventory",
    params(AdjustmentFilters),
    responses(
        (status = 200, description = "Audit records, newest first", body = Paginated<crate::entities::inventory_adjustment::Model>)
    )
)]
pub async fn list_adjustments(
    State(state): State<AppState>,
    Query(filters): Query<AdjustmentFilters>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state
        .services
        .inventory
        .list_adjustments(filters.item_id, filters.page, filters.limit)
        .await?;
    Ok(success_response(Paginated::new(
        items,
        total,
        PaginationParams {
            page: filters.page,
            limit: filters.limit,
        },
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/inventory/transfers",
    tag = "inventory",
    request_body = TransferStockInput,
    responses(
        (status = 201, description = "Stock moved; both audit records returned", body = [crate::entities::inventory_adjustment::Model]),
        (status = 400, description = "Non-positive quantity or same location")
    )
)]
pub async fn transfer_stock(
    State(state): State<AppState>,
    Json(input): Json<TransferStockInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let adjustments = state.services.inventory.transfer(input).await?;
    Ok(created_response(adjustments))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LevelQuery {
    pub item_id: Uuid,
    pub location_id: Uuid,
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/levels",
    tag = "inventory",
    params(LevelQuery),
    responses(
        (status = 200, description = "Stock row for the item at the location, or null", body = Option<crate::entities::item_location::Model>)
    )
)]
pub async fn get_level(
    State(state): State<AppState>,
    Query(query): Query<LevelQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let level = state
        .services
        .inventory
        .get_level(query.item_id, query.location_id)
        .await?;
    Ok(success_response(level))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetLevelRequest {
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub on_hand: i32,
    pub created_by: Option<String>,
}

#[utoipa::path(
    put,
    path = "/api/v1/inventory/levels",
    tag = "inventory",
    request_body = SetLevelRequest,
    responses(
        (status = 200, description = "On-hand set; audit record returned"),
        (status = 400, description = "Already at the requested level")
    )
)]
pub async fn set_level(
    State(state): State<AppState>,
    Json(request): Json<SetLevelRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let (level, adjustment) = state
        .services
        .inventory
        .set_level(
            request.item_id,
            request.location_id,
            request.on_hand,
            request.created_by,
        )
        .await?;
    Ok(success_response(serde_json::json!({
        "level": level,
        "adjustment": adjustment,
    })))
}
