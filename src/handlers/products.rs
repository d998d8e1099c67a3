use crate::{
    errors::ServiceError,
    services::products::{
        CreateItemInput, CreateOptionSetInput, CreateProductInput, UpdateItemInput,
        UpdateProductInput,
    },
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::common::{created_response, no_content_response, success_response, Paginated, PaginationParams};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/bulk-delete", post(bulk_delete_products))
        .route("/:id/option-sets", get(list_product_option_sets))
        .route(
            "/:id/option-sets/:option_set_id",
            post(attach_option_set).delete(detach_option_set),
        )
}

pub fn items_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
        .route("/:id/stock", get(item_stock))
}

pub fn option_sets_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_option_sets).post(create_option_set))
        .route("/:id", delete(delete_option_set))
        .route("/:id/values", get(list_option_set_values))
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "products",
    request_body = CreateProductInput,
    responses(
        (status = 201, description = "Product created", body = crate::entities::product::Model),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.products.create(input).await?;
    Ok(created_response(product))
}

#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "products",
    params(PaginationParams),
    responses(
        (status = 200, description = "Products listed", body = Paginated<crate::entities::product::Model>)
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state.services.products.list(params.page, params.limit).await?;
    Ok(success_response(Paginated::new(items, total, params)))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    tag = "products",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = crate::entities::product::Model),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.products.get(id).await?;
    Ok(success_response(product))
}

#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    tag = "products",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = UpdateProductInput,
    responses(
        (status = 200, description = "Product updated", body = crate::entities::product::Model),
        (status = 404, description = "Product not found")
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.products.update(id, input).await?;
    Ok(success_response(product))
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    tag = "products",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.products.delete(id).await?;
    Ok(no_content_response())
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkDeleteRequest {
    pub ids: Vec<Uuid>,
}

#[utoipa::path(
    post,
    path = "/api/v1/products/bulk-delete",
    tag = "products",
    request_body = BulkDeleteRequest,
    responses(
        (status = 200, description = "Products deleted"),
        (status = 404, description = "A product was not found; nothing deleted")
    )
)]
pub async fn bulk_delete_products(
    State(state): State<AppState>,
    Json(request): Json<BulkDeleteRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let deleted = state.services.products.bulk_delete(request.ids).await?;
    Ok(success_response(serde_json::json!({ "deleted": deleted })))
}

// --- Items ---

#[derive(Debug, Deserialize, IntoParams)]
pub struct ItemFilters {
    pub product_id: Option<Uuid>,
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
    post,
    path = "/api/v1/items",
    tag = "items",
    request_body = CreateItemInput,
    responses(
        (status = 201, description = "Item created", body = crate::entities::item::Model),
        (status = 404, description = "Parent product not found")
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    Json(input): Json<CreateItemInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.products.create_item(input).await?;
    Ok(created_response(item))
}

#[utoipa::path(
    get,
    path = "/api/v1/items",
    tag = "items",
    params(ItemFilters),
    responses(
        (status = 200, description = "Items listed", body = Paginated<crate::entities::item::Model>)
    )
)]
pub async fn list_items(
    State(state): State<AppState>,
    Query(filters): Query<ItemFilters>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state
        .services
        .products
        .list_items(filters.product_id, filters.page, filters.limit)
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
    get,
    path = "/api/v1/items/{id}",
    tag = "items",
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item found", body = crate::entities::item::Model),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.products.get_item(id).await?;
    Ok(success_response(item))
}

#[utoipa::path(
    put,
    path = "/api/v1/items/{id}",
    tag = "items",
    params(("id" = Uuid, Path, description = "Item id")),
    request_body = UpdateItemInput,
    responses(
        (status = 200, description = "Item updated", body = crate::entities::item::Model),
        (status = 404, description = "Item not found")
    )
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateItemInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.products.update_item(id, input).await?;
    Ok(success_response(item))
}

#[utoipa::path(
    delete,
    path = "/api/v1/items/{id}",
    tag = "items",
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.products.delete_item(id).await?;
    Ok(no_content_response())
}

#[utoipa::path(
    get,
    path = "/api/v1/items/{id}/stock",
    tag = "items",
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 200, description = "Stock view for the item", body = crate::services::inventory::ItemStockView),
        (status = 404, description = "Item not found")
    )
)]
pub async fn item_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let view = state.services.inventory.item_stock(id).await?;
    Ok(success_response(view))
}

// --- Option sets ---

#[utoipa::path(
    post,
    path = "/api/v1/option-sets",
    tag = "option-sets",
    request_body = CreateOptionSetInput,
    responses(
        (status = 201, description = "Option set created with its values")
    )
)]
pub async fn create_option_set(
    State(state): State<AppState>,
    Json(input): Json<CreateOptionSetInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let (set, values) = state.services.products.create_option_set(input).await?;
    Ok(created_response(serde_json::json!({
        "option_set": set,
        "values": values,
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/option-sets",
    tag = "option-sets",
    responses(
        (status = 200, description = "Option sets listed", body = [crate::entities::option_set::Model])
    )
)]
pub async fn list_option_sets(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let sets = state.services.products.list_option_sets().await?;
    Ok(success_response(sets))
}

#[utoipa::path(
    get,
    path = "/api/v1/option-sets/{id}/values",
    tag = "option-sets",
    params(("id" = Uuid, Path, description = "Option set id")),
    responses(
        (status = 200, description = "Values in display order", body = [crate::entities::option_value::Model])
    )
)]
pub async fn list_option_set_values(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let values = state.services.products.option_set_values(id).await?;
    Ok(success_response(values))
}

#[utoipa::path(
    delete,
    path = "/api/v1/option-sets/{id}",
    tag = "option-sets",
    params(("id" = Uuid, Path, description = "Option set id")),
    responses(
        (status = 204, description = "Option set deleted"),
        (status = 404, description = "Option set not found")
    )
)]
pub async fn delete_option_set(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.products.delete_option_set(id).await?;
    Ok(no_content_response())
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/option-sets",
    tag = "products",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Option sets attached to the product", body = [crate::entities::option_set::Model])
    )
)]
pub async fn list_product_option_sets(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let sets = state.services.products.product_option_sets(id).await?;
    Ok(success_response(sets))
}

#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/option-sets/{option_set_id}",
    tag = "products",
    params(
        ("id" = Uuid, Path, description = "Product id"),
        ("option_set_id" = Uuid, Path, description = "Option set id")
    ),
    responses(
        (status = 204, description = "Option set attached"),
        (status = 404, description = "Product or option set not found")
    )
)]
pub async fn attach_option_set(
    State(state): State<AppState>,
    Path((id, option_set_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .products
        .attach_option_set(id, option_set_id)
        .await?;
    Ok(no_content_response())
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}/option-sets/{option_set_id}",
    tag = "products",
    params(
        ("id" = Uuid, Path, description = "Product id"),
        ("option_set_id" = Uuid, Path, description = "Option set id")
    ),
    responses(
        (status = 204, description = "Option set detached")
    )
)]
pub async fn detach_option_set(
    State(state): State<AppState>,
    Path((id, option_set_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .products
        .detach_option_set(id, option_set_id)
        .await?;
    Ok(no_content_response())
}
