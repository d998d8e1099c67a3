use crate::{
    errors::ServiceError,
    services::collections::{CreateCollectionInput, UpdateCollectionInput},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{created_response, no_content_response, success_response, Paginated, PaginationParams};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_collections).post(create_collection))
        .route(
            "/:id",
            get(get_collection)
                .put(update_collection)
                .delete(delete_collection),
        )
        .route("/:id/products", get(list_collection_products).post(bulk_assign_products))
        .route(
            "/:id/products/:product_id",
            post(link_product).delete(unlink_product),
        )
}

#[utoipa::path(
    post,
    path = "/api/v1/collections",
    tag = "collections",
    request_body = CreateCollectionInput,
    responses(
        (status = 201, description = "Collection created", body = crate::entities::collection::Model)
    )
)]
pub async fn create_collection(
    State(state): State<AppState>,
    Json(input): Json<CreateCollectionInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let collection = state.services.collections.create(input).await?;
    Ok(created_response(collection))
}

#[utoipa::path(
    get,
    path = "/api/v1/collections",
    tag = "collections",
    params(PaginationParams),
    responses(
        (status = 200, description = "Collections listed", body = Paginated<crate::entities::collection::Model>)
    )
)]
pub async fn list_collections(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state
        .services
        .collections
        .list(params.page, params.limit)
        .await?;
    Ok(success_response(Paginated::new(items, total, params)))
}

#[utoipa::path(
    get,
    path = "/api/v1/collections/{id}",
    tag = "collections",
    params(("id" = Uuid, Path, description = "Collection id")),
    responses(
        (status = 200, description = "Collection found", body = crate::entities::collection::Model),
        (status = 404, description = "Collection not found")
    )
)]
pub async fn get_collection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let collection = state.services.collections.get(id).await?;
    Ok(success_response(collection))
}

#[utoipa::path(
    put,
    path = "/api/v1/collections/{id}",
    tag = "collections",
    params(("id" = Uuid, Path, description = "Collection id")),
    request_body = UpdateCollectionInput,
    responses(
        (status = 200, description = "Collection updated", body = crate::entities::collection::Model),
        (status = 404, description = "Collection not found")
    )
)]
pub async fn update_collection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCollectionInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let collection = state.services.collections.update(id, input).await?;
    Ok(success_response(collection))
}

#[utoipa::path(
    delete,
    path = "/api/v1/collections/{id}",
    tag = "collections",
    params(("id" = Uuid, Path, description = "Collection id")),
    responses(
        (status = 204, description = "Collection deleted"),
        (status = 404, description = "Collection not found")
    )
)]
pub async fn delete_collection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.collections.delete(id).await?;
    Ok(no_content_response())
}

#[utoipa::path(
    get,
    path = "/api/v1/collections/{id}/products",
    tag = "collections",
    params(("id" = Uuid, Path, description = "Collection id")),
    responses(
        (status = 200, description = "Products in the collection", body = [crate::entities::product::Model]),
        (status = 404, description = "Collection not found")
    )
)]
pub async fn list_collection_products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let products = state.services.collections.list_products(id).await?;
    Ok(success_response(products))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkAssignRequest {
    pub product_ids: Vec<Uuid>,
}

#[utoipa::path(
    post,
    path = "/api/v1/collections/{id}/products",
    tag = "collections",
    params(("id" = Uuid, Path, description = "Collection id")),
    request_body = BulkAssignRequest,
    responses(
        (status = 200, description = "Products linked"),
        (status = 404, description = "A product was not found; nothing linked")
    )
)]
pub async fn bulk_assign_products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<BulkAssignRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let linked = state
        .services
        .collections
        .bulk_assign(id, request.product_ids)
        .await?;
    Ok(success_response(serde_json::json!({ "linked": linked })))
}

#[utoipa::path(
    post,
    path = "/api/v1/collections/{id}/products/{product_id}",
    tag = "collections",
    params(
        ("id" = Uuid, Path, description = "Collection id"),
        ("product_id" = Uuid, Path, description = "Product id")
    ),
    responses(
        (status = 204, description = "Product linked"),
        (status = 404, description = "Collection or product not found")
    )
)]
pub async fn link_product(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.collections.link_product(id, product_id).await?;
    Ok(no_content_response())
}

#[utoipa::path(
    delete,
    path = "/api/v1/collections/{id}/products/{product_id}",
    tag = "collections",
    params(
        ("id" = Uuid, Path, description = "Collection id"),
        ("product_id" = Uuid, Path, description = "Product id")
    ),
    responses(
        (status = 204, description = "Product unlinked")
    )
)]
pub async fn unlink_product(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .collections
        .unlink_product(id, product_id)
        .await?;
    Ok(no_content_response())
}
