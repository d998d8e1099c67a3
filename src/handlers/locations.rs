use crate::{
    errors::ServiceError,
    services::locations::{CreateLocationInput, UpdateLocationInput},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use super::common::{created_response, no_content_response, success_response, Paginated, PaginationParams};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_locations).post(create_location))
        .route("/default", get(get_default_location))
        .route(
            "/:id",
            get(get_location).put(update_location).delete(delete_location),
        )
        .route("/:id/default", post(set_default_location))
}

#[utoipa::path(
    post,
    path = "/api/v1/locations",
    tag = "locations",
    request_body = CreateLocationInput,
    responses(
        (status = 201, description = "Location created", body = crate::entities::location::Model)
    )
)]
pub async fn create_location(
    State(state): State<AppState>,
    Json(input): Json<CreateLocationInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let location = state.services.locations.create(input).await?;
    Ok(created_response(location))
}

#[utoipa::path(
    get,
    path = "/api/v1/locations",
    tag = "locations",
    params(PaginationParams),
    responses(
        (status = 200, description = "Locations listed", body = Paginated<crate::entities::location::Model>)
    )
)]
pub async fn list_locations(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state
        .services
        .locations
        .list(params.page, params.limit)
        .await?;
    Ok(success_response(Paginated::new(items, total, params)))
}

#[utoipa::path(
    get,
    path = "/api/v1/locations/default",
    tag = "locations",
    responses(
        (status = 200, description = "Current default location, or null", body = Option<crate::entities::location::Model>)
    )
)]
pub async fn get_default_location(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let location = state.services.locations.get_default().await?;
    Ok(success_response(location))
}

#[utoipa::path(
    get,
    path = "/api/v1/locations/{id}",
    tag = "locations",
    params(("id" = Uuid, Path, description = "Location id")),
    responses(
        (status = 200, description = "Location found", body = crate::entities::location::Model),
        (status = 404, description = "Location not found")
    )
)]
pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let location = state.services.locations.get(id).await?;
    Ok(success_response(location))
}

#[utoipa::path(
    put,
    path = "/api/v1/locations/{id}",
    tag = "locations",
    params(("id" = Uuid, Path, description = "Location id")),
    request_body = UpdateLocationInput,
    responses(
        (status = 200, description = "Location updated", body = crate::entities::location::Model),
        (status = 400, description = "Attempted to deactivate the default location"),
        (status = 404, description = "Location not found")
    )
)]
pub async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateLocationInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let location = state.services.locations.update(id, input).await?;
    Ok(success_response(location))
}

#[utoipa::path(
    post,
    path = "/api/v1/locations/{id}/default",
    tag = "locations",
    params(("id" = Uuid, Path, description = "Location id")),
    responses(
        (status = 200, description = "Location is now the default", body = crate::entities::location::Model),
        (status = 400, description = "Location is inactive"),
        (status = 404, description = "Location not found")
    )
)]
pub async fn set_default_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let location = state.services.locations.set_default(id).await?;
    Ok(success_response(location))
}

#[utoipa::path(
    delete,
    path = "/api/v1/locations/{id}",
    tag = "locations",
    params(("id" = Uuid, Path, description = "Location id")),
    responses(
        (status = 204, description = "Location deleted"),
        (status = 400, description = "Attempted to delete the default location"),
        (status = 404, description = "Location not found")
    )
)]
pub async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.locations.delete(id).await?;
    Ok(no_content_response())
}
