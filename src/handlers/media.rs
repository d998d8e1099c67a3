use crate::{errors::ServiceError, AppState};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::common::success_response;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload-url", post(upload_url))
        .route("/download-url", get(download_url))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadUrlRequest {
    /// Object path, e.g. `products/abc.jpg`.
    pub path: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/media/upload-url",
    tag = "media",
    request_body = UploadUrlRequest,
    responses(
        (status = 200, description = "Presigned upload URL", body = crate::services::media::SignedUrl),
        (status = 400, description = "Invalid object path")
    )
)]
pub async fn upload_url(
    State(state): State<AppState>,
    Json(request): Json<UploadUrlRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let signed = state.services.media.upload_url(&request.path)?;
    Ok(success_response(signed))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DownloadUrlQuery {
    pub path: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/media/download-url",
    tag = "media",
    params(DownloadUrlQuery),
    responses(
        (status = 200, description = "Presigned download URL", body = crate::services::media::SignedUrl),
        (status = 400, description = "Invalid object path")
    )
)]
pub async fn download_url(
    State(state): State<AppState>,
    Query(query): Query<DownloadUrlQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let signed = state.services.media.download_url(&query.path)?;
    Ok(success_response(signed))
}
