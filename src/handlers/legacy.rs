//! Operator endpoints for the legacy stock-field backfill. Mounted under
//! `/admin` and meant to be run supervised, not on a schedule.

use crate::{errors::ServiceError, AppState};
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use super::common::success_response;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/run", post(run_migration))
        .route("/cleanup", post(run_cleanup))
        .route("/verify", get(run_verify))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/legacy-stock/run",
    tag = "admin",
    responses(
        (status = 200, description = "Backfill finished", body = crate::legacy::MigrationReport)
    )
)]
pub async fn run_migration(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let report = state.services.legacy.run().await?;
    Ok(success_response(report))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/legacy-stock/cleanup",
    tag = "admin",
    responses(
        (status = 200, description = "Legacy fields nulled on migrated records", body = crate::legacy::CleanupReport)
    )
)]
pub async fn run_cleanup(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let report = state.services.legacy.cleanup().await?;
    Ok(success_response(report))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/legacy-stock/verify",
    tag = "admin",
    responses(
        (status = 200, description = "Per-record migration classification", body = crate::legacy::VerifyReport)
    )
)]
pub async fn run_verify(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let report = state.services.legacy.verify().await?;
    Ok(success_response(report))
}
