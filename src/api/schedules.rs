//! `/api/schedules` routes

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use tracing::info;

use super::{ApiError, ApiJson, ApiResult, AppState};
use crate::adapters::build_schedule;
use crate::models::{CreateScheduleRequest, MessageResponse, ScheduleResponse};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_schedules).post(create_schedule))
        .route("/{name}", get(get_schedule).delete(delete_schedule))
}

async fn list_schedules(State(state): State<AppState>) -> ApiResult<Vec<ScheduleResponse>> {
    let schedules = state.velero.list_schedules().await?;

    Ok(Json(schedules.iter().map(ScheduleResponse::from).collect()))
}

async fn get_schedule(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<ScheduleResponse> {
    let schedule = state
        .velero
        .get_schedule(&name)
        .await
        .map_err(|e| ApiError::lookup(e, "Schedule", &name))?;

    Ok(Json(ScheduleResponse::from(&schedule)))
}

async fn create_schedule(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateScheduleRequest>,
) -> ApiResult<ScheduleResponse> {
    info!(name = %request.name, schedule = %request.schedule, "Creating schedule");

    let created = state
        .velero
        .create_schedule(&build_schedule(&request))
        .await?;

    Ok(Json(ScheduleResponse::from(&created)))
}

/// Delete a schedule. Backups it already produced are left in place.
async fn delete_schedule(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<MessageResponse> {
    info!(name = %name, "Deleting schedule");

    state
        .velero
        .delete_schedule(&name)
        .await
        .map_err(|e| ApiError::lookup(e, "Schedule", &name))?;

    Ok(Json(MessageResponse::new(format!(
        "Schedule '{}' deleted successfully",
        name
    ))))
}
