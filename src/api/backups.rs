//! `/api/backups` routes

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use tracing::{debug, info};

use super::{ApiError, ApiJson, ApiResult, AppState};
use crate::adapters::{build_backup, build_backup_log_request, download_request_name};
use crate::models::{
    sort_newest_first, BackupLogsResponse, BackupResponse, CreateBackupRequest, MessageResponse,
    PodVolumeBackupResponse,
};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_backups).post(create_backup))
        .route("/{name}", get(get_backup).delete(delete_backup))
        .route("/{name}/logs", get(get_backup_logs))
        .route("/{name}/volume-backups", get(list_volume_backups))
}

/// List backups, newest first
async fn list_backups(State(state): State<AppState>) -> ApiResult<Vec<BackupResponse>> {
    let backups = state.velero.list_backups().await?;

    let mut items: Vec<BackupResponse> = backups.iter().map(BackupResponse::from).collect();
    sort_newest_first(&mut items, |b| b.start_timestamp.as_str());

    Ok(Json(items))
}

async fn get_backup(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<BackupResponse> {
    let backup = state
        .velero
        .get_backup(&name)
        .await
        .map_err(|e| ApiError::lookup(e, "Backup", &name))?;

    Ok(Json(BackupResponse::from(&backup)))
}

async fn create_backup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateBackupRequest>,
) -> ApiResult<BackupResponse> {
    info!(name = %request.name, "Creating backup");

    let created = state.velero.create_backup(&build_backup(&request)).await?;

    Ok(Json(BackupResponse::from(&created)))
}

async fn delete_backup(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<MessageResponse> {
    info!(name = %name, "Deleting backup");

    state
        .velero
        .delete_backup(&name)
        .await
        .map_err(|e| ApiError::lookup(e, "Backup", &name))?;

    Ok(Json(MessageResponse::new(format!(
        "Backup '{}' deleted successfully",
        name
    ))))
}

/// Ask Velero for a signed URL to the backup's logs.
///
/// A backup has a single DownloadRequest, created on first use and reused
/// until Velero expires it. It is read once per call; when the controller has
/// not yet published a URL the caller is told to retry.
async fn get_backup_logs(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<BackupLogsResponse> {
    state
        .velero
        .get_backup(&name)
        .await
        .map_err(|e| ApiError::lookup(e, "Backup", &name))?;

    let request_name = download_request_name(&name);
    let current = match state.velero.get_download_request(&request_name).await {
        Ok(existing) => {
            debug!(backup = %name, request = %request_name, "Reusing log download request");
            existing
        }
        Err(e) if e.is_not_found() => {
            state
                .velero
                .create_download_request(&build_backup_log_request(&name))
                .await?;
            info!(backup = %name, request = %request_name, "Requested backup logs");
            state.velero.get_download_request(&request_name).await?
        }
        Err(e) => return Err(e.into()),
    };
    let url = current.status.and_then(|s| s.download_url);

    Ok(Json(BackupLogsResponse::from_download_url(url)))
}

async fn list_volume_backups(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Vec<PodVolumeBackupResponse>> {
    let volume_backups = state.velero.list_pod_volume_backups(&name).await?;

    Ok(Json(
        volume_backups
            .iter()
            .map(PodVolumeBackupResponse::from)
            .collect(),
    ))
}
