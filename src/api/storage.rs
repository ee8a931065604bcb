//! `/api/storage` routes: BackupStorageLocations and bucket validation

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use tracing::info;

use super::{ApiError, ApiJson, ApiResult, AppState};
use crate::adapters::{build_bsl_patch, validate_storage, S3Target};
use crate::metrics;
use crate::models::{
    non_blank, BackupStorageLocationResponse, UpdateBslRequest, ValidateStorageRequest,
    ValidateStorageResponse,
};

const KIND: &str = "BackupStorageLocation";

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/bsl", get(list_locations).patch(update_location))
        .route("/bsl/{name}", get(get_location))
        .route("/validate", post(validate))
}

async fn list_locations(
    State(state): State<AppState>,
) -> ApiResult<Vec<BackupStorageLocationResponse>> {
    let locations = state.velero.list_backup_storage_locations().await?;

    Ok(Json(
        locations
            .iter()
            .map(BackupStorageLocationResponse::from)
            .collect(),
    ))
}

async fn get_location(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<BackupStorageLocationResponse> {
    let location = state
        .velero
        .get_backup_storage_location(&name)
        .await
        .map_err(|e| ApiError::lookup(e, KIND, &name))?;

    Ok(Json(BackupStorageLocationResponse::from(&location)))
}

/// Apply a partial update holding only the supplied fields
async fn update_location(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UpdateBslRequest>,
) -> ApiResult<BackupStorageLocationResponse> {
    let patch = build_bsl_patch(&request);
    info!(name = %request.name, patch = %patch, "Updating BackupStorageLocation");

    let updated = state
        .velero
        .patch_backup_storage_location(&request.name, &patch)
        .await
        .map_err(|e| ApiError::lookup(e, KIND, &request.name))?;

    Ok(Json(BackupStorageLocationResponse::from(&updated)))
}

/// Check an S3-compatible bucket. Credentials missing from the request fall
/// back to the configured defaults.
async fn validate(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ValidateStorageRequest>,
) -> Json<ValidateStorageResponse> {
    info!(endpoint = %request.s3_url, bucket = %request.bucket, "Validating storage");

    let target = S3Target {
        endpoint: request.s3_url.clone(),
        region: non_blank(&request.region),
        access_key: non_blank(&request.access_key)
            .or_else(|| non_blank(&state.settings.s3_access_key)),
        secret_key: non_blank(&request.secret_key)
            .or_else(|| non_blank(&state.settings.s3_secret_key)),
    };

    let store = state.storage.connect(&target).await;
    let prefix = non_blank(&request.prefix);
    let response = validate_storage(store.as_ref(), &request.bucket, prefix.as_deref()).await;

    let outcome = if response.success { "success" } else { "failure" };
    metrics::STORAGE_VALIDATIONS
        .with_label_values(&[outcome])
        .inc();

    Json(response)
}
