//! `/api/restores` routes, including restores that rewrite resources through
//! Velero resource modifiers

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use tracing::{error, info, warn};

use super::{ApiError, ApiJson, ApiResult, AppState};
use crate::adapters::{build_config_map, build_restore, build_restore_with_modifier, config_map_name};
use crate::metrics;
use crate::models::{
    sort_newest_first, CreateRestoreRequest, CreateRestoreWithModificationsRequest,
    MessageResponse, RestoreResponse,
};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_restores).post(create_restore))
        .route("/with-modifications", post(create_restore_with_modifications))
        .route("/{name}", get(get_restore).delete(delete_restore))
}

/// List restores, newest first
async fn list_restores(State(state): State<AppState>) -> ApiResult<Vec<RestoreResponse>> {
    let restores = state.velero.list_restores().await?;

    let mut items: Vec<RestoreResponse> = restores.iter().map(RestoreResponse::from).collect();
    sort_newest_first(&mut items, |r| r.start_timestamp.as_str());

    Ok(Json(items))
}

async fn get_restore(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<RestoreResponse> {
    let restore = state
        .velero
        .get_restore(&name)
        .await
        .map_err(|e| ApiError::lookup(e, "Restore", &name))?;

    Ok(Json(RestoreResponse::from(&restore)))
}

async fn create_restore(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateRestoreRequest>,
) -> ApiResult<RestoreResponse> {
    info!(name = %request.name, backup = %request.backup_name, "Creating restore");

    let created = state.velero.create_restore(&build_restore(&request)).await?;

    Ok(Json(RestoreResponse::from(&created)))
}

/// Create a restore whose resources are rewritten by the supplied rules.
///
/// The rules are stored in a ConfigMap first. If the Restore itself cannot be
/// created the ConfigMap is deleted again; a failed deletion is only logged
/// and the restore error is returned.
async fn create_restore_with_modifications(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateRestoreWithModificationsRequest>,
) -> ApiResult<RestoreResponse> {
    info!(
        name = %request.name,
        backup = %request.backup_name,
        rules = request.resource_modifier_rules.len(),
        "Creating restore with resource modifiers"
    );

    let config_map = build_config_map(
        state.velero.namespace(),
        &request.name,
        &request.resource_modifier_rules,
    )?;
    let config_map_name = config_map_name(&request.name);

    state.velero.create_config_map(&config_map).await?;
    info!(config_map = %config_map_name, "Created resource modifiers ConfigMap");

    let restore = build_restore_with_modifier(&request, &config_map_name);
    match state.velero.create_restore(&restore).await {
        Ok(created) => Ok(Json(RestoreResponse::from(&created))),
        Err(e) => {
            error!(name = %request.name, error = %e, "Restore creation failed, removing ConfigMap");

            match state.velero.delete_config_map(&config_map_name).await {
                Ok(()) => {
                    info!(config_map = %config_map_name, "Removed resource modifiers ConfigMap");
                    metrics::MODIFIER_CLEANUPS
                        .with_label_values(&["deleted"])
                        .inc();
                }
                Err(cleanup) => {
                    warn!(
                        config_map = %config_map_name,
                        error = %cleanup,
                        "Failed to remove resource modifiers ConfigMap"
                    );
                    metrics::MODIFIER_CLEANUPS
                        .with_label_values(&["failed"])
                        .inc();
                }
            }

            Err(e.into())
        }
    }
}

async fn delete_restore(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<MessageResponse> {
    info!(name = %name, "Deleting restore");

    state
        .velero
        .delete_restore(&name)
        .await
        .map_err(|e| ApiError::lookup(e, "Restore", &name))?;

    Ok(Json(MessageResponse::new(format!(
        "Restore '{}' deleted successfully",
        name
    ))))
}
