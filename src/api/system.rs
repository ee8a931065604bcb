//! Service info, health and Velero component status routes

use axum::{extract::State, response::Json};

use super::{ApiResult, AppState};
use crate::models::{HealthResponse, NodeAgentResponse, RepositoryResponse, ServiceInfo};

/// Display name reported by `GET /`
pub const SERVICE_NAME: &str = "Velero Dashboard API";

/// `GET /`
pub(super) async fn root(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cluster: state.settings.cluster_name.clone(),
        velero_namespace: state.settings.velero_namespace.clone(),
    })
}

/// `GET /health`
pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// `GET /api/repositories`
pub(super) async fn list_repositories(
    State(state): State<AppState>,
) -> ApiResult<Vec<RepositoryResponse>> {
    let repositories = state.velero.list_backup_repositories().await?;

    Ok(Json(
        repositories.iter().map(RepositoryResponse::from).collect(),
    ))
}

/// `GET /api/node-agents`
pub(super) async fn list_node_agents(
    State(state): State<AppState>,
) -> ApiResult<Vec<NodeAgentResponse>> {
    let pods = state.velero.list_node_agent_pods().await?;

    Ok(Json(pods.iter().map(NodeAgentResponse::from).collect()))
}
