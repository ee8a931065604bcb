//! System status models: service info, backup repositories, node agents

use k8s_openapi::api::core::v1::Pod;
use serde::{Deserialize, Serialize};

use crate::crd::BackupRepository;

use super::object_name;

/// Body of `GET /`
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub name: String,

    pub version: String,

    pub cluster: String,

    #[serde(alias = "velero_namespace")]
    pub velero_namespace: String,
}

/// Body of `GET /health`
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Backup repository status
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryResponse {
    pub name: String,

    pub phase: String,

    #[serde(alias = "maintenance_frequency")]
    pub maintenance_frequency: Option<String>,

    #[serde(alias = "last_maintenance_time")]
    pub last_maintenance_time: Option<String>,

    pub message: String,
}

impl From<&BackupRepository> for RepositoryResponse {
    fn from(repo: &BackupRepository) -> Self {
        let status = repo.status.clone().unwrap_or_default();

        Self {
            name: object_name(&repo.metadata),
            phase: status.phase.unwrap_or_else(|| "Unknown".to_string()),
            maintenance_frequency: repo.spec.maintenance_frequency.clone(),
            last_maintenance_time: status.last_maintenance_time,
            message: status.message.unwrap_or_default(),
        }
    }
}

/// Node agent pod status
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAgentResponse {
    pub name: String,

    #[serde(alias = "node_name")]
    pub node_name: String,

    /// Pod phase
    pub status: String,

    /// Restarts of the first container
    #[serde(alias = "restart_count")]
    pub restart_count: i32,
}

impl From<&Pod> for NodeAgentResponse {
    fn from(pod: &Pod) -> Self {
        let status = pod.status.as_ref();

        Self {
            name: object_name(&pod.metadata),
            node_name: pod
                .spec
                .as_ref()
                .and_then(|s| s.node_name.clone())
                .unwrap_or_default(),
            status: status
                .and_then(|s| s.phase.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            restart_count: status
                .and_then(|s| s.container_statuses.as_ref())
                .and_then(|c| c.first())
                .map(|c| c.restart_count)
                .unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{ContainerStatus, PodSpec, PodStatus};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    #[test]
    fn test_node_agent_uses_first_container() {
        let pod = Pod {
            metadata: ObjectMeta {
                name: Some("node-agent-abc".to_string()),
                ..Default::default()
            },
            spec: Some(PodSpec {
                node_name: Some("worker-1".to_string()),
                ..Default::default()
            }),
            status: Some(PodStatus {
                phase: Some("Running".to_string()),
                container_statuses: Some(vec![
                    ContainerStatus {
                        name: "node-agent".to_string(),
                        restart_count: 3,
                        ..Default::default()
                    },
                    ContainerStatus {
                        name: "sidecar".to_string(),
                        restart_count: 9,
                        ..Default::default()
                    },
                ]),
                ..Default::default()
            }),
        };
        let resp = NodeAgentResponse::from(&pod);
        assert_eq!(resp.node_name, "worker-1");
        assert_eq!(resp.status, "Running");
        assert_eq!(resp.restart_count, 3);
    }

    #[test]
    fn test_node_agent_defaults() {
        let resp = NodeAgentResponse::from(&Pod::default());
        assert_eq!(resp.name, "");
        assert_eq!(resp.status, "Unknown");
        assert_eq!(resp.restart_count, 0);
    }

    #[test]
    fn test_repository_defaults() {
        let repo = BackupRepository {
            metadata: ObjectMeta {
                name: Some("app-default-kopia".to_string()),
                ..Default::default()
            },
            spec: Default::default(),
            status: None,
        };
        let resp = RepositoryResponse::from(&repo);
        assert_eq!(resp.phase, "Unknown");
        assert_eq!(resp.message, "");
        assert_eq!(resp.maintenance_frequency, None);
    }
}
