//! Backup request/response models

use serde::{Deserialize, Serialize};

use crate::crd::{Backup, PodVolumeBackup, VolumeProgress};

use super::{creation_timestamp, object_name, MessageResponse};

/// Backup as shown by the dashboard
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupResponse {
    pub name: String,

    pub phase: String,

    #[serde(alias = "start_timestamp")]
    pub start_timestamp: String,

    #[serde(alias = "completion_timestamp")]
    pub completion_timestamp: Option<String>,

    pub warnings: i64,

    pub errors: i64,

    #[serde(alias = "backup_storage")]
    pub backup_storage: Option<String>,
}

impl From<&Backup> for BackupResponse {
    fn from(backup: &Backup) -> Self {
        let status = backup.status.clone().unwrap_or_default();

        Self {
            name: object_name(&backup.metadata),
            phase: status.phase.unwrap_or_else(|| "New".to_string()),
            start_timestamp: status
                .start_timestamp
                .or_else(|| creation_timestamp(&backup.metadata))
                .unwrap_or_default(),
            completion_timestamp: status.completion_timestamp,
            warnings: status.warnings.unwrap_or(0),
            errors: status.errors.unwrap_or(0),
            backup_storage: Some(
                backup
                    .spec
                    .storage_location
                    .clone()
                    .unwrap_or_else(|| "default".to_string()),
            ),
        }
    }
}

/// Body of `POST /api/backups`
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBackupRequest {
    pub name: String,

    #[serde(default, alias = "included_namespaces")]
    pub included_namespaces: Option<Vec<String>>,

    #[serde(default, alias = "excluded_namespaces")]
    pub excluded_namespaces: Option<Vec<String>>,

    /// Retention, e.g. "720h0m0s"
    #[serde(default)]
    pub ttl: Option<String>,

    #[serde(default, alias = "storage_location")]
    pub storage_location: Option<String>,
}

/// Pod volume backup belonging to a Backup
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodVolumeBackupResponse {
    pub name: String,

    #[serde(alias = "pod_name")]
    pub pod_name: String,

    #[serde(alias = "pod_namespace")]
    pub pod_namespace: String,

    #[serde(alias = "volume_name")]
    pub volume_name: String,

    pub phase: String,

    pub message: String,

    pub progress: VolumeProgress,
}

impl From<&PodVolumeBackup> for PodVolumeBackupResponse {
    fn from(pvb: &PodVolumeBackup) -> Self {
        let status = pvb.status.clone().unwrap_or_default();

        Self {
            name: object_name(&pvb.metadata),
            pod_name: pvb.spec.pod.name.clone().unwrap_or_default(),
            pod_namespace: pvb.spec.pod.namespace.clone().unwrap_or_default(),
            volume_name: pvb.spec.volume.clone(),
            phase: status.phase.unwrap_or_else(|| "New".to_string()),
            message: status.message.unwrap_or_default(),
            progress: status.progress.unwrap_or_default(),
        }
    }
}

/// Result of a backup log lookup
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum BackupLogsResponse {
    Ready {
        #[serde(rename = "downloadUrl")]
        download_url: String,
    },
    Pending(MessageResponse),
}

impl BackupLogsResponse {
    pub fn from_download_url(url: Option<String>) -> Self {
        match url.filter(|u| !u.is_empty()) {
            Some(download_url) => BackupLogsResponse::Ready { download_url },
            None => BackupLogsResponse::Pending(MessageResponse::new("Logs not available yet")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{BackupSpec, BackupStatus};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn backup(status: Option<BackupStatus>) -> Backup {
        Backup {
            metadata: ObjectMeta {
                name: Some("nightly-1".to_string()),
                ..Default::default()
            },
            spec: BackupSpec::default(),
            status,
        }
    }

    #[test]
    fn test_backup_defaults_without_status() {
        let resp = BackupResponse::from(&backup(None));
        assert_eq!(resp.name, "nightly-1");
        assert_eq!(resp.phase, "New");
        assert_eq!(resp.start_timestamp, "");
        assert_eq!(resp.completion_timestamp, None);
        assert_eq!(resp.warnings, 0);
        assert_eq!(resp.errors, 0);
        assert_eq!(resp.backup_storage.as_deref(), Some("default"));
    }

    #[test]
    fn test_backup_status_fields() {
        let resp = BackupResponse::from(&backup(Some(BackupStatus {
            phase: Some("PartiallyFailed".to_string()),
            start_timestamp: Some("2024-01-31T10:00:00Z".to_string()),
            completion_timestamp: Some("2024-01-31T10:05:00Z".to_string()),
            warnings: Some(2),
            errors: Some(1),
            ..Default::default()
        })));
        assert_eq!(resp.phase, "PartiallyFailed");
        assert_eq!(resp.start_timestamp, "2024-01-31T10:00:00Z");
        assert_eq!(resp.completion_timestamp.as_deref(), Some("2024-01-31T10:05:00Z"));
        assert_eq!((resp.warnings, resp.errors), (2, 1));
    }

    #[test]
    fn test_backup_response_uses_camel_case() {
        let json = serde_json::to_value(BackupResponse::from(&backup(None))).unwrap();
        assert!(json.get("startTimestamp").is_some());
        assert!(json.get("backupStorage").is_some());
        assert!(json.get("start_timestamp").is_none());
    }

    #[test]
    fn test_create_request_accepts_both_spellings() {
        let camel: CreateBackupRequest =
            serde_json::from_str(r#"{"name":"b","includedNamespaces":["app"]}"#).unwrap();
        let snake: CreateBackupRequest =
            serde_json::from_str(r#"{"name":"b","included_namespaces":["app"]}"#).unwrap();
        assert_eq!(camel.included_namespaces, snake.included_namespaces);
    }

    #[test]
    fn test_logs_response_shapes() {
        let ready = BackupLogsResponse::from_download_url(Some("https://s3/logs".to_string()));
        assert_eq!(
            serde_json::to_value(&ready).unwrap(),
            serde_json::json!({"downloadUrl": "https://s3/logs"})
        );
        let pending = BackupLogsResponse::from_download_url(None);
        assert_eq!(
            serde_json::to_value(&pending).unwrap(),
            serde_json::json!({"message": "Logs not available yet"})
        );
    }

    #[test]
    fn test_pod_volume_backup_defaults_without_status() {
        let pvb = PodVolumeBackup {
            metadata: ObjectMeta {
                name: Some("nightly-1-abcde".to_string()),
                ..Default::default()
            },
            spec: Default::default(),
            status: None,
        };

        let resp = PodVolumeBackupResponse::from(&pvb);
        assert_eq!(resp.name, "nightly-1-abcde");
        assert_eq!(resp.pod_name, "");
        assert_eq!(resp.pod_namespace, "");
        assert_eq!(resp.phase, "New");
        assert_eq!(resp.message, "");
        assert_eq!(resp.progress, VolumeProgress::default());

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["progress"], serde_json::json!({"totalBytes": 0, "bytesDone": 0}));
    }
}
