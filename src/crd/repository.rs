//! Read-only Velero resources surfaced by the system status views:
//! BackupRepository, PodVolumeBackup and DownloadRequest.

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// BackupRepository resource specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "velero.io",
    version = "v1",
    kind = "BackupRepository",
    plural = "backuprepositories",
    singular = "backuprepository",
    namespaced,
    status = "BackupRepositoryStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct BackupRepositorySpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_namespace: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_storage_location: Option<String>,

    /// kopia or restic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub restic_identifier: Option<String>,

    /// Maintenance interval, e.g. "1h0m0s"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_frequency: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackupRepositoryStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_maintenance_time: Option<String>,
}

/// PodVolumeBackup resource specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "velero.io",
    version = "v1",
    kind = "PodVolumeBackup",
    plural = "podvolumebackups",
    singular = "podvolumebackup",
    namespaced,
    status = "PodVolumeBackupStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct PodVolumeBackupSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,

    /// Pod owning the volume
    #[serde(default)]
    pub pod: PodReference,

    /// Volume name within the pod
    #[serde(default)]
    pub volume: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_storage_location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploader_type: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PodReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PodVolumeBackupStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_timestamp: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<VolumeProgress>,
}

/// Bytes transferred for a pod volume operation
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolumeProgress {
    #[serde(default)]
    pub total_bytes: i64,

    #[serde(default)]
    pub bytes_done: i64,
}

/// DownloadRequest resource specification
///
/// Asks the Velero server to publish a signed URL for a backup artifact.
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "velero.io",
    version = "v1",
    kind = "DownloadRequest",
    plural = "downloadrequests",
    singular = "downloadrequest",
    namespaced,
    status = "DownloadRequestStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequestSpec {
    pub target: DownloadTarget,
}

#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadTarget {
    /// BackupLog, BackupContents, RestoreLog, ...
    pub kind: String,

    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequestStatus {
    /// New or Processed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    #[serde(rename = "downloadURL", skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
}
