//! Velero Backup custom resource

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Backup resource specification
///
/// Also used as the backup template embedded in a Schedule.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "velero.io",
    version = "v1",
    kind = "Backup",
    plural = "backups",
    singular = "backup",
    namespaced,
    status = "BackupStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct BackupSpec {
    /// Namespaces to include (empty = all)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included_namespaces: Option<Vec<String>>,

    /// Namespaces to exclude
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded_namespaces: Option<Vec<String>>,

    /// Resources to include (empty = all)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included_resources: Option<Vec<String>>,

    /// Resources to exclude
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded_resources: Option<Vec<String>>,

    /// Retention, e.g. "720h0m0s"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,

    /// BackupStorageLocation name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_volumes: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_volumes_to_fs_backup: Option<bool>,

    /// Keys not modelled above (hooks, label selectors, ...), kept verbatim
    #[serde(flatten)]
    #[schemars(skip)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Backup status, written by the Velero backup controller
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackupStatus {
    /// Current phase (New, InProgress, Completed, PartiallyFailed, Failed, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    /// Start time, RFC 3339
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<String>,

    /// Completion time, RFC 3339
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_timestamp: Option<String>,

    /// When the backup is garbage collected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}
