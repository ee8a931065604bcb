//! Velero Restore custom resource

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Restore resource specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "velero.io",
    version = "v1",
    kind = "Restore",
    plural = "restores",
    singular = "restore",
    namespaced,
    status = "RestoreStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct RestoreSpec {
    /// Backup to restore from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_name: Option<String>,

    /// Restore from the latest backup of this schedule instead
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub included_namespaces: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded_namespaces: Option<Vec<String>>,

    #[serde(rename = "restorePVs", skip_serializing_if = "Option::is_none")]
    pub restore_pvs: Option<bool>,

    /// Reference to the ConfigMap holding resource modifier rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_modifier: Option<ResourceModifierRef>,
}

/// Typed local object reference used by `spec.resourceModifier`
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceModifierRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_group: Option<String>,

    pub kind: String,

    pub name: String,
}

/// Restore status, written by the Velero restore controller
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestoreStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_timestamp: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}
