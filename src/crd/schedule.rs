//! Velero Schedule custom resource

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::BackupSpec;

/// Schedule resource specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "velero.io",
    version = "v1",
    kind = "Schedule",
    plural = "schedules",
    singular = "schedule",
    namespaced,
    status = "ScheduleStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSpec {
    /// Cron expression
    #[serde(default)]
    pub schedule: String,

    /// Backup template applied to every scheduled run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<BackupSpec>,

    /// Paused schedules produce no backups
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_owner_references_in_backup: Option<bool>,
}

/// Schedule status
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleStatus {
    /// Current phase (New, Enabled, FailedValidation)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    /// Time of the last backup produced by this schedule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_backup: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_errors: Vec<String>,
}
