//! Builders turning dashboard requests into Velero resources and patches
//!
//! Only populated optional fields are carried over; empty lists and empty
//! strings are treated as unset.

use serde_json::{json, Map, Value};

use crate::crd::{
    Backup, BackupSpec, DownloadRequest, DownloadRequestSpec, DownloadTarget, ResourceModifierRef,
    Restore, RestoreSpec, Schedule, ScheduleSpec,
};
use crate::models::{
    non_blank, non_empty, CreateBackupRequest, CreateRestoreRequest,
    CreateRestoreWithModificationsRequest, CreateScheduleRequest, UpdateBslRequest,
};

/// Build a Backup from a create request
pub fn build_backup(request: &CreateBackupRequest) -> Backup {
    Backup::new(
        &request.name,
        BackupSpec {
            included_namespaces: non_empty(&request.included_namespaces),
            excluded_namespaces: non_empty(&request.excluded_namespaces),
            ttl: non_blank(&request.ttl),
            storage_location: non_blank(&request.storage_location),
            ..Default::default()
        },
    )
}

/// Build a Restore from a create request
pub fn build_restore(request: &CreateRestoreRequest) -> Restore {
    Restore::new(
        &request.name,
        RestoreSpec {
            backup_name: Some(request.backup_name.clone()),
            included_namespaces: non_empty(&request.included_namespaces),
            excluded_namespaces: non_empty(&request.excluded_namespaces),
            ..Default::default()
        },
    )
}

/// Build a Restore that applies the resource modifiers stored in `config_map_name`
pub fn build_restore_with_modifier(
    request: &CreateRestoreWithModificationsRequest,
    config_map_name: &str,
) -> Restore {
    Restore::new(
        &request.name,
        RestoreSpec {
            backup_name: Some(request.backup_name.clone()),
            included_namespaces: non_empty(&request.included_namespaces),
            excluded_namespaces: non_empty(&request.excluded_namespaces),
            resource_modifier: Some(ResourceModifierRef {
                api_group: None,
                kind: "ConfigMap".to_string(),
                name: config_map_name.to_string(),
            }),
            ..Default::default()
        },
    )
}

/// Build a Schedule from a create request. The template is always present,
/// even when empty.
pub fn build_schedule(request: &CreateScheduleRequest) -> Schedule {
    Schedule::new(
        &request.name,
        ScheduleSpec {
            schedule: request.schedule.clone(),
            template: Some(BackupSpec {
                included_namespaces: non_empty(&request.included_namespaces),
                excluded_namespaces: non_empty(&request.excluded_namespaces),
                ttl: non_blank(&request.ttl),
                ..Default::default()
            }),
            ..Default::default()
        },
    )
}

/// Build a merge patch for a BackupStorageLocation holding only the fields
/// the caller supplied.
///
/// The prefix is only sent together with a bucket. A request with nothing to
/// change yields `{"spec": {}}`.
pub fn build_bsl_patch(request: &UpdateBslRequest) -> Value {
    let mut spec = Map::new();

    if let Some(bucket) = non_blank(&request.bucket) {
        let mut object_storage = Map::new();
        object_storage.insert("bucket".to_string(), json!(bucket));
        if let Some(prefix) = non_blank(&request.prefix) {
            object_storage.insert("prefix".to_string(), json!(prefix));
        }
        spec.insert("objectStorage".to_string(), Value::Object(object_storage));
    }

    if let Some(provider) = non_blank(&request.provider) {
        spec.insert("provider".to_string(), json!(provider));
    }

    if let Some(config) = &request.config {
        let config = config.to_config_map();
        if !config.is_empty() {
            spec.insert("config".to_string(), json!(config));
        }
    }

    json!({ "spec": spec })
}

/// Name of the DownloadRequest fetching a backup's logs. One per backup, so
/// repeated lookups share it until Velero expires it.
pub fn download_request_name(backup_name: &str) -> String {
    format!("{}-logs", backup_name)
}

/// Build a DownloadRequest asking Velero for a backup's log URL
pub fn build_backup_log_request(backup_name: &str) -> DownloadRequest {
    DownloadRequest::new(
        &download_request_name(backup_name),
        DownloadRequestSpec {
            target: DownloadTarget {
                kind: "BackupLog".to_string(),
                name: backup_name.to_string(),
            },
        },
    )
}
