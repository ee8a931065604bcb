//! Restore request/response models, including resource modifier rules

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::crd::Restore;

use super::{creation_timestamp, object_name};

/// Restore as shown by the dashboard
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreResponse {
    pub name: String,

    pub phase: String,

    #[serde(alias = "backup_name")]
    pub backup_name: String,

    #[serde(alias = "start_timestamp")]
    pub start_timestamp: String,

    #[serde(alias = "completion_timestamp")]
    pub completion_timestamp: Option<String>,

    pub warnings: i64,

    pub errors: i64,
}

impl From<&Restore> for RestoreResponse {
    fn from(restore: &Restore) -> Self {
        let status = restore.status.clone().unwrap_or_default();

        Self {
            name: object_name(&restore.metadata),
            phase: status.phase.unwrap_or_else(|| "New".to_string()),
            backup_name: restore.spec.backup_name.clone().unwrap_or_default(),
            start_timestamp: status
                .start_timestamp
                .or_else(|| creation_timestamp(&restore.metadata))
                .unwrap_or_default(),
            completion_timestamp: status.completion_timestamp,
            warnings: status.warnings.unwrap_or(0),
            errors: status.errors.unwrap_or(0),
        }
    }
}

/// Body of `POST /api/restores`
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestoreRequest {
    pub name: String,

    #[serde(alias = "backup_name")]
    pub backup_name: String,

    #[serde(default, alias = "included_namespaces")]
    pub included_namespaces: Option<Vec<String>>,

    #[serde(default, alias = "excluded_namespaces")]
    pub excluded_namespaces: Option<Vec<String>>,
}

/// Body of `POST /api/restores/with-modifications`
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestoreWithModificationsRequest {
    pub name: String,

    #[serde(alias = "backup_name")]
    pub backup_name: String,

    #[serde(default, alias = "included_namespaces")]
    pub included_namespaces: Option<Vec<String>>,

    #[serde(default, alias = "excluded_namespaces")]
    pub excluded_namespaces: Option<Vec<String>>,

    #[serde(alias = "resource_modifier_rules")]
    pub resource_modifier_rules: Vec<ResourceModifierRule>,
}

/// JSON patch operation kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOperation {
    Add,
    Remove,
    Replace,
    Copy,
    Move,
    Test,
}

/// Single JSON patch applied to a matched resource
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonPatch {
    pub operation: PatchOperation,

    /// JSON pointer, e.g. "/spec/replicas"
    pub path: String,

    /// Value for add/replace/test
    #[serde(default)]
    pub value: Option<serde_json::Value>,

    /// Source pointer for copy/move
    #[serde(default, rename = "from", alias = "from_path")]
    pub from_path: Option<String>,
}

/// Conditions selecting the resources a rule applies to
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceModifierConditions {
    /// e.g. "deployments.apps"
    #[serde(default, alias = "group_resource")]
    pub group_resource: Option<String>,

    #[serde(default, alias = "resource_name_regex")]
    pub resource_name_regex: Option<String>,

    #[serde(default)]
    pub namespaces: Option<Vec<String>>,

    #[serde(default, alias = "label_selector")]
    pub label_selector: Option<BTreeMap<String, String>>,
}

/// Match conditions plus an ordered list of patches
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceModifierRule {
    pub conditions: ResourceModifierConditions,

    pub patches: Vec<JsonPatch>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{RestoreSpec, RestoreStatus};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    #[test]
    fn test_restore_mapping() {
        let restore = Restore {
            metadata: ObjectMeta {
                name: Some("r1".to_string()),
                ..Default::default()
            },
            spec: RestoreSpec {
                backup_name: Some("b1".to_string()),
                ..Default::default()
            },
            status: Some(RestoreStatus {
                phase: Some("InProgress".to_string()),
                start_timestamp: Some("2024-02-01T00:00:00Z".to_string()),
                ..Default::default()
            }),
        };
        let resp = RestoreResponse::from(&restore);
        assert_eq!(resp.name, "r1");
        assert_eq!(resp.backup_name, "b1");
        assert_eq!(resp.phase, "InProgress");
        assert_eq!(resp.start_timestamp, "2024-02-01T00:00:00Z");
        assert_eq!(resp.warnings, 0);
    }

    #[test]
    fn test_patch_accepts_from_alias() {
        let patch: JsonPatch = serde_json::from_str(
            r#"{"operation":"copy","path":"/spec/a","from_path":"/spec/b"}"#,
        )
        .unwrap();
        assert_eq!(patch.operation, PatchOperation::Copy);
        assert_eq!(patch.from_path.as_deref(), Some("/spec/b"));
        assert_eq!(patch.value, None);
    }

    #[test]
    fn test_rejects_unknown_operation() {
        let result: Result<JsonPatch, _> =
            serde_json::from_str(r#"{"operation":"merge","path":"/spec"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_with_modifications_request_parses() {
        let req: CreateRestoreWithModificationsRequest = serde_json::from_value(serde_json::json!({
            "name": "restore-prod-to-staging",
            "backupName": "prod-backup-20240131",
            "includedNamespaces": ["production"],
            "resourceModifierRules": [{
                "conditions": {"groupResource": "deployments.apps", "namespaces": ["production"]},
                "patches": [{"operation": "replace", "path": "/spec/replicas", "value": 1}]
            }]
        }))
        .unwrap();
        assert_eq!(req.resource_modifier_rules.len(), 1);
        assert_eq!(
            req.resource_modifier_rules[0].patches[0].value,
            Some(serde_json::json!(1))
        );
    }
}
