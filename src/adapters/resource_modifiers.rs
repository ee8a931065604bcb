//! Velero resource modifier documents
//!
//! Renders dashboard modifier rules into the `resource-modifiers.yaml` schema
//! read by the Velero restore controller, and wraps the document in the
//! ConfigMap a Restore references.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::Serialize;

use crate::error::Result;
use crate::models::{JsonPatch, PatchOperation, ResourceModifierConditions, ResourceModifierRule};

/// Schema version understood by Velero
pub const MODIFIERS_VERSION: &str = "v1";

/// ConfigMap data key holding the rendered document
pub const MODIFIERS_KEY: &str = "resource-modifiers.yaml";

/// Label pointing back at the owning Restore
pub const RESTORE_NAME_LABEL: &str = "velero.io/restore-name";

const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
const MANAGED_BY: &str = "velero-dashboard";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ModifiersDocument<'a> {
    version: &'static str,
    resource_modifier_rules: Vec<RuleDocument<'a>>,
}

#[derive(Serialize)]
struct RuleDocument<'a> {
    conditions: ConditionsDocument<'a>,
    patches: Vec<PatchDocument<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConditionsDocument<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    group_resource: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource_name_regex: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespaces: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    label_selector: Option<&'a BTreeMap<String, String>>,
}

#[derive(Serialize)]
struct PatchDocument<'a> {
    operation: PatchOperation,
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<&'a str>,
}

impl<'a> From<&'a ResourceModifierConditions> for ConditionsDocument<'a> {
    fn from(c: &'a ResourceModifierConditions) -> Self {
        Self {
            group_resource: c.group_resource.as_deref().filter(|s| !s.is_empty()),
            resource_name_regex: c.resource_name_regex.as_deref().filter(|s| !s.is_empty()),
            namespaces: c.namespaces.as_deref().filter(|n| !n.is_empty()),
            label_selector: c.label_selector.as_ref().filter(|l| !l.is_empty()),
        }
    }
}

impl<'a> From<&'a JsonPatch> for PatchDocument<'a> {
    fn from(p: &'a JsonPatch) -> Self {
        Self {
            operation: p.operation,
            path: &p.path,
            value: p.value.as_ref().filter(|v| !v.is_null()),
            from: p.from_path.as_deref().filter(|s| !s.is_empty()),
        }
    }
}

/// Render rules as a `resource-modifiers.yaml` document.
///
/// Rule and patch order is preserved. Unset or empty condition keys and
/// patch fields are omitted.
pub fn build_resource_modifiers_yaml(rules: &[ResourceModifierRule]) -> Result<String> {
    let document = ModifiersDocument {
        version: MODIFIERS_VERSION,
        resource_modifier_rules: rules
            .iter()
            .map(|rule| RuleDocument {
                conditions: (&rule.conditions).into(),
                patches: rule.patches.iter().map(PatchDocument::from).collect(),
            })
            .collect(),
    };

    Ok(serde_yaml::to_string(&document)?)
}

/// Deterministic ConfigMap name for a restore's modifiers
pub fn config_map_name(restore_name: &str) -> String {
    format!("restore-resource-modifiers-{}", restore_name)
}

/// Build the ConfigMap carrying a restore's modifier rules
pub fn build_config_map(
    namespace: &str,
    restore_name: &str,
    rules: &[ResourceModifierRule],
) -> Result<ConfigMap> {
    let document = build_resource_modifiers_yaml(rules)?;

    Ok(ConfigMap {
        metadata: ObjectMeta {
            name: Some(config_map_name(restore_name)),
            namespace: Some(namespace.to_string()),
            labels: Some(BTreeMap::from([
                (RESTORE_NAME_LABEL.to_string(), restore_name.to_string()),
                (MANAGED_BY_LABEL.to_string(), MANAGED_BY.to_string()),
            ])),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(MODIFIERS_KEY.to_string(), document)])),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serde_yaml::Value as Yaml;

    fn rule(conditions: ResourceModifierConditions, patches: Vec<JsonPatch>) -> ResourceModifierRule {
        ResourceModifierRule {
            conditions,
            patches,
        }
    }

    fn replace_replicas() -> JsonPatch {
        JsonPatch {
            operation: PatchOperation::Replace,
            path: "/spec/replicas".to_string(),
            value: Some(json!(1)),
            from_path: None,
        }
    }

    fn parse(doc: &str) -> Yaml {
        serde_yaml::from_str(doc).unwrap()
    }

    #[test]
    fn test_minimal_rule_omits_unset_keys() {
        let rules = vec![rule(
            ResourceModifierConditions {
                group_resource: Some("deployments.apps".to_string()),
                ..Default::default()
            },
            vec![replace_replicas()],
        )];

        let doc = build_resource_modifiers_yaml(&rules).unwrap();
        assert!(doc.contains("value: 1"));
        assert!(!doc.contains("resourceNameRegex"));
        assert!(!doc.contains("namespaces"));
        assert!(!doc.contains("labelSelector"));
        assert!(!doc.contains("from"));

        let parsed = parse(&doc);
        assert_eq!(parsed["version"], Yaml::from("v1"));
        let first = &parsed["resourceModifierRules"][0];
        assert_eq!(first["conditions"]["groupResource"], Yaml::from("deployments.apps"));
        assert_eq!(first["patches"][0]["operation"], Yaml::from("replace"));
        assert_eq!(first["patches"][0]["path"], Yaml::from("/spec/replicas"));
        assert_eq!(first["patches"][0]["value"], Yaml::from(1));
    }

    #[test]
    fn test_keys_are_emitted_in_schema_order() {
        let doc = build_resource_modifiers_yaml(&[rule(
            ResourceModifierConditions::default(),
            vec![replace_replicas()],
        )])
        .unwrap();
        let version = doc.find("version").unwrap();
        let rules = doc.find("resourceModifierRules").unwrap();
        let operation = doc.find("operation").unwrap();
        let path = doc.find("path").unwrap();
        let value = doc.find("value").unwrap();
        assert!(version < rules);
        assert!(operation < path && path < value);
    }

    #[test]
    fn test_full_conditions_and_move_patch() {
        let rules = vec![rule(
            ResourceModifierConditions {
                group_resource: Some("persistentvolumeclaims".to_string()),
                resource_name_regex: Some("^data-.*".to_string()),
                namespaces: Some(vec!["prod".to_string(), "stage".to_string()]),
                label_selector: Some(BTreeMap::from([("app".to_string(), "db".to_string())])),
            },
            vec![JsonPatch {
                operation: PatchOperation::Move,
                path: "/spec/storageClassName".to_string(),
                value: None,
                from_path: Some("/metadata/annotations/sc".to_string()),
            }],
        )];

        let parsed = parse(&build_resource_modifiers_yaml(&rules).unwrap());
        let first = &parsed["resourceModifierRules"][0];
        assert_eq!(first["conditions"]["resourceNameRegex"], Yaml::from("^data-.*"));
        assert_eq!(first["conditions"]["namespaces"][1], Yaml::from("stage"));
        assert_eq!(first["conditions"]["labelSelector"]["app"], Yaml::from("db"));

        let patch = first["patches"][0].as_mapping().unwrap();
        assert_eq!(patch.get("from"), Some(&Yaml::from("/metadata/annotations/sc")));
        assert!(patch.get("value").is_none());
    }

    #[test]
    fn test_empty_conditions_are_dropped() {
        let rules = vec![rule(
            ResourceModifierConditions {
                group_resource: Some(String::new()),
                namespaces: Some(vec![]),
                label_selector: Some(BTreeMap::new()),
                ..Default::default()
            },
            vec![],
        )];

        let parsed = parse(&build_resource_modifiers_yaml(&rules).unwrap());
        let conditions = parsed["resourceModifierRules"][0]["conditions"]
            .as_mapping()
            .unwrap();
        assert!(conditions.is_empty());
    }

    #[test]
    fn test_rule_order_is_preserved() {
        let rules = vec![
            rule(
                ResourceModifierConditions {
                    group_resource: Some("deployments.apps".to_string()),
                    ..Default::default()
                },
                vec![],
            ),
            rule(
                ResourceModifierConditions {
                    group_resource: Some("services".to_string()),
                    ..Default::default()
                },
                vec![],
            ),
        ];
        let parsed = parse(&build_resource_modifiers_yaml(&rules).unwrap());
        assert_eq!(
            parsed["resourceModifierRules"][1]["conditions"]["groupResource"],
            Yaml::from("services")
        );
    }

    #[test]
    fn test_structured_values_survive() {
        let rules = vec![rule(
            ResourceModifierConditions::default(),
            vec![JsonPatch {
                operation: PatchOperation::Add,
                path: "/metadata/labels".to_string(),
                value: Some(json!({"env": "staging"})),
                from_path: None,
            }],
        )];
        let parsed = parse(&build_resource_modifiers_yaml(&rules).unwrap());
        assert_eq!(
            parsed["resourceModifierRules"][0]["patches"][0]["value"]["env"],
            Yaml::from("staging")
        );
    }

    #[test]
    fn test_config_map_shape() {
        let cm = build_config_map("velero", "r1", &[]).unwrap();
        assert_eq!(cm.metadata.name.as_deref(), Some("restore-resource-modifiers-r1"));
        assert_eq!(cm.metadata.namespace.as_deref(), Some("velero"));

        let labels = cm.metadata.labels.unwrap();
        assert_eq!(labels.get(RESTORE_NAME_LABEL).map(String::as_str), Some("r1"));
        assert_eq!(
            labels.get("app.kubernetes.io/managed-by").map(String::as_str),
            Some("velero-dashboard")
        );

        let data = cm.data.unwrap();
        let parsed = parse(&data[MODIFIERS_KEY]);
        assert_eq!(parsed["version"], Yaml::from("v1"));
        assert_eq!(parsed["resourceModifierRules"].as_sequence().unwrap().len(), 0);
    }
}
