//! BackupStorageLocation and storage validation models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::crd::BackupStorageLocation;

use super::object_name;

/// Provider-specific BSL configuration
///
/// `region` and `s3Url` are surfaced as named fields; every other key is kept
/// as-is in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BslConfig {
    #[serde(default)]
    pub region: Option<String>,

    #[serde(default, alias = "s3_url")]
    pub s3_url: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl BslConfig {
    /// Flatten back into the CR's string map, dropping unset fields
    pub fn to_config_map(&self) -> BTreeMap<String, String> {
        let mut config = self.extra.clone();
        if let Some(region) = self.region.as_ref().filter(|r| !r.is_empty()) {
            config.insert("region".to_string(), region.clone());
        }
        if let Some(url) = self.s3_url.as_ref().filter(|u| !u.is_empty()) {
            config.insert("s3Url".to_string(), url.clone());
        }
        config
    }
}

impl From<&BTreeMap<String, String>> for BslConfig {
    fn from(config: &BTreeMap<String, String>) -> Self {
        let mut extra = config.clone();
        let region = extra.remove("region");
        let s3_url = extra.remove("s3Url");
        Self {
            region,
            s3_url,
            extra,
        }
    }
}

/// BackupStorageLocation as shown by the dashboard
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupStorageLocationResponse {
    pub name: String,

    pub provider: String,

    pub bucket: String,

    pub prefix: Option<String>,

    #[serde(alias = "access_mode")]
    pub access_mode: String,

    pub phase: String,

    #[serde(alias = "last_validation_time")]
    pub last_validation_time: Option<String>,

    pub message: Option<String>,

    pub config: BslConfig,
}

impl From<&BackupStorageLocation> for BackupStorageLocationResponse {
    fn from(bsl: &BackupStorageLocation) -> Self {
        let status = bsl.status.clone().unwrap_or_default();

        Self {
            name: object_name(&bsl.metadata),
            provider: bsl.spec.provider.clone(),
            bucket: bsl.spec.object_storage.bucket.clone(),
            prefix: bsl.spec.object_storage.prefix.clone(),
            access_mode: bsl
                .spec
                .access_mode
                .clone()
                .unwrap_or_else(|| "ReadWrite".to_string()),
            phase: status.phase.unwrap_or_else(|| "Unknown".to_string()),
            last_validation_time: status.last_validation_time,
            message: status.message,
            config: BslConfig::from(&bsl.spec.config),
        }
    }
}

/// Body of `PATCH /api/storage/bsl`
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBslRequest {
    pub name: String,

    #[serde(default)]
    pub provider: Option<String>,

    #[serde(default)]
    pub bucket: Option<String>,

    /// Only applied together with `bucket`
    #[serde(default)]
    pub prefix: Option<String>,

    #[serde(default)]
    pub config: Option<BslConfig>,
}

/// Body of `POST /api/storage/validate`
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateStorageRequest {
    /// S3 endpoint URL
    #[serde(alias = "s3_url")]
    pub s3_url: String,

    pub bucket: String,

    #[serde(default)]
    pub prefix: Option<String>,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default, alias = "access_key")]
    pub access_key: Option<String>,

    #[serde(default, alias = "secret_key")]
    pub secret_key: Option<String>,
}

/// Outcome of a storage validation
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateStorageResponse {
    pub success: bool,

    pub message: String,

    #[serde(alias = "object_count")]
    pub object_count: Option<i64>,

    #[serde(alias = "latest_backup")]
    pub latest_backup: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{BackupStorageLocationSpec, ObjectStorageLocation};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    #[test]
    fn test_bsl_mapping_defaults() {
        let bsl = BackupStorageLocation {
            metadata: ObjectMeta {
                name: Some("default".to_string()),
                ..Default::default()
            },
            spec: BackupStorageLocationSpec {
                provider: "aws".to_string(),
                object_storage: ObjectStorageLocation {
                    bucket: "velero".to_string(),
                    prefix: Some("cluster1".to_string()),
                    ca_cert: None,
                },
                config: BTreeMap::from([
                    ("region".to_string(), "minio".to_string()),
                    ("s3Url".to_string(), "http://minio:9000".to_string()),
                    ("s3ForcePathStyle".to_string(), "true".to_string()),
                ]),
                ..Default::default()
            },
            status: None,
        };
        let resp = BackupStorageLocationResponse::from(&bsl);
        assert_eq!(resp.provider, "aws");
        assert_eq!(resp.bucket, "velero");
        assert_eq!(resp.prefix.as_deref(), Some("cluster1"));
        assert_eq!(resp.access_mode, "ReadWrite");
        assert_eq!(resp.phase, "Unknown");
        assert_eq!(resp.config.region.as_deref(), Some("minio"));
        assert_eq!(resp.config.s3_url.as_deref(), Some("http://minio:9000"));
        assert_eq!(
            resp.config.extra.get("s3ForcePathStyle").map(String::as_str),
            Some("true")
        );
    }

    #[test]
    fn test_config_extra_keys_flatten_on_the_wire() {
        let config: BslConfig = serde_json::from_value(serde_json::json!({
            "region": "eu-west-1",
            "s3_url": "http://minio:9000",
            "insecureSkipTLSVerify": "true"
        }))
        .unwrap();
        assert_eq!(config.s3_url.as_deref(), Some("http://minio:9000"));

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["s3Url"], "http://minio:9000");
        assert_eq!(json["insecureSkipTLSVerify"], "true");
    }

    #[test]
    fn test_validate_response_serializes_nulls() {
        let resp = ValidateStorageResponse {
            success: false,
            message: "Bucket 'x' not found".to_string(),
            object_count: None,
            latest_backup: None,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["objectCount"].is_null());
        assert!(json["latestBackup"].is_null());
    }
}
