//! S3-compatible object storage probing
//!
//! Used to check that a bucket is reachable with a given set of credentials
//! before it is wired into a BackupStorageLocation.

use async_trait::async_trait;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::models::ValidateStorageResponse;

/// Maximum number of keys fetched by a validation listing
pub const MAX_KEYS: i32 = 100;

/// Region used when the caller does not name one
pub const DEFAULT_REGION: &str = "us-east-1";

/// Endpoint and credentials of an S3-compatible store
#[derive(Clone, Debug, Default)]
pub struct S3Target {
    pub endpoint: String,
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

/// Failure of a single storage call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// HTTP 404 from the store
    NotFound,
    /// HTTP 403 from the store
    AccessDenied,
    /// Any other error the store answered with, carrying its error code
    Service(String),
    /// The store could not be reached or the request was never answered
    Connection(String),
}

/// One entry of a bucket listing
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectSummary {
    pub key: String,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Result of a bounded bucket listing
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectListing {
    /// Number of keys returned, as reported by the store
    pub key_count: i64,
    pub objects: Vec<ObjectSummary>,
}

/// Minimal bucket operations needed to validate a store
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn head_bucket(&self, bucket: &str) -> Result<(), StoreError>;

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        max_keys: i32,
    ) -> Result<ObjectListing, StoreError>;
}

/// Opens an `ObjectStore` for a target
#[async_trait]
pub trait ObjectStoreConnector: Send + Sync {
    async fn connect(&self, target: &S3Target) -> Box<dyn ObjectStore>;
}

/// `ObjectStoreConnector` backed by the AWS SDK
#[derive(Clone, Debug, Default)]
pub struct AwsConnector;

#[async_trait]
impl ObjectStoreConnector for AwsConnector {
    async fn connect(&self, target: &S3Target) -> Box<dyn ObjectStore> {
        let region = target
            .region
            .clone()
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let shared = aws_config::from_env()
            .region(Region::new(region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared)
            .endpoint_url(&target.endpoint)
            .force_path_style(true);

        match (&target.access_key, &target.secret_key) {
            (Some(access_key), Some(secret_key)) => {
                builder = builder.credentials_provider(Credentials::new(
                    access_key,
                    secret_key,
                    None,
                    None,
                    "velero-dashboard",
                ));
            }
            _ => debug!("No static credentials supplied, using the default provider chain"),
        }

        debug!(endpoint = %target.endpoint, region = %region, "Built S3 client");
        Box::new(S3Store {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
        })
    }
}

struct S3Store {
    client: aws_sdk_s3::Client,
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn head_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        self.client
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        max_keys: i32,
    ) -> Result<ObjectListing, StoreError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_prefix(prefix.map(str::to_string))
            .max_keys(max_keys)
            .send()
            .await
            .map_err(classify)?;

        let objects = output
            .contents()
            .iter()
            .map(|object| ObjectSummary {
                key: object.key().unwrap_or_default().to_string(),
                last_modified: object
                    .last_modified()
                    .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
            })
            .collect();

        Ok(ObjectListing {
            key_count: i64::from(output.key_count().unwrap_or(0)),
            objects,
        })
    }
}

fn classify<E>(err: SdkError<E>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    match &err {
        SdkError::ServiceError(service) => match service.raw().status().as_u16() {
            404 => StoreError::NotFound,
            403 => StoreError::AccessDenied,
            status => StoreError::Service(
                service
                    .err()
                    .code()
                    .map(str::to_string)
                    .unwrap_or_else(|| status.to_string()),
            ),
        },
        _ => StoreError::Connection(DisplayErrorContext(&err).to_string()),
    }
}

fn failure(message: String) -> ValidateStorageResponse {
    ValidateStorageResponse {
        success: false,
        message,
        object_count: None,
        latest_backup: None,
    }
}

/// Check that `bucket` exists and is listable, reporting what was found.
///
/// Store failures are folded into an unsuccessful response rather than an
/// error.
pub async fn validate_storage(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: Option<&str>,
) -> ValidateStorageResponse {
    match store.head_bucket(bucket).await {
        Ok(()) => {}
        Err(StoreError::NotFound) => {
            warn!(bucket = %bucket, "Bucket not found");
            return failure(format!("Bucket '{}' not found", bucket));
        }
        Err(StoreError::AccessDenied) => {
            warn!(bucket = %bucket, "Access denied to bucket");
            return failure(format!("Access denied to bucket '{}'", bucket));
        }
        Err(StoreError::Service(code)) => {
            warn!(bucket = %bucket, code = %code, "Bucket check failed");
            return failure(format!("Bucket check failed: {}", code));
        }
        Err(StoreError::Connection(e)) => {
            warn!(bucket = %bucket, error = %e, "Storage connection failed");
            return failure(format!("Connection error: {}", e));
        }
    }

    let listing = match store.list_objects(bucket, prefix, MAX_KEYS).await {
        Ok(listing) => listing,
        Err(StoreError::Connection(e)) => {
            warn!(bucket = %bucket, error = %e, "Storage connection failed");
            return failure(format!("Connection error: {}", e));
        }
        Err(other) => {
            let code = match other {
                StoreError::NotFound => "NoSuchBucket".to_string(),
                StoreError::AccessDenied => "AccessDenied".to_string(),
                StoreError::Service(code) | StoreError::Connection(code) => code,
            };
            warn!(bucket = %bucket, code = %code, "Listing objects failed");
            return failure(format!("Failed to list objects: {}", code));
        }
    };

    let latest_backup = latest_object(&listing.objects).map(|o| o.key.clone());

    info!(
        bucket = %bucket,
        object_count = listing.key_count,
        "Storage validation succeeded"
    );

    ValidateStorageResponse {
        success: true,
        message: format!(
            "Connection successful! Found {} objects.",
            listing.key_count
        ),
        object_count: Some(listing.key_count),
        latest_backup,
    }
}

/// First object carrying the greatest modification time
fn latest_object(objects: &[ObjectSummary]) -> Option<&ObjectSummary> {
    let mut latest: Option<&ObjectSummary> = None;
    for object in objects {
        match latest {
            Some(current) if object.last_modified <= current.last_modified => {}
            _ => latest = Some(object),
        }
    }
    latest
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct FakeStore {
        head: Result<(), StoreError>,
        list: Result<ObjectListing, StoreError>,
    }

    #[async_trait]
    impl ObjectStore for FakeStore {
        async fn head_bucket(&self, _bucket: &str) -> Result<(), StoreError> {
            self.head.clone()
        }

        async fn list_objects(
            &self,
            _bucket: &str,
            _prefix: Option<&str>,
            max_keys: i32,
        ) -> Result<ObjectListing, StoreError> {
            assert_eq!(max_keys, MAX_KEYS);
            self.list.clone()
        }
    }

    fn object(key: &str, minute: u32) -> ObjectSummary {
        ObjectSummary {
            key: key.to_string(),
            last_modified: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap()),
        }
    }

    fn store(head: Result<(), StoreError>) -> FakeStore {
        FakeStore {
            head,
            list: Ok(ObjectListing::default()),
        }
    }

    #[tokio::test]
    async fn test_missing_bucket() {
        let resp = validate_storage(&store(Err(StoreError::NotFound)), "velero", None).await;
        assert!(!resp.success);
        assert_eq!(resp.message, "Bucket 'velero' not found");
        assert_eq!(resp.object_count, None);
        assert_eq!(resp.latest_backup, None);
    }

    #[tokio::test]
    async fn test_access_denied() {
        let resp = validate_storage(&store(Err(StoreError::AccessDenied)), "velero", None).await;
        assert_eq!(resp.message, "Access denied to bucket 'velero'");
    }

    #[tokio::test]
    async fn test_other_service_error() {
        let fake = store(Err(StoreError::Service("InvalidAccessKeyId".to_string())));
        let resp = validate_storage(&fake, "velero", None).await;
        assert_eq!(resp.message, "Bucket check failed: InvalidAccessKeyId");
    }

    #[tokio::test]
    async fn test_connection_error() {
        let fake = store(Err(StoreError::Connection("dns error".to_string())));
        let resp = validate_storage(&fake, "velero", None).await;
        assert!(!resp.success);
        assert_eq!(resp.message, "Connection error: dns error");
    }

    #[tokio::test]
    async fn test_listing_failure() {
        let fake = FakeStore {
            head: Ok(()),
            list: Err(StoreError::AccessDenied),
        };
        let resp = validate_storage(&fake, "velero", Some("backups")).await;
        assert!(!resp.success);
        assert_eq!(resp.message, "Failed to list objects: AccessDenied");
    }

    #[tokio::test]
    async fn test_success_reports_latest_object() {
        let fake = FakeStore {
            head: Ok(()),
            list: Ok(ObjectListing {
                key_count: 3,
                objects: vec![object("a", 1), object("c", 3), object("b", 2)],
            }),
        };
        let resp = validate_storage(&fake, "velero", None).await;
        assert!(resp.success);
        assert_eq!(resp.message, "Connection successful! Found 3 objects.");
        assert_eq!(resp.object_count, Some(3));
        assert_eq!(resp.latest_backup.as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn test_empty_bucket() {
        let resp = validate_storage(&store(Ok(())), "velero", None).await;
        assert!(resp.success);
        assert_eq!(resp.message, "Connection successful! Found 0 objects.");
        assert_eq!(resp.object_count, Some(0));
        assert_eq!(resp.latest_backup, None);
    }

    #[test]
    fn test_latest_object_ties_keep_first() {
        let objects = vec![object("first", 5), object("second", 5), object("old", 1)];
        assert_eq!(latest_object(&objects).unwrap().key, "first");
    }

    #[test]
    fn test_latest_object_prefers_timestamped() {
        let objects = vec![
            ObjectSummary {
                key: "undated".to_string(),
                last_modified: None,
            },
            object("dated", 0),
        ];
        assert_eq!(latest_object(&objects).unwrap().key, "dated");
    }
}
