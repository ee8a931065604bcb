//! Request and response shapes for the dashboard API
//!
//! Responses always serialize camelCase field names. Requests accept both the
//! camelCase wire names and their snake_case aliases.

mod backup;
mod restore;
mod schedule;
mod storage;
mod system;

pub use backup::*;
pub use restore::*;
pub use schedule::*;
pub use storage::*;
pub use system::*;

use chrono::SecondsFormat;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};

/// Plain acknowledgement body, e.g. for deletes
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Object name, or empty when the server returned none
pub(crate) fn object_name(meta: &ObjectMeta) -> String {
    meta.name.clone().unwrap_or_default()
}

/// Creation timestamp in the API server's RFC 3339 form
pub(crate) fn creation_timestamp(meta: &ObjectMeta) -> Option<String> {
    meta.creation_timestamp
        .as_ref()
        .map(|t| t.0.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Sort newest first by a timestamp string.
///
/// Timestamps compare as plain strings, so an empty timestamp sorts last.
pub fn sort_newest_first<T>(items: &mut [T], timestamp: impl Fn(&T) -> &str) {
    items.sort_by(|a, b| timestamp(b).cmp(timestamp(a)));
}

/// Treat an empty list as absent
pub(crate) fn non_empty(list: &Option<Vec<String>>) -> Option<Vec<String>> {
    list.as_ref().filter(|l| !l.is_empty()).cloned()
}

/// Treat an empty string as absent
pub(crate) fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}
