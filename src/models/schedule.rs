//! Schedule request/response models

use serde::{Deserialize, Serialize};

use crate::crd::{BackupSpec, Schedule};

use super::object_name;

/// Backup template summary carried by a schedule
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTemplate {
    #[serde(default, alias = "included_namespaces")]
    pub included_namespaces: Option<Vec<String>>,

    #[serde(default, alias = "excluded_namespaces")]
    pub excluded_namespaces: Option<Vec<String>>,

    #[serde(default)]
    pub ttl: Option<String>,
}

/// Schedule as shown by the dashboard
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub name: String,

    /// Cron expression
    pub schedule: String,

    #[serde(alias = "last_backup")]
    pub last_backup: Option<String>,

    pub enabled: bool,

    pub template: Option<ScheduleTemplate>,
}

impl From<&Schedule> for ScheduleResponse {
    fn from(schedule: &Schedule) -> Self {
        let template = schedule
            .spec
            .template
            .as_ref()
            .filter(|t| **t != BackupSpec::default())
            .map(|t| ScheduleTemplate {
                included_namespaces: t.included_namespaces.clone(),
                excluded_namespaces: t.excluded_namespaces.clone(),
                ttl: t.ttl.clone(),
            });

        Self {
            name: object_name(&schedule.metadata),
            schedule: schedule.spec.schedule.clone(),
            last_backup: schedule.status.as_ref().and_then(|s| s.last_backup.clone()),
            enabled: !schedule.spec.paused.unwrap_or(false),
            template,
        }
    }
}

/// Body of `POST /api/schedules`
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleRequest {
    pub name: String,

    /// Cron expression
    pub schedule: String,

    #[serde(default, alias = "included_namespaces")]
    pub included_namespaces: Option<Vec<String>>,

    #[serde(default, alias = "excluded_namespaces")]
    pub excluded_namespaces: Option<Vec<String>>,

    #[serde(default)]
    pub ttl: Option<String>,
}
