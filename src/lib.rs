//! Velero Dashboard API
//!
//! REST backend exposing Velero backups, restores, schedules and storage
//! locations to a dashboard frontend, plus an S3 connectivity check.

pub mod adapters;
pub mod api;
pub mod config;
pub mod crd;
pub mod error;
pub mod metrics;
pub mod models;

pub use error::{Error, Result};
