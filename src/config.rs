//! Runtime settings
//!
//! Every setting is read once at startup from a command-line flag or its
//! environment variable.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Log output format
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Plain,
    Json,
}

/// Application settings
#[derive(Clone, Debug, Parser)]
#[command(name = "velero-dashboard-api", about = "REST backend for the Velero dashboard")]
pub struct Settings {
    /// Path to a kubeconfig file; in-cluster credentials are used when unset
    #[arg(long, env = "KUBECONFIG_PATH")]
    pub kubeconfig_path: Option<PathBuf>,

    /// Namespace where Velero is installed
    #[arg(long, env = "VELERO_NAMESPACE", default_value = "velero")]
    pub velero_namespace: String,

    /// Display name of this cluster
    #[arg(long, env = "CLUSTER_NAME", default_value = "cluster1")]
    pub cluster_name: String,

    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 8001)]
    pub port: u16,

    /// Comma-separated list of allowed CORS origins
    #[arg(
        long,
        env = "CORS_ORIGINS",
        default_value = "http://localhost:5173,http://localhost:3000"
    )]
    pub cors_origins: String,

    /// Default S3 access key for storage validation
    #[arg(long, env = "S3_ACCESS_KEY", hide_env_values = true)]
    pub s3_access_key: Option<String>,

    /// Default S3 secret key for storage validation
    #[arg(long, env = "S3_SECRET_KEY", hide_env_values = true)]
    pub s3_secret_key: Option<String>,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "json")]
    pub log_format: LogFormat,
}

impl Settings {
    /// Allowed CORS origins, trimmed, with empty entries dropped
    pub fn cors_origins_list(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Socket address the HTTP server binds to
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Default tracing filter directive derived from the configured level
    pub fn log_filter(&self) -> String {
        format!(
            "{},kube=warn,hyper=warn,aws_config=warn,aws_smithy_runtime=warn",
            self.log_level.to_lowercase()
        )
    }
}
