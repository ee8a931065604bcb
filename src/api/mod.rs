//! HTTP API
//!
//! One router per resource kind, nested under `/api`, sharing an `AppState`
//! that carries the Kubernetes wrapper, the object-store connector and the
//! settings. Every handler maps failures onto two outcomes: 404 when the
//! addressed object does not exist, 500 carrying the error text otherwise.
//! Malformed request bodies keep the extractor's 4xx status. All three use the
//! same `{"detail": ...}` body.

mod backups;
mod restores;
mod schedules;
mod storage;
mod system;

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::adapters::{ObjectStoreConnector, VeleroApi};
use crate::config::Settings;
use crate::error::Error;
use crate::metrics;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub velero: Arc<dyn VeleroApi>,
    pub storage: Arc<dyn ObjectStoreConnector>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(
        velero: Arc<dyn VeleroApi>,
        storage: Arc<dyn ObjectStoreConnector>,
        settings: Settings,
    ) -> Self {
        Self {
            velero,
            storage,
            settings: Arc::new(settings),
        }
    }
}

/// Error returned by handlers
#[derive(Debug)]
pub enum ApiError {
    /// 404 with a message naming the missing object
    NotFound(String),
    /// 500 with the underlying error text
    Internal(String),
    /// Request body rejected before reaching the handler
    Rejected(StatusCode, String),
}

impl ApiError {
    /// Translate a failure on a named object, reporting a missing object as
    /// `<Kind> '<name>' not found`
    pub fn lookup(err: Error, kind: &str, name: &str) -> Self {
        if err.is_not_found() {
            ApiError::NotFound(format!("{} '{}' not found", kind, name))
        } else {
            err.into()
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, detail),
            ApiError::Rejected(status, detail) => {
                warn!(status = %status, detail = %detail, "Rejected request body");
                (status, detail)
            }
            ApiError::Internal(detail) => {
                error!(detail = %detail, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, detail)
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// JSON body extractor whose rejections use the `{"detail": ...}` envelope
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// Result type returned by handlers
pub type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings);

    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/metrics", get(metrics::metrics_handler))
        .nest("/api/backups", backups::routes())
        .nest("/api/restores", restores::routes())
        .nest("/api/schedules", schedules::routes())
        .nest("/api/storage", storage::routes())
        .route("/api/repositories", get(system::list_repositories))
        .route("/api/node-agents", get(system::list_node_agents))
        .layer(middleware::from_fn(metrics::track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS policy for the configured origins. Credentials are allowed, and
/// methods and headers are mirrored from the preflight request. A `*` entry
/// mirrors any origin.
pub fn cors_layer(settings: &Settings) -> CorsLayer {
    let origins = settings.cors_origins_list();

    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| warn!(origin = %origin, "Ignoring invalid CORS origin"))
                .ok()
        }))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::ErrorResponse;

    fn kube_error(code: u16) -> Error {
        Error::Kube(kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: "boom".to_string(),
            reason: "Unknown".to_string(),
            code,
        }))
    }

    #[test]
    fn test_lookup_names_missing_object() {
        match ApiError::lookup(kube_error(404), "Backup", "nightly") {
            ApiError::NotFound(detail) => assert_eq!(detail, "Backup 'nightly' not found"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_keeps_other_errors() {
        match ApiError::lookup(kube_error(500), "Backup", "nightly") {
            ApiError::Internal(detail) => assert!(detail.contains("boom")),
            other => panic!("expected Internal, got {:?}", other),
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::NotFound("x".to_string()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal("x".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Rejected(StatusCode::UNPROCESSABLE_ENTITY, "x".to_string())
                .into_response()
                .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
