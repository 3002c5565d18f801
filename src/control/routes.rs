//! Control Plane Routes
//!
//! Operator surface over a `Decider`:
//! - GET  /status   local roles and counters
//! - POST /recheck  run one reconciliation pass now
//! - POST /promote  force the local node active
//! - POST /demote   force the local node backup
//!
//! Decider calls block on collaborators, so they run on the blocking pool.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::failover::{DbRole, Decider, DeciderStatus, FailoverError, FailoverResult};

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub status: DeciderStatus,
    pub checked_at: String,
}

#[derive(Debug, Serialize)]
pub struct RecheckResponse {
    pub transition: &'static str,
    pub target_role: Option<DbRole>,
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub db_role: DbRole,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

/// Errors surfaced by control handlers
#[derive(Debug)]
pub enum ControlError {
    Failover(FailoverError),
    /// The blocking task panicked or was cancelled
    Join(String),
}

impl From<FailoverError> for ControlError {
    fn from(e: FailoverError) -> Self {
        Self::Failover(e)
    }
}

impl IntoResponse for ControlError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Failover(e) => {
                let status = match e {
                    FailoverError::ClusterUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                    FailoverError::Collaborator(_) => StatusCode::BAD_GATEWAY,
                    FailoverError::BootstrapAborted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (
                    status,
                    ErrorResponse {
                        error: e.to_string(),
                        code: e.code(),
                    },
                )
            }
            Self::Join(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: message,
                    code: "AERO_HA_CONTROL_TASK_FAILED",
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

// ==================
// Control Routes
// ==================

/// Create control routes
pub fn control_routes(decider: Arc<dyn Decider>) -> Router {
    Router::new()
        .route("/status", get(status_handler))
        .route("/recheck", post(recheck_handler))
        .route("/promote", post(promote_handler))
        .route("/demote", post(demote_handler))
        .with_state(decider)
}

async fn run_blocking<T, F>(decider: Arc<dyn Decider>, f: F) -> Result<T, ControlError>
where
    T: Send + 'static,
    F: FnOnce(&dyn Decider) -> FailoverResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(decider.as_ref()))
        .await
        .map_err(|e| ControlError::Join(e.to_string()))?
        .map_err(ControlError::from)
}

async fn status_handler(
    State(decider): State<Arc<dyn Decider>>,
) -> Result<Json<StatusResponse>, ControlError> {
    let status = run_blocking(decider, |d| Ok(d.status())).await?;
    Ok(Json(StatusResponse {
        status,
        checked_at: chrono::Utc::now().to_rfc3339(),
    }))
}

async fn recheck_handler(
    State(decider): State<Arc<dyn Decider>>,
) -> Result<Json<RecheckResponse>, ControlError> {
    let transition = run_blocking(decider, |d| d.recheck()).await?;
    Ok(Json(RecheckResponse {
        transition: transition.name(),
        target_role: transition.target_role(),
    }))
}

async fn promote_handler(
    State(decider): State<Arc<dyn Decider>>,
) -> Result<Json<RoleResponse>, ControlError> {
    run_blocking(decider, |d| d.promote()).await?;
    Ok(Json(RoleResponse {
        db_role: DbRole::Active,
    }))
}

async fn demote_handler(
    State(decider): State<Arc<dyn Decider>>,
) -> Result<Json<RoleResponse>, ControlError> {
    run_blocking(decider, |d| d.demote()).await?;
    Ok(Json(RoleResponse {
        db_role: DbRole::Backup,
    }))
}
