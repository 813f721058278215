//! HTTP ingress for a serve instance.
//!
//! Exposes the operational endpoints every serve instance carries:
//! `/-/healthz` for health probes and `/-/routes` for the routing table.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use ray_core::{Runtime, RuntimeState};

use crate::deployments::{DeploymentRegistry, RouteEntry};

/// Shared state handed to the ingress handlers
#[derive(Debug, Clone)]
pub(crate) struct AppState {
    pub(crate) runtime: Runtime,
    pub(crate) deployments: Arc<DeploymentRegistry>,
}

/// Health probe response body
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    runtime_state: RuntimeState,
    deployments: usize,
    version: &'static str,
}

/// Build the ingress router
pub(crate) fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/-/healthz", get(healthz))
        .route("/-/routes", get(routes))
        .with_state(state)
}

async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    let runtime_state = state.runtime.state();
    let status = if runtime_state == RuntimeState::Running {
        "ok"
    } else {
        "draining"
    };
    Json(HealthResponse {
        status,
        runtime_state,
        deployments: state.deployments.len(),
        version: ray_core::RUNTIME_VERSION,
    })
}

async fn routes(State(state): State<AppState>) -> Json<Vec<RouteEntry>> {
    Json(state.deployments.routes())
}
