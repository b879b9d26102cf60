use std::{sync::Arc, time::Instant};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use prometheus::{Registry, TextEncoder};
use tracing::{error, info};

use crate::{error::ApiError, handler::TaskLookup};

struct ApiState<H> {
    handler: Arc<H>,
    registry: Option<Registry>,
}

/// HTTP API service builder.
pub struct HttpApi<H> {
    handler: Arc<H>,
    registry: Option<Registry>,
}

impl<H> HttpApi<H>
where
    H: TaskLookup,
{
    /// Create new HTTP API with the given lookup backend.
    pub fn new(handler: Arc<H>) -> Self {
        Self {
            handler,
            registry: None,
        }
    }

    /// Expose `registry` on `GET /metrics`.
    pub fn with_metrics(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Build axum router with mounted endpoints.
    ///
    /// Routes:
    /// - GET /tasks/{service} - Running tasks of a service
    /// - GET /health - Liveness
    /// - GET /metrics - Prometheus exposition (only with a registry)
    pub fn router(self) -> Router {
        let with_metrics = self.registry.is_some();
        let state = Arc::new(ApiState {
            handler: self.handler,
            registry: self.registry,
        });

        let router = Router::new()
            .route("/tasks/{service}", get(find_tasks::<H>))
            .route("/health", get(health));
        let router = if with_metrics {
            router.route("/metrics", get(metrics::<H>))
        } else {
            router
        };
        router.with_state(state)
    }
}

/// GET /tasks/{service}
async fn find_tasks<H>(
    State(state): State<Arc<ApiState<H>>>,
    Path(service): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    H: TaskLookup,
{
    let begin = Instant::now();
    let result = state.handler.find_tasks(&service).await;
    let elapsed_ms = begin.elapsed().as_millis() as u64;

    match result {
        Ok(tasks) => {
            info!(service, tasks = tasks.len(), elapsed_ms, "tasks served");
            Ok(Json(tasks))
        }
        Err(e) => {
            error!(service, elapsed_ms, error = %e, "tasks lookup failed");
            Err(e)
        }
    }
}

/// GET /health
async fn health() -> &'static str {
    "ok"
}

/// GET /metrics
async fn metrics<H>(State(state): State<Arc<ApiState<H>>>) -> Result<impl IntoResponse, ApiError>
where
    H: TaskLookup,
{
    let families = state
        .registry
        .as_ref()
        .map(Registry::gather)
        .unwrap_or_default();
    let body = TextEncoder::new()
        .encode_to_string(&families)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
        body,
    ))
}
