//! HTTP server
//!
//! Builds the axum router for the task and health endpoints and serves it
//! with graceful shutdown.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::{
    error::{ApiError, ApiResult},
    handler::{DeleteResponse, ListTasksQuery, TaskHandler},
    health::timestamp_now,
    middleware::{cors, rate_limit, security_headers, CorsPolicy, RateLimiter},
    request_logger::request_logging_middleware,
};
use task_core::{Task, TaskPage, TaskRepository, TaskStats};

/// Default maximum request body size (1 MiB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Fixed-window rate limit applied per client IP to the task routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSettings {
    pub window: Duration,
    pub max_requests: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(15 * 60),
            max_requests: 100,
        }
    }
}

/// Transport options for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub body_limit_bytes: usize,
    pub cors: CorsPolicy,
    /// `None` disables rate limiting
    pub rate_limit: Option<RateLimitSettings>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            body_limit_bytes: DEFAULT_BODY_LIMIT,
            cors: CorsPolicy::allow_any(),
            rate_limit: Some(RateLimitSettings::default()),
        }
    }
}

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address '{addr}': {reason}")]
    InvalidAddress { addr: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared server state for handlers
pub struct AppState<R> {
    pub handler: TaskHandler<R>,
}

/// Task API server
pub struct TaskApiServer<R> {
    handler: TaskHandler<R>,
    options: ServerOptions,
}

impl<R: TaskRepository + 'static> TaskApiServer<R> {
    pub fn new(handler: TaskHandler<R>, options: ServerOptions) -> Self {
        Self { handler, options }
    }

    /// Bind `addr` and serve until `shutdown` resolves
    pub async fn serve<F>(self, addr: &str, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let socket_addr: SocketAddr =
            addr.parse().map_err(|e: std::net::AddrParseError| {
                ServerError::InvalidAddress {
                    addr: addr.to_string(),
                    reason: e.to_string(),
                }
            })?;

        let listener = TcpListener::bind(socket_addr).await?;
        self.serve_listener(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// In-flight requests are allowed to finish after the signal.
    pub async fn serve_listener<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener.local_addr()?;
        let app = self.router();

        info!(address = %local_addr, "HTTP server listening");

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Create the router with all endpoints and middleware.
    ///
    /// The rate limiter keys clients by the peer address from `ConnectInfo`.
    /// Serve the router with `into_make_service_with_connect_info::<SocketAddr>()`
    /// as [`TaskApiServer::serve_listener`] does; otherwise every client is
    /// counted under `0.0.0.0` in a single shared window.
    pub fn router(&self) -> Router {
        let state = Arc::new(AppState {
            handler: self.handler.clone(),
        });

        let mut task_routes = Router::new()
            .route("/api/tasks", get(list_tasks::<R>).post(create_task::<R>))
            .route("/api/tasks/stats/summary", get(task_stats::<R>))
            .route(
                "/api/tasks/:id",
                get(get_task::<R>).put(update_task::<R>).delete(delete_task::<R>),
            );

        if let Some(settings) = self.options.rate_limit {
            let limiter = Arc::new(RateLimiter::new(settings.window, settings.max_requests));
            task_routes = task_routes.layer(middleware::from_fn_with_state(limiter, rate_limit));
        }

        Router::new()
            .route("/api/health", get(health::<R>))
            .route("/api/health/ready", get(readiness::<R>))
            .route("/api/health/live", get(liveness::<R>))
            .merge(task_routes)
            .fallback(route_not_found)
            .layer(DefaultBodyLimit::max(self.options.body_limit_bytes))
            .layer(middleware::from_fn(request_logging_middleware))
            .layer(middleware::from_fn_with_state(
                Arc::new(self.options.cors.clone()),
                cors,
            ))
            .layer(middleware::from_fn(security_headers))
            .with_state(state)
    }
}

type SharedState<R> = State<Arc<AppState<R>>>;

async fn list_tasks<R: TaskRepository>(
    State(state): SharedState<R>,
    query: Option<Query<ListTasksQuery>>,
) -> ApiResult<Json<TaskPage>> {
    let query = query.map(|Query(q)| q).unwrap_or_default();
    state.handler.list_tasks(&query).await.map(Json)
}

async fn get_task<R: TaskRepository>(
    State(state): SharedState<R>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    state.handler.get_task(&id).await.map(Json)
}

async fn create_task<R: TaskRepository>(
    State(state): SharedState<R>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(body) = body?;
    let task = state.handler.create_task(&body).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task<R: TaskRepository>(
    State(state): SharedState<R>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let body = body.map(|Json(value)| value).map_err(ApiError::from);
    state.handler.update_task(&id, body).await.map(Json)
}

async fn delete_task<R: TaskRepository>(
    State(state): SharedState<R>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    state.handler.delete_task(&id).await.map(Json)
}

async fn task_stats<R: TaskRepository>(State(state): SharedState<R>) -> ApiResult<Json<TaskStats>> {
    state.handler.task_stats().await.map(Json)
}

async fn health<R: TaskRepository>(State(state): SharedState<R>) -> Response {
    match state.handler.health_report().await {
        Ok(report) => {
            let status = if report.is_healthy() {
                StatusCode::OK
            } else {
                StatusCode::SERVICE_UNAVAILABLE
            };
            (status, Json(report)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "timestamp": timestamp_now(),
                    "error": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

async fn readiness<R: TaskRepository>(State(state): SharedState<R>) -> Response {
    if state.handler.readiness().await {
        (StatusCode::OK, Json(json!({ "status": "ready" }))).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not ready",
                "reason": "database not available",
            })),
        )
            .into_response()
    }
}

async fn liveness<R: TaskRepository>(State(state): SharedState<R>) -> Response {
    Json(state.handler.liveness()).into_response()
}

async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}
