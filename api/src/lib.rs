//! Task API
//!
//! HTTP surface of the task tracker: the axum router for the task resource
//! and the health probes, plus the middleware around it.
//!
//! # Overview
//!
//! - [`handler`] - request semantics over any [`TaskRepository`]
//! - [`server`] - routes, extractors and graceful serving
//! - [`middleware`] - security headers, CORS and rate limiting
//! - [`error`] - mapping of failures to status codes and JSON bodies
//!
//! # Usage
//!
//! ```no_run
//! use mocks::MockTaskRepository;
//! use std::sync::Arc;
//! use task_api::{ServerOptions, TaskApiServer, TaskHandler};
//!
//! async fn start_server() -> Result<(), Box<dyn std::error::Error>> {
//!     // In real usage, you would use database::PostgresTaskRepository
//!     let repository = Arc::new(MockTaskRepository::new());
//!     let handler = TaskHandler::new(repository).with_environment("development");
//!     let server = TaskApiServer::new(handler, ServerOptions::default());
//!     server.serve("127.0.0.1:3000", std::future::pending()).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod handler;
pub mod health;
pub mod middleware;
pub mod request_logger;
pub mod server;

// Re-export key types for easier usage
pub use error::{ApiError, ApiResult};
pub use handler::{DeleteResponse, ListTasksQuery, TaskHandler};
pub use health::{HealthReport, Liveness, MemoryUsage};
pub use middleware::{CorsPolicy, RateLimiter};
pub use server::{RateLimitSettings, ServerError, ServerOptions, TaskApiServer, DEFAULT_BODY_LIMIT};

// Re-export core types for external consumers
pub use task_core::{Task, TaskPage, TaskRepository, TaskStats};
