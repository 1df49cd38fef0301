//! Database crate for the task tracker
//!
//! This crate provides the PostgreSQL implementation of the TaskRepository
//! trait: a bounded connection pool, a startup retry loop, idempotent schema
//! creation and parameterized queries for every repository operation.
//!
//! # Usage
//!
//! ```rust,no_run
//! use database::{DatabaseSettings, PostgresTaskRepository, RetryPolicy};
//! use task_core::repository::TaskRepository;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = PostgresTaskRepository::connect(&DatabaseSettings::default());
//!
//!     // Wait for the database and create the schema
//!     repo.initialize(&RetryPolicy::default()).await?;
//!
//!     repo.health_check().await?;
//!     repo.shutdown().await;
//!     Ok(())
//! }
//! ```

mod common;
mod postgres;
pub mod schema;

pub use postgres::{DatabaseSettings, PostgresTaskRepository, RetryPolicy};

// Re-export commonly used types from task-core for convenience
pub use task_core::{
    error::{Result, TaskError},
    models::{NewTask, PageRequest, Task, TaskFilter, TaskPriority, TaskStatus, UpdateTask},
    repository::{TaskRepository, TaskStats},
};
