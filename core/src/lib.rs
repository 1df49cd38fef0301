//! Task Core Library
//!
//! Domain models, validation rules, error types and the repository trait for
//! the task tracker. The database, API and server crates all build on the
//! types defined here.
//!
//! # Architecture
//!
//! - [`models`] - Task entity, status/priority enums, filters and pagination
//! - [`error`] - Error taxonomy and HTTP status mapping
//! - [`repository`] - Repository trait for data persistence
//! - [`validation`] - Request body and identifier validation
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use task_core::{TaskPriority, TaskStatus, TaskValidator};
//!
//! let body = json!({"title": "Learn Docker", "priority": "high"});
//! let new_task = TaskValidator::validate_new_task(&body).unwrap();
//!
//! assert_eq!(new_task.status, TaskStatus::Pending);
//! assert_eq!(new_task.priority, TaskPriority::High);
//! ```

pub mod error;
pub mod models;
pub mod repository;
pub mod validation;

// Re-export commonly used types at the crate root for convenience
pub use error::{Result, TaskError};
pub use models::{
    NewTask, PageRequest, Pagination, Task, TaskFilter, TaskPage, TaskPriority, TaskStatus,
    UpdateTask,
};
pub use repository::{TaskRepository, TaskStats};
pub use validation::TaskValidator;

/// Current version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Current crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
