use thiserror::Error;

/// Result type alias for task operations
pub type Result<T> = std::result::Result<T, TaskError>;

/// Error types for the task tracker.
///
/// Each variant maps to one HTTP status class. Only `Validation`,
/// `InvalidId`, `NoFieldsToUpdate` and `NotFound` carry text that is safe to
/// hand back to a caller; the storage-side variants are logged and replaced
/// by a generic message at the API boundary.
///
/// # Examples
///
/// ```rust
/// use task_core::error::TaskError;
///
/// let not_found = TaskError::not_found_id(42);
/// assert!(not_found.is_not_found());
/// assert_eq!(not_found.status_code(), 404);
///
/// let invalid = TaskError::invalid_id("abc");
/// assert_eq!(invalid.status_code(), 400);
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Task not found by the given identifier
    #[error("Task not found: {0}")]
    NotFound(String),

    /// Path identifier is not a plain digit string
    #[error("Invalid task ID: '{0}'")]
    InvalidId(String),

    /// Input validation failed; one message per violated field
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Update body contained no recognized field
    #[error("No valid fields to update")]
    NoFieldsToUpdate,

    /// A dependency (the database) cannot be reached
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Database operation error
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal system error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TaskError {
    /// Create a not found error for a task ID
    pub fn not_found_id(id: i32) -> Self {
        Self::NotFound(format!("Task with ID {id} not found"))
    }

    /// Create an identifier-format error
    pub fn invalid_id(raw: &str) -> Self {
        Self::InvalidId(raw.to_string())
    }

    /// Create a validation error carrying a single message
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }

    /// Check if this error indicates a not found condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, TaskError::NotFound(_))
    }

    /// Check if this error indicates a validation problem
    pub fn is_validation(&self) -> bool {
        matches!(self, TaskError::Validation(_))
    }

    /// Check if this error indicates a database problem
    pub fn is_database(&self) -> bool {
        matches!(self, TaskError::Database(_) | TaskError::Unavailable(_))
    }

    /// Whether the message may be shown to an API caller verbatim
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }

    /// Convert to appropriate HTTP status code equivalent
    pub fn status_code(&self) -> u16 {
        match self {
            TaskError::NotFound(_) => 404,
            TaskError::InvalidId(_) => 400,
            TaskError::Validation(_) => 400,
            TaskError::NoFieldsToUpdate => 400,
            TaskError::Unavailable(_) => 503,
            TaskError::Database(_) => 500,
            TaskError::Configuration(_) => 500,
            TaskError::Internal(_) => 500,
        }
    }
}
