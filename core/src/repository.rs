use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::{
    error::Result,
    models::{NewTask, PageRequest, Task, TaskFilter, UpdateTask},
};

/// Repository trait for task persistence and retrieval operations
///
/// This trait defines the interface for all task data operations.
/// Implementations must be thread-safe and support concurrent access;
/// the production implementation wraps a connection pool.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Create a new task
    ///
    /// # Returns
    /// * `Ok(Task)` - The created task with assigned ID and timestamps
    /// * `Err(TaskError::Database)` - If the database operation fails
    async fn create(&self, task: NewTask) -> Result<Task>;

    /// Apply a partial update to an existing task
    ///
    /// Only the fields present in `updates` are written. `updated_at` is
    /// refreshed by storage regardless of which fields change.
    ///
    /// # Returns
    /// * `Ok(Task)` - The updated task
    /// * `Err(TaskError::NoFieldsToUpdate)` - If `updates` is empty
    /// * `Err(TaskError::NotFound)` - If the task doesn't exist
    /// * `Err(TaskError::Database)` - If the database operation fails
    async fn update(&self, id: i32, updates: UpdateTask) -> Result<Task>;

    /// Get a task by its numeric ID
    ///
    /// # Returns
    /// * `Ok(Some(Task))` - The task if found
    /// * `Ok(None)` - If no task exists with that ID
    /// * `Err(TaskError::Database)` - If the database operation fails
    async fn get_by_id(&self, id: i32) -> Result<Option<Task>>;

    /// List one page of tasks matching the filter, newest first
    async fn list(&self, filter: &TaskFilter, page: PageRequest) -> Result<Vec<Task>>;

    /// Count all tasks matching the filter
    async fn count(&self, filter: &TaskFilter) -> Result<i64>;

    /// Hard-delete a task
    ///
    /// # Returns
    /// * `Ok(Some(Task))` - Snapshot of the deleted row
    /// * `Ok(None)` - If no task exists with that ID
    /// * `Err(TaskError::Database)` - If the database operation fails
    async fn delete(&self, id: i32) -> Result<Option<Task>>;

    /// Aggregate counters over the whole table
    async fn get_stats(&self) -> Result<TaskStats>;

    /// Cheap connectivity probe
    ///
    /// Acquires and releases one connection. Must not retry.
    ///
    /// # Returns
    /// * `Ok(())` - Repository is healthy and connected
    /// * `Err(TaskError::Unavailable)` - Repository cannot be reached
    async fn health_check(&self) -> Result<()>;
}

/// Aggregate statistics returned by the stats summary endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskStats {
    /// Total number of tasks
    pub total_tasks: i64,
    pub pending_tasks: i64,
    pub in_progress_tasks: i64,
    pub completed_tasks: i64,
    pub high_priority_tasks: i64,
    /// Tasks past their due date that are not completed
    pub overdue_tasks: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_stats_default() {
        let stats = TaskStats::default();
        assert_eq!(stats.total_tasks, 0);
        assert_eq!(stats.overdue_tasks, 0);
    }

    #[test]
    fn test_task_stats_serializes_flat() {
        let stats = TaskStats {
            total_tasks: 3,
            pending_tasks: 1,
            in_progress_tasks: 1,
            completed_tasks: 1,
            high_priority_tasks: 2,
            overdue_tasks: 0,
        };
        let value = serde_json::to_value(stats).unwrap();
        assert_eq!(value["total_tasks"], 3);
        assert_eq!(value["high_priority_tasks"], 2);
        assert_eq!(value.as_object().unwrap().len(), 6);
    }
}
