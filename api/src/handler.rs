//! Task Handler
//!
//! Bridges HTTP requests to the TaskRepository: identifier checks, body
//! validation and the mapping of storage outcomes to API errors.

use crate::error::{ApiError, ApiResult};
use crate::health::{process_memory, timestamp_now, HealthReport, Liveness};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use task_core::{
    PageRequest, Pagination, Result, Task, TaskFilter, TaskPage, TaskRepository, TaskStats,
    TaskValidator,
};
use tracing::{debug, info, warn};

/// Query string accepted by the list endpoint.
///
/// Everything is kept as text; numeric parsing and fallbacks happen in
/// [`PageRequest::from_query`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTasksQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListTasksQuery {
    /// Empty filter values are treated as absent
    pub fn filter(&self) -> TaskFilter {
        TaskFilter {
            status: self.status.clone().filter(|s| !s.is_empty()),
            priority: self.priority.clone().filter(|p| !p.is_empty()),
        }
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::from_query(self.page.as_deref(), self.limit.as_deref())
    }
}

/// Body returned by a successful delete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
    pub task: Task,
}

/// Task handler shared by every route
pub struct TaskHandler<R> {
    repository: Arc<R>,
    started_at: Instant,
    environment: String,
    version: String,
}

impl<R> Clone for TaskHandler<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            started_at: self.started_at,
            environment: self.environment.clone(),
            version: self.version.clone(),
        }
    }
}

impl<R> TaskHandler<R> {
    /// Create new task handler; uptime is measured from this call
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            started_at: Instant::now(),
            environment: "development".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Deployment environment reported by the composite health check
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Application version reported by the composite health check
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn repository(&self) -> Arc<R> {
        Arc::clone(&self.repository)
    }

    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }

    /// Liveness never touches the database
    pub fn liveness(&self) -> Liveness {
        Liveness {
            status: "alive",
            uptime: self.uptime_secs(),
        }
    }
}

impl<R: TaskRepository> TaskHandler<R> {
    /// List one page of tasks plus pagination metadata
    pub async fn list_tasks(&self, query: &ListTasksQuery) -> ApiResult<TaskPage> {
        let filter = query.filter();
        let page = query.page_request();

        let (tasks, total) = tokio::try_join!(
            self.repository.list(&filter, page),
            self.repository.count(&filter)
        )
        .map_err(|e| ApiError::from_task_error(e, "Failed to fetch tasks"))?;

        Ok(TaskPage {
            tasks,
            pagination: Pagination::new(page, total),
        })
    }

    pub async fn get_task(&self, raw_id: &str) -> ApiResult<Task> {
        let id = TaskValidator::validate_task_id(raw_id)
            .map_err(|e| ApiError::from_task_error(e, "Failed to fetch task"))?;

        self.repository
            .get_by_id(id)
            .await
            .map_err(|e| ApiError::from_task_error(e, "Failed to fetch task"))?
            .ok_or(ApiError::NotFound)
    }

    pub async fn create_task(&self, body: &Value) -> ApiResult<Task> {
        let new_task = TaskValidator::validate_new_task(body)
            .map_err(|e| ApiError::from_task_error(e, "Failed to create task"))?;

        let task = self
            .repository
            .create(new_task)
            .await
            .map_err(|e| ApiError::from_task_error(e, "Failed to create task"))?;

        info!(task_id = task.id, "Task created");
        Ok(task)
    }

    /// Partial update.
    ///
    /// Checks run in a fixed order: identifier format, existence, body
    /// parsing and validation, then non-emptiness. A missing task is a 404
    /// whatever the body contains.
    pub async fn update_task(&self, raw_id: &str, body: ApiResult<Value>) -> ApiResult<Task> {
        let to_api = |e| ApiError::from_task_error(e, "Failed to update task");

        let id = TaskValidator::validate_task_id(raw_id).map_err(to_api)?;

        if self.repository.get_by_id(id).await.map_err(to_api)?.is_none() {
            return Err(ApiError::NotFound);
        }

        let updates = TaskValidator::validate_update_task(&body?).map_err(to_api)?;

        if updates.is_empty() {
            return Err(ApiError::NoFieldsToUpdate);
        }

        let fields = updates.changed_fields();
        let task = self.repository.update(id, updates).await.map_err(to_api)?;

        info!(task_id = id, fields = ?fields, "Task updated");
        Ok(task)
    }

    pub async fn delete_task(&self, raw_id: &str) -> ApiResult<DeleteResponse> {
        let to_api = |e| ApiError::from_task_error(e, "Failed to delete task");

        let id = TaskValidator::validate_task_id(raw_id).map_err(to_api)?;
        let task = self
            .repository
            .delete(id)
            .await
            .map_err(to_api)?
            .ok_or(ApiError::NotFound)?;

        info!(task_id = id, "Task deleted");
        Ok(DeleteResponse {
            message: "Task deleted successfully".to_string(),
            task,
        })
    }

    pub async fn task_stats(&self) -> ApiResult<TaskStats> {
        self.repository
            .get_stats()
            .await
            .map_err(|e| ApiError::from_task_error(e, "Failed to fetch statistics"))
    }

    /// Readiness: true when a storage connection can be acquired
    pub async fn readiness(&self) -> bool {
        match self.repository.health_check().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Readiness check failed");
                false
            }
        }
    }

    /// Composite health report.
    ///
    /// A database outage yields an `unhealthy` report; only a failure to
    /// assemble the report itself is an error.
    pub async fn health_report(&self) -> Result<HealthReport> {
        let connected = self.readiness().await;
        let memory = process_memory()?;

        debug!(connected, used_mb = memory.used, "Health report assembled");

        Ok(HealthReport {
            status: if connected { "healthy" } else { "unhealthy" },
            timestamp: timestamp_now(),
            uptime: self.uptime_secs(),
            environment: self.environment.clone(),
            version: self.version.clone(),
            database: if connected { "connected" } else { "disconnected" },
            memory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mocks::{create_test_tasks, MockTaskRepository};
    use serde_json::json;
    use task_core::{TaskError, TaskStatus};

    fn handler_with(repo: MockTaskRepository) -> TaskHandler<MockTaskRepository> {
        TaskHandler::new(Arc::new(repo)).with_environment("test")
    }

    #[tokio::test]
    async fn test_list_tasks_paginates() {
        let handler = handler_with(MockTaskRepository::with_tasks(create_test_tasks(3)));
        let query = ListTasksQuery {
            page: Some("1".to_string()),
            limit: Some("2".to_string()),
            ..Default::default()
        };

        let page = handler.list_tasks(&query).await.unwrap();
        assert_eq!(page.tasks.len(), 2);
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.pages, 2);
    }

    #[test]
    fn test_empty_filter_values_are_ignored() {
        let query = ListTasksQuery {
            status: Some(String::new()),
            priority: Some("high".to_string()),
            ..Default::default()
        };
        let filter = query.filter();
        assert!(filter.status.is_none());
        assert_eq!(filter.priority.as_deref(), Some("high"));
    }

    #[tokio::test]
    async fn test_invalid_id_checked_before_storage() {
        let repo = MockTaskRepository::new();
        let handler = handler_with(repo.clone());

        assert!(matches!(handler.get_task("abc").await, Err(ApiError::InvalidId)));
        assert!(matches!(handler.delete_task("-1").await, Err(ApiError::InvalidId)));
        assert!(matches!(
            handler.update_task("1.5", Ok(json!({"title": "x"}))).await,
            Err(ApiError::InvalidId)
        ));
        assert!(repo.call_history().is_empty());
    }

    #[tokio::test]
    async fn test_update_checks_existence_before_emptiness() {
        let repo = MockTaskRepository::with_tasks(create_test_tasks(1));
        let handler = handler_with(repo.clone());

        assert!(matches!(
            handler.update_task("999999", Ok(json!({}))).await,
            Err(ApiError::NotFound)
        ));
        assert!(matches!(
            handler.update_task("1", Ok(json!({"unknown": true}))).await,
            Err(ApiError::NoFieldsToUpdate)
        ));
        repo.assert_not_called("update");
    }

    #[tokio::test]
    async fn test_update_missing_task_is_not_found_whatever_the_body() {
        let repo = MockTaskRepository::new();
        let handler = handler_with(repo.clone());

        assert!(matches!(
            handler.update_task("999999", Ok(json!({"status": "done"}))).await,
            Err(ApiError::NotFound)
        ));
        assert!(matches!(
            handler
                .update_task("999999", Err(ApiError::InvalidJson("expected value".to_string())))
                .await,
            Err(ApiError::NotFound)
        ));
        repo.assert_called("get_by_id");
        repo.assert_not_called("update");
    }

    #[tokio::test]
    async fn test_update_validates_body_of_existing_task() {
        let repo = MockTaskRepository::with_tasks(create_test_tasks(1));
        let handler = handler_with(repo.clone());

        assert!(matches!(
            handler.update_task("1", Ok(json!({"status": "done"}))).await,
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            handler
                .update_task("1", Err(ApiError::InvalidJson("expected value".to_string())))
                .await,
            Err(ApiError::InvalidJson(_))
        ));
        repo.assert_not_called("update");
    }

    #[tokio::test]
    async fn test_update_applies_fields() {
        let handler = handler_with(MockTaskRepository::with_tasks(create_test_tasks(1)));
        let task = handler
            .update_task("1", Ok(json!({"status": "completed"})))
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_storage_failure_becomes_generic_internal_error() {
        let repo = MockTaskRepository::new();
        repo.inject_error(TaskError::Database("syntax error at or near".to_string()));
        let handler = handler_with(repo);

        match handler.create_task(&json!({"title": "x"})).await {
            Err(ApiError::Internal { message, .. }) => assert_eq!(message, "Failed to create task"),
            other => panic!("Expected internal error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_health_report_tracks_database() {
        let repo = MockTaskRepository::new();
        let handler = handler_with(repo.clone()).with_version("9.9.9");

        let report = handler.health_report().await.unwrap();
        assert!(report.is_healthy());
        assert_eq!(report.database, "connected");
        assert_eq!(report.environment, "test");
        assert_eq!(report.version, "9.9.9");

        repo.set_available(false);
        let report = handler.health_report().await.unwrap();
        assert_eq!(report.status, "unhealthy");
        assert_eq!(report.database, "disconnected");
        assert!(!handler.readiness().await);
        assert_eq!(handler.liveness().status, "alive");
    }
}
