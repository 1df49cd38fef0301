//! Builder pattern implementations for easy test data construction
//!
//! Provides fluent builders for:
//! - Task construction with sensible defaults
//! - NewTask and UpdateTask variants
//! - Filter construction for query testing

use chrono::{DateTime, Utc};
use task_core::{NewTask, Task, TaskFilter, TaskPriority, TaskStatus, UpdateTask};

/// Builder for constructing Task instances in tests
pub struct TaskBuilder {
    task: Task,
}

impl Default for TaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskBuilder {
    /// Create new builder with default values
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            task: Task {
                id: 1,
                title: "Test Task".to_string(),
                description: Some("A test task".to_string()),
                status: TaskStatus::Pending,
                priority: TaskPriority::Medium,
                created_at: now,
                updated_at: now,
                due_date: None,
            },
        }
    }

    pub fn with_id(mut self, id: i32) -> Self {
        self.task.id = id;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.task.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.task.description = Some(description.into());
        self
    }

    pub fn without_description(mut self) -> Self {
        self.task.description = None;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.task.status = status;
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.task.priority = priority;
        self
    }

    /// Set creation timestamp; `updated_at` follows unless set afterwards
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.task.created_at = created_at;
        self.task.updated_at = created_at;
        self
    }

    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.task.updated_at = updated_at;
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.task.due_date = Some(due_date);
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

/// Builder for NewTask instances
pub struct NewTaskBuilder {
    new_task: NewTask,
}

impl Default for NewTaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NewTaskBuilder {
    pub fn new() -> Self {
        Self {
            new_task: NewTask::new("New Task"),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.new_task.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.new_task.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.new_task.status = status;
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.new_task.priority = priority;
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.new_task.due_date = Some(due_date);
        self
    }

    pub fn build(self) -> NewTask {
        self.new_task
    }
}

/// Builder for UpdateTask instances
#[derive(Default)]
pub struct UpdateTaskBuilder {
    update: UpdateTask,
}

impl UpdateTaskBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.update.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.update.description = Some(Some(description.into()));
        self
    }

    /// Clear the stored description
    pub fn clear_description(mut self) -> Self {
        self.update.description = Some(None);
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.update.status = Some(status);
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.update.priority = Some(priority);
        self
    }

    pub fn due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.update.due_date = Some(Some(due_date));
        self
    }

    /// Clear the stored due date
    pub fn clear_due_date(mut self) -> Self {
        self.update.due_date = Some(None);
        self
    }

    pub fn build(self) -> UpdateTask {
        self.update
    }
}

/// Builder for TaskFilter instances
#[derive(Default)]
pub struct TaskFilterBuilder {
    filter: TaskFilter,
}

impl TaskFilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.filter.status = Some(status.as_str().to_string());
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.filter.priority = Some(priority.as_str().to_string());
        self
    }

    /// Raw filter value, including values no task can have
    pub fn with_raw_status(mut self, status: impl Into<String>) -> Self {
        self.filter.status = Some(status.into());
        self
    }

    pub fn build(self) -> TaskFilter {
        self.filter
    }
}
