//! Standard test fixtures for consistent testing
//!
//! Provides pre-built test data including:
//! - Standard tasks in every status and priority
//! - Request bodies, valid and invalid
//! - Bulk task generators with distinct creation times

use chrono::{Duration, Utc};
use serde_json::{json, Value};
use task_core::{NewTask, Task, TaskPriority, TaskStatus, UpdateTask};

use crate::builders::TaskBuilder;

/// Create a basic test task with sensible defaults
pub fn create_test_task() -> Task {
    TaskBuilder::new()
        .with_title("Learn Docker")
        .with_description("Work through the container tutorial")
        .build()
}

/// Create task with specific status
pub fn create_test_task_with_status(status: TaskStatus) -> Task {
    TaskBuilder::new().with_status(status).build()
}

/// Task due yesterday and not completed
pub fn create_overdue_task() -> Task {
    TaskBuilder::new()
        .with_title("Overdue task")
        .with_due_date(Utc::now() - Duration::days(1))
        .build()
}

/// Create `count` tasks with ids 1..=count.
///
/// Task `i` is created `count - i` minutes ago, so higher ids are newer.
/// Statuses and priorities cycle so every value is represented.
pub fn create_test_tasks(count: usize) -> Vec<Task> {
    let now = Utc::now();
    (1..=count)
        .map(|i| {
            TaskBuilder::new()
                .with_id(i as i32)
                .with_title(format!("Test Task {i}"))
                .with_status(TaskStatus::ALL[i % TaskStatus::ALL.len()])
                .with_priority(TaskPriority::ALL[i % TaskPriority::ALL.len()])
                .with_created_at(now - Duration::minutes((count - i) as i64))
                .build()
        })
        .collect()
}

/// Create a NewTask for testing
pub fn create_new_task() -> NewTask {
    NewTask {
        title: "New Task".to_string(),
        description: Some("A freshly created task".to_string()),
        status: TaskStatus::Pending,
        priority: TaskPriority::High,
        due_date: None,
    }
}

/// Create an UpdateTask touching every field
pub fn create_full_update() -> UpdateTask {
    UpdateTask {
        title: Some("Updated Task".to_string()),
        description: Some(Some("Updated description".to_string())),
        status: Some(TaskStatus::InProgress),
        priority: Some(TaskPriority::Low),
        due_date: Some(Some(Utc::now() + Duration::days(7))),
    }
}

/// JSON body accepted by the create endpoint
pub fn valid_create_body() -> Value {
    json!({
        "title": "Learn Docker",
        "description": "Work through the container tutorial",
        "priority": "high",
        "due_date": "2030-01-15T10:00:00Z"
    })
}

/// Create bodies paired with the validation message each must produce
pub fn invalid_create_bodies() -> Vec<(Value, &'static str)> {
    vec![
        (json!({}), "\"title\" is required"),
        (json!({"title": ""}), "\"title\" is not allowed to be empty"),
        (json!({"title": 42}), "\"title\" must be a string"),
        (
            json!({"title": "x".repeat(256)}),
            "\"title\" length must be less than or equal to 255 characters long",
        ),
        (
            json!({"title": "ok", "description": "d".repeat(1001)}),
            "\"description\" length must be less than or equal to 1000 characters long",
        ),
        (
            json!({"title": "ok", "status": "done"}),
            "\"status\" must be one of [pending, in_progress, completed]",
        ),
        (
            json!({"title": "ok", "priority": "urgent"}),
            "\"priority\" must be one of [low, medium, high]",
        ),
        (
            json!({"title": "ok", "due_date": "next tuesday"}),
            "\"due_date\" must be in ISO 8601 date format",
        ),
    ]
}
