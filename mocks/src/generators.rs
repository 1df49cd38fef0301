//! Random test data generators using the fake crate
//!
//! Provides realistic random data including:
//! - Task titles and descriptions within the column limits
//! - Random statuses, priorities and due dates
//! - Property-based testing strategies

use chrono::{Duration, Utc};
use fake::faker::lorem::en::{Paragraph, Sentence};
use fake::Fake;
use proptest::prelude::*;
use rand::Rng;
use task_core::validation::{MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH};
use task_core::{NewTask, Task, TaskFilter, TaskPriority, TaskStatus};

/// Generate a realistic task title
pub fn generate_task_title() -> String {
    let title: String = Sentence(3..8).fake();
    title.chars().take(MAX_TITLE_LENGTH).collect()
}

/// Generate a realistic task description
pub fn generate_task_description() -> String {
    let description: String = Paragraph(2..5).fake();
    description.chars().take(MAX_DESCRIPTION_LENGTH).collect()
}

/// Generate a random task status
pub fn generate_random_status() -> TaskStatus {
    TaskStatus::ALL[rand::thread_rng().gen_range(0..TaskStatus::ALL.len())]
}

/// Generate a random task priority
pub fn generate_random_priority() -> TaskPriority {
    TaskPriority::ALL[rand::thread_rng().gen_range(0..TaskPriority::ALL.len())]
}

/// Generate a random NewTask; roughly half carry a due date
pub fn generate_new_task() -> NewTask {
    let mut rng = rand::thread_rng();
    let due_date = rng
        .gen_bool(0.5)
        .then(|| Utc::now() + Duration::days(rng.gen_range(-10..30)));

    NewTask {
        title: generate_task_title(),
        description: Some(generate_task_description()),
        status: generate_random_status(),
        priority: generate_random_priority(),
        due_date,
    }
}

/// Generate a random task with realistic data
pub fn generate_random_task() -> Task {
    let id: u32 = (1..99999).fake();
    let minutes: i64 = (0..10_000).fake();
    let created_at = Utc::now() - Duration::minutes(minutes);
    let new_task = generate_new_task();

    Task {
        id: id as i32,
        title: new_task.title,
        description: new_task.description,
        status: new_task.status,
        priority: new_task.priority,
        created_at,
        updated_at: created_at,
        due_date: new_task.due_date,
    }
}

/// Generate `count` random tasks with unique sequential ids
pub fn generate_random_tasks(count: usize) -> Vec<Task> {
    (1..=count)
        .map(|i| Task {
            id: i as i32,
            ..generate_random_task()
        })
        .collect()
}

/// Proptest strategy for task statuses
pub fn task_status_strategy() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::Pending),
        Just(TaskStatus::InProgress),
        Just(TaskStatus::Completed),
    ]
}

/// Proptest strategy for task priorities
pub fn task_priority_strategy() -> impl Strategy<Value = TaskPriority> {
    prop_oneof![
        Just(TaskPriority::Low),
        Just(TaskPriority::Medium),
        Just(TaskPriority::High),
    ]
}

/// Proptest strategy for titles the validator accepts
pub fn valid_title_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 .,!?-]{0,254}"
}

/// Proptest strategy for path segments that are not plain digit strings
pub fn invalid_task_id_strategy() -> impl Strategy<Value = String> {
    "[0-9]{0,3}[A-Za-z.+-][A-Za-z0-9.+-]{0,5}"
}

/// Proptest strategy for list filters, sometimes with unknown values
pub fn task_filter_strategy() -> impl Strategy<Value = TaskFilter> {
    let status = prop_oneof![
        task_status_strategy().prop_map(|s| s.as_str().to_string()),
        Just("archived".to_string()),
    ];
    let priority = prop_oneof![
        task_priority_strategy().prop_map(|p| p.as_str().to_string()),
        Just("urgent".to_string()),
    ];

    (proptest::option::of(status), proptest::option::of(priority))
        .prop_map(|(status, priority)| TaskFilter { status, priority })
}
