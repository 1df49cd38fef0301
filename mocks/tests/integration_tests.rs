//! Integration tests for the mocks crate
//!
//! Tests the mock implementations and utilities to ensure they work correctly
//! and provide the expected testing capabilities.

use mocks::*;
use proptest::prelude::*;
use std::sync::Arc;
use task_core::{
    PageRequest, Pagination, TaskError, TaskFilter, TaskRepository, TaskStatus, TaskValidator,
};

#[tokio::test]
async fn test_mock_repository_basic_operations() {
    let repo = MockTaskRepository::new();

    let task = repo.create(create_new_task()).await.unwrap();
    assert_eq!(task.id, 1);
    assert_eq!(task.title, "New Task");
    assert_eq!(task.status, TaskStatus::Pending);
    repo.assert_called("create");

    let retrieved = repo.get_by_id(task.id).await.unwrap().unwrap();
    assert_task_equals(&retrieved, &task);
    repo.assert_called("get_by_id");
    repo.assert_not_called("delete");
}

#[tokio::test]
async fn test_mock_repository_error_injection() {
    let repo = MockTaskRepository::new();

    repo.inject_error(TaskError::Database("connection reset".to_string()));

    // Next operation should fail, the one after succeeds
    let result = repo.get_by_id(1).await;
    assert!(matches!(result, Err(TaskError::Database(_))));

    let result = repo.get_by_id(1).await;
    assert!(result.is_ok());

    repo.inject_error(TaskError::Internal("boom".to_string()));
    repo.clear_error();
    assert!(repo.health_check().await.is_ok());
}

#[tokio::test]
async fn test_fixtures_cover_every_status() {
    let tasks = create_test_tasks(6);
    for status in TaskStatus::ALL {
        assert!(tasks.iter().any(|t| t.status == status));
    }

    let repo = MockTaskRepository::with_tasks(tasks);
    let listed = repo
        .list(&TaskFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 6);
    assert_eq!(listed[0].id, 6, "Highest id is newest in the fixture");
    assert_tasks_sorted_newest_first(&listed);
}

#[test]
fn test_invalid_fixture_bodies_fail_with_their_message() {
    for (body, expected) in invalid_create_bodies() {
        match TaskValidator::validate_new_task(&body) {
            Err(TaskError::Validation(messages)) => assert!(
                messages.iter().any(|m| m == expected),
                "Expected {expected:?} in {messages:?} for body {body}"
            ),
            other => panic!("Expected validation failure for {body}, got {other:?}"),
        }
    }

    assert!(TaskValidator::validate_new_task(&valid_create_body()).is_ok());
}

#[test]
fn test_builders_and_matcher() {
    let task = TaskBuilder::new()
        .with_id(7)
        .with_title("Built")
        .with_status(TaskStatus::Completed)
        .build();

    assert_task_matches(
        &task,
        &TaskMatcher::new()
            .with_id(7)
            .with_title("Built")
            .with_status(TaskStatus::Completed),
    );
}

#[test]
fn test_generators_realistic_data() {
    for _ in 0..20 {
        let new_task = generate_new_task();
        assert!(!new_task.title.is_empty());
        assert!(new_task.title.chars().count() <= 255);
        assert!(new_task.description.as_ref().unwrap().chars().count() <= 1000);
    }

    let tasks = generate_random_tasks(5);
    let ids: Vec<i32> = tasks.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_mock_repository_concurrent_access() {
    let repo = Arc::new(MockTaskRepository::new());
    let mut handles = Vec::new();

    for _ in 0..10 {
        let repo = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            repo.create(generate_new_task()).await.unwrap()
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().id);
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 10, "Every concurrent create gets a unique id");
    assert_eq!(repo.task_count(), 10);
}

#[tokio::test]
async fn test_mock_repository_stats() {
    let repo = MockTaskRepository::with_tasks(vec![
        create_overdue_task(),
        TaskBuilder::new()
            .with_id(2)
            .with_status(TaskStatus::Completed)
            .with_due_date(chrono::Utc::now() - chrono::Duration::days(3))
            .build(),
    ]);

    let stats = repo.get_stats().await.unwrap();
    assert_eq!(stats.total_tasks, 2);
    assert_eq!(stats.pending_tasks, 1);
    assert_eq!(stats.completed_tasks, 1);
    assert_eq!(stats.overdue_tasks, 1);
}

#[tokio::test]
async fn test_contract_tests_with_mock() {
    let repo = MockTaskRepository::new();
    test_repository_contract(&repo).await;
}

#[tokio::test]
async fn test_contract_tests_with_prepopulated_mock() {
    let repo = MockTaskRepository::with_tasks(create_test_tasks(12));
    test_repository_contract(&repo).await;
}

proptest! {
    #[test]
    fn prop_valid_titles_are_accepted(title in valid_title_strategy()) {
        let body = serde_json::json!({ "title": title });
        let new_task = TaskValidator::validate_new_task(&body).unwrap();
        prop_assert_eq!(new_task.title, title);
    }

    #[test]
    fn prop_non_digit_ids_are_rejected(raw in invalid_task_id_strategy()) {
        let err = TaskValidator::validate_task_id(&raw).unwrap_err();
        prop_assert!(matches!(err, TaskError::InvalidId(_)));
    }

    #[test]
    fn prop_filters_only_match_their_values(filter in task_filter_strategy()) {
        for task in create_test_tasks(9) {
            if filter.matches(&task) {
                if let Some(status) = &filter.status {
                    prop_assert_eq!(status.as_str(), task.status.as_str());
                }
                if let Some(priority) = &filter.priority {
                    prop_assert_eq!(priority.as_str(), task.priority.as_str());
                }
            }
        }
    }

    #[test]
    fn prop_pagination_is_consistent(page in 1i64..50, limit in 1i64..200, total in 0i64..10_000) {
        let pagination = Pagination::new(PageRequest { page, limit }, total);
        assert_pagination_consistent(&pagination);
    }
}
