//! Contract test helpers for validating trait implementations
//!
//! Provides standardized tests that any TaskRepository implementation
//! should pass. Assertions on counts are relative to the state before each
//! check, so the suite also runs against a database that already holds rows.
//! It must not run concurrently with other writers to the same store.

use crate::{NewTaskBuilder, TaskFilterBuilder, UpdateTaskBuilder};
use chrono::{Duration, TimeZone, Utc};
use task_core::{PageRequest, TaskError, TaskFilter, TaskPriority, TaskRepository, TaskStatus};

/// Test any TaskRepository implementation with comprehensive contract tests
pub async fn test_repository_contract<R: TaskRepository>(repo: &R) {
    test_health_check_contract(repo).await;
    test_create_contract(repo).await;
    test_get_contract(repo).await;
    test_update_contract(repo).await;
    test_list_contract(repo).await;
    test_delete_contract(repo).await;
    test_stats_contract(repo).await;
}

/// Test task creation contract
pub async fn test_create_contract<R: TaskRepository>(repo: &R) {
    // Whole seconds survive every storage precision
    let due = Utc.with_ymd_and_hms(2030, 1, 15, 10, 0, 0).unwrap();
    let new_task = NewTaskBuilder::new()
        .with_title("Contract create")
        .with_description("Created by the contract suite")
        .with_priority(TaskPriority::High)
        .with_due_date(due)
        .build();

    let task = repo
        .create(new_task.clone())
        .await
        .expect("Create should succeed");

    assert!(task.id > 0, "Created task should have positive ID");
    assert_eq!(task.title, new_task.title, "Created task should preserve title");
    assert_eq!(task.description, new_task.description);
    assert_eq!(task.priority, TaskPriority::High);
    assert_eq!(task.status, TaskStatus::Pending, "New task should default to pending");
    assert_eq!(task.due_date, Some(due));
    assert_eq!(task.created_at, task.updated_at, "Fresh task has equal timestamps");

    let minimal = repo
        .create(NewTaskBuilder::new().with_title("Contract minimal").build())
        .await
        .expect("Create with defaults should succeed");
    assert_eq!(minimal.priority, TaskPriority::Medium);
    assert!(minimal.due_date.is_none());
    assert!(minimal.id > task.id, "IDs should increase");
}

/// Test retrieval contract
pub async fn test_get_contract<R: TaskRepository>(repo: &R) {
    let created = repo
        .create(NewTaskBuilder::new().with_title("Contract get").build())
        .await
        .unwrap();

    let fetched = repo
        .get_by_id(created.id)
        .await
        .expect("Get should succeed")
        .expect("Created task should exist");
    assert_eq!(fetched, created);

    let missing = repo.get_by_id(i32::MAX).await.expect("Get should succeed");
    assert!(missing.is_none(), "Unknown ID should yield None");
}

/// Test partial update contract
pub async fn test_update_contract<R: TaskRepository>(repo: &R) {
    let created = repo
        .create(
            NewTaskBuilder::new()
                .with_title("Contract update")
                .with_description("Before")
                .build(),
        )
        .await
        .unwrap();

    let updated = repo
        .update(created.id, UpdateTaskBuilder::new().status(TaskStatus::InProgress).build())
        .await
        .expect("Update should succeed");

    assert_eq!(updated.status, TaskStatus::InProgress);
    assert_eq!(updated.title, created.title, "Untouched fields stay put");
    assert_eq!(updated.description, created.description);
    assert_eq!(updated.created_at, created.created_at);
    assert!(
        updated.updated_at > created.updated_at,
        "updated_at should advance on update"
    );

    let cleared = repo
        .update(created.id, UpdateTaskBuilder::new().clear_description().build())
        .await
        .expect("Clearing description should succeed");
    assert!(cleared.description.is_none());
    assert_eq!(cleared.status, TaskStatus::InProgress);

    match repo.update(created.id, UpdateTaskBuilder::new().build()).await {
        Err(TaskError::NoFieldsToUpdate) => {}
        other => panic!("Expected NoFieldsToUpdate, got {other:?}"),
    }

    let missing = repo
        .update(i32::MAX, UpdateTaskBuilder::new().title("Ghost").build())
        .await;
    assert!(
        matches!(missing, Err(TaskError::NotFound(_))),
        "Updating a missing task should be NotFound, got {missing:?}"
    );
}

/// Test listing, filtering and pagination contract
pub async fn test_list_contract<R: TaskRepository>(repo: &R) {
    let completed_low = TaskFilterBuilder::new()
        .with_status(TaskStatus::Completed)
        .with_priority(TaskPriority::Low)
        .build();
    let all = TaskFilter::default();

    let before_filtered = repo.count(&completed_low).await.unwrap();
    let before_all = repo.count(&all).await.unwrap();

    let mut created = Vec::new();
    for i in 0..3 {
        let task = repo
            .create(
                NewTaskBuilder::new()
                    .with_title(format!("Contract list {i}"))
                    .with_status(TaskStatus::Completed)
                    .with_priority(TaskPriority::Low)
                    .build(),
            )
            .await
            .unwrap();
        created.push(task);
    }

    assert_eq!(repo.count(&completed_low).await.unwrap(), before_filtered + 3);
    assert_eq!(repo.count(&all).await.unwrap(), before_all + 3);

    // Newest first: the last created task leads an unfiltered listing
    let first_page = repo
        .list(&all, PageRequest { page: 1, limit: 2 })
        .await
        .unwrap();
    assert_eq!(first_page.len(), 2, "Limit caps the page size");
    assert_eq!(first_page[0].id, created[2].id);
    assert_eq!(first_page[1].id, created[1].id);
    crate::assert_tasks_sorted_newest_first(&first_page);

    let second_page = repo
        .list(&all, PageRequest { page: 2, limit: 2 })
        .await
        .unwrap();
    assert_eq!(second_page[0].id, created[0].id, "Offset skips earlier pages");

    let filtered = repo
        .list(&completed_low, PageRequest { page: 1, limit: 1000 })
        .await
        .unwrap();
    crate::assert_tasks_match_filter(&filtered, &completed_low);
    for task in &created {
        assert!(filtered.iter().any(|t| t.id == task.id));
    }

    let unknown = TaskFilterBuilder::new().with_raw_status("archived").build();
    assert_eq!(repo.count(&unknown).await.unwrap(), 0);
    assert!(repo
        .list(&unknown, PageRequest::default())
        .await
        .unwrap()
        .is_empty());

    let past_end = repo
        .list(&all, PageRequest { page: 100_000, limit: 10 })
        .await
        .unwrap();
    assert!(past_end.is_empty(), "Pages past the end are empty");
}

/// Test hard delete contract
pub async fn test_delete_contract<R: TaskRepository>(repo: &R) {
    let created = repo
        .create(NewTaskBuilder::new().with_title("Contract delete").build())
        .await
        .unwrap();

    let deleted = repo
        .delete(created.id)
        .await
        .expect("Delete should succeed")
        .expect("Delete should return the removed row");
    assert_eq!(deleted, created);

    assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    assert!(
        repo.delete(created.id).await.unwrap().is_none(),
        "Deleting twice should find nothing"
    );
}

/// Test health check contract
pub async fn test_health_check_contract<R: TaskRepository>(repo: &R) {
    repo.health_check()
        .await
        .expect("Healthy repository should pass health check");
}

/// Test aggregate statistics contract
pub async fn test_stats_contract<R: TaskRepository>(repo: &R) {
    let before = repo.get_stats().await.expect("Stats should succeed");

    repo.create(
        NewTaskBuilder::new()
            .with_title("Contract overdue")
            .with_priority(TaskPriority::High)
            .with_due_date(Utc::now() - Duration::days(1))
            .build(),
    )
    .await
    .unwrap();
    repo.create(
        NewTaskBuilder::new()
            .with_title("Contract done late")
            .with_status(TaskStatus::Completed)
            .with_due_date(Utc::now() - Duration::days(1))
            .build(),
    )
    .await
    .unwrap();

    let after = repo.get_stats().await.expect("Stats should succeed");

    assert_eq!(after.total_tasks, before.total_tasks + 2);
    assert_eq!(after.pending_tasks, before.pending_tasks + 1);
    assert_eq!(after.completed_tasks, before.completed_tasks + 1);
    assert_eq!(after.in_progress_tasks, before.in_progress_tasks);
    assert_eq!(after.high_priority_tasks, before.high_priority_tasks + 1);
    assert_eq!(
        after.overdue_tasks,
        before.overdue_tasks + 1,
        "Completed tasks are never overdue"
    );
    assert_eq!(
        after.total_tasks,
        after.pending_tasks + after.in_progress_tasks + after.completed_tasks
    );
}
