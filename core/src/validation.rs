use crate::{
    error::{Result, TaskError},
    models::{NewTask, TaskPriority, TaskStatus, UpdateTask},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

/// Maximum title length in characters
pub const MAX_TITLE_LENGTH: usize = 255;

/// Maximum description length in characters
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Validation utilities for task input.
///
/// Request bodies are validated as raw JSON so that every violated field is
/// reported at once, instead of stopping at the first deserialization error.
pub struct TaskValidator;

impl TaskValidator {
    /// Validate a task identifier taken from a URL path.
    ///
    /// The identifier must be a plain ASCII digit string. A digit string that
    /// does not fit the id column cannot name an existing row and is reported
    /// as not found.
    ///
    /// # Returns
    /// * `Ok(i32)` - The parsed identifier
    /// * `Err(TaskError::InvalidId)` - If the identifier is not all digits
    /// * `Err(TaskError::NotFound)` - If the digits overflow the id column
    pub fn validate_task_id(raw: &str) -> Result<i32> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TaskError::invalid_id(raw));
        }

        raw.parse::<i32>()
            .map_err(|_| TaskError::NotFound(format!("Task with ID {raw} not found")))
    }

    /// Validate a create body and build the insert payload.
    ///
    /// `title` is required; every other field is optional. Unknown keys are
    /// ignored. All violations are collected into one `TaskError::Validation`.
    pub fn validate_new_task(body: &Value) -> Result<NewTask> {
        let object = expect_object(body)?;
        let mut errors = Vec::new();

        let title = match object.get("title") {
            None => {
                errors.push("\"title\" is required".to_string());
                None
            }
            Some(value) => validate_title(value, &mut errors),
        };
        let description = object
            .get("description")
            .and_then(|value| validate_description(value, &mut errors));
        let status = object
            .get("status")
            .and_then(|value| validate_status(value, &mut errors));
        let priority = object
            .get("priority")
            .and_then(|value| validate_priority(value, &mut errors));
        let due_date = object
            .get("due_date")
            .and_then(|value| validate_due_date(value, &mut errors));

        if !errors.is_empty() {
            return Err(TaskError::Validation(errors));
        }

        let title = title.ok_or_else(|| TaskError::validation("\"title\" is required"))?;

        Ok(NewTask {
            title,
            description: description.flatten(),
            status: status.unwrap_or_default(),
            priority: priority.unwrap_or_default(),
            due_date: due_date.flatten(),
        })
    }

    /// Validate an update body.
    ///
    /// Every field is optional. The returned `UpdateTask` may be empty; the
    /// caller decides how to treat a body without recognized fields.
    pub fn validate_update_task(body: &Value) -> Result<UpdateTask> {
        let object = expect_object(body)?;
        let mut errors = Vec::new();

        let update = UpdateTask {
            title: object
                .get("title")
                .and_then(|value| validate_title(value, &mut errors)),
            description: object
                .get("description")
                .and_then(|value| validate_description(value, &mut errors)),
            status: object
                .get("status")
                .and_then(|value| validate_status(value, &mut errors)),
            priority: object
                .get("priority")
                .and_then(|value| validate_priority(value, &mut errors)),
            due_date: object
                .get("due_date")
                .and_then(|value| validate_due_date(value, &mut errors)),
        };

        if errors.is_empty() {
            Ok(update)
        } else {
            Err(TaskError::Validation(errors))
        }
    }

    /// Parse an ISO-8601 date or date-time.
    ///
    /// Accepts RFC 3339 timestamps, offset-less date-times (read as UTC) and
    /// bare dates (midnight UTC).
    pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();

        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }

        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(naive.and_utc());
            }
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}

fn expect_object(body: &Value) -> Result<&Map<String, Value>> {
    body.as_object()
        .ok_or_else(|| TaskError::validation("\"value\" must be of type object"))
}

fn validate_title(value: &Value, errors: &mut Vec<String>) -> Option<String> {
    let Some(title) = value.as_str() else {
        errors.push("\"title\" must be a string".to_string());
        return None;
    };

    if title.is_empty() {
        errors.push("\"title\" is not allowed to be empty".to_string());
        return None;
    }

    if title.chars().count() > MAX_TITLE_LENGTH {
        errors.push(format!(
            "\"title\" length must be less than or equal to {MAX_TITLE_LENGTH} characters long"
        ));
        return None;
    }

    Some(title.to_string())
}

// Outer None: invalid. Some(None): explicit null.
fn validate_description(value: &Value, errors: &mut Vec<String>) -> Option<Option<String>> {
    match value {
        Value::Null => Some(None),
        Value::String(description) => {
            if description.chars().count() > MAX_DESCRIPTION_LENGTH {
                errors.push(format!(
                    "\"description\" length must be less than or equal to {MAX_DESCRIPTION_LENGTH} characters long"
                ));
                None
            } else {
                Some(Some(description.clone()))
            }
        }
        _ => {
            errors.push("\"description\" must be a string".to_string());
            None
        }
    }
}

fn validate_status(value: &Value, errors: &mut Vec<String>) -> Option<TaskStatus> {
    let parsed = value.as_str().and_then(|s| s.parse::<TaskStatus>().ok());
    if parsed.is_none() {
        errors.push("\"status\" must be one of [pending, in_progress, completed]".to_string());
    }
    parsed
}

fn validate_priority(value: &Value, errors: &mut Vec<String>) -> Option<TaskPriority> {
    let parsed = value.as_str().and_then(|s| s.parse::<TaskPriority>().ok());
    if parsed.is_none() {
        errors.push("\"priority\" must be one of [low, medium, high]".to_string());
    }
    parsed
}

fn validate_due_date(value: &Value, errors: &mut Vec<String>) -> Option<Option<DateTime<Utc>>> {
    match value {
        Value::Null => Some(None),
        Value::String(raw) => match TaskValidator::parse_due_date(raw) {
            Some(parsed) => Some(Some(parsed)),
            None => {
                errors.push("\"due_date\" must be in ISO 8601 date format".to_string());
                None
            }
        },
        _ => {
            errors.push("\"due_date\" must be in ISO 8601 date format".to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    #[test]
    fn test_validate_task_id() {
        assert_eq!(TaskValidator::validate_task_id("1").unwrap(), 1);
        assert_eq!(TaskValidator::validate_task_id("000123").unwrap(), 123);

        for bad in ["abc", "", "-1", "1.5", "12a", " 1", "1e3", "١٢"] {
            let err = TaskValidator::validate_task_id(bad).unwrap_err();
            assert_eq!(err, TaskError::InvalidId(bad.to_string()), "input {bad:?}");
        }

        let err = TaskValidator::validate_task_id("99999999999999999999").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_new_task_minimal_body_gets_defaults() {
        let task = TaskValidator::validate_new_task(&json!({"title": "Learn Docker"})).unwrap();
        assert_eq!(task.title, "Learn Docker");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert!(task.description.is_none());
        assert!(task.due_date.is_none());
    }

    #[test]
    fn test_new_task_full_body() {
        let body = json!({
            "title": "Ship it",
            "description": "Release 1.0",
            "status": "in_progress",
            "priority": "high",
            "due_date": "2030-01-15"
        });
        let task = TaskValidator::validate_new_task(&body).unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.description.as_deref(), Some("Release 1.0"));
        let due = task.due_date.unwrap();
        assert_eq!((due.year(), due.month(), due.day()), (2030, 1, 15));
    }

    #[test]
    fn test_new_task_reports_every_violation() {
        let body = json!({
            "description": "x".repeat(MAX_DESCRIPTION_LENGTH + 1),
            "status": "done",
            "priority": "urgent",
            "due_date": "next tuesday"
        });
        let err = TaskValidator::validate_new_task(&body).unwrap_err();
        let TaskError::Validation(messages) = err else {
            panic!("expected validation error");
        };
        assert_eq!(messages.len(), 5);
        assert!(messages.contains(&"\"title\" is required".to_string()));
        assert!(messages.iter().any(|m| m.starts_with("\"description\" length")));
        assert!(messages.iter().any(|m| m.starts_with("\"status\"")));
        assert!(messages.iter().any(|m| m.starts_with("\"priority\"")));
        assert!(messages.iter().any(|m| m.starts_with("\"due_date\"")));
    }

    #[test]
    fn test_title_length_bounds() {
        let empty = TaskValidator::validate_new_task(&json!({"title": ""})).unwrap_err();
        assert_eq!(
            empty,
            TaskError::Validation(vec!["\"title\" is not allowed to be empty".to_string()])
        );

        let long = "a".repeat(MAX_TITLE_LENGTH + 1);
        let err = TaskValidator::validate_new_task(&json!({ "title": long })).unwrap_err();
        assert!(err.is_validation());

        // Only length is checked; whitespace counts
        let spaces = TaskValidator::validate_new_task(&json!({"title": "   "})).unwrap();
        assert_eq!(spaces.title, "   ");

        let exact = "a".repeat(MAX_TITLE_LENGTH);
        assert!(TaskValidator::validate_new_task(&json!({ "title": exact })).is_ok());

        // Multi-byte characters count once each
        let wide = "é".repeat(MAX_TITLE_LENGTH);
        assert!(TaskValidator::validate_new_task(&json!({ "title": wide })).is_ok());
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        for body in [json!(null), json!([1, 2]), json!("title")] {
            assert!(TaskValidator::validate_new_task(&body).unwrap_err().is_validation());
            assert!(TaskValidator::validate_update_task(&body).unwrap_err().is_validation());
        }
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let task =
            TaskValidator::validate_new_task(&json!({"title": "t", "owner": "me"})).unwrap();
        assert_eq!(task.title, "t");

        let update = TaskValidator::validate_update_task(&json!({"owner": "me"})).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_update_partial_and_nullable_fields() {
        let update = TaskValidator::validate_update_task(&json!({"status": "completed"})).unwrap();
        assert_eq!(update.status, Some(TaskStatus::Completed));
        assert_eq!(update.changed_fields(), vec!["status"]);

        let update =
            TaskValidator::validate_update_task(&json!({"description": null, "due_date": null}))
                .unwrap();
        assert_eq!(update.description, Some(None));
        assert_eq!(update.due_date, Some(None));

        let empty = TaskValidator::validate_update_task(&json!({})).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_update_rejects_bad_values() {
        let err = TaskValidator::validate_update_task(&json!({"title": "", "priority": 3}))
            .unwrap_err();
        let TaskError::Validation(messages) = err else {
            panic!("expected validation error");
        };
        assert_eq!(messages.len(), 2);

        let err = TaskValidator::validate_update_task(&json!({"title": null})).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_parse_due_date_formats() {
        let rfc = TaskValidator::parse_due_date("2025-06-01T12:30:00+02:00").unwrap();
        assert_eq!(rfc.hour(), 10);

        let zulu = TaskValidator::parse_due_date("2025-06-01T12:30:00.123Z").unwrap();
        assert_eq!(zulu.minute(), 30);

        let naive = TaskValidator::parse_due_date("2025-06-01T08:00:00").unwrap();
        assert_eq!(naive.hour(), 8);

        let date = TaskValidator::parse_due_date("2025-06-01").unwrap();
        assert_eq!((date.hour(), date.day()), (0, 1));

        assert!(TaskValidator::parse_due_date("2025-13-01").is_none());
        assert!(TaskValidator::parse_due_date("tomorrow").is_none());
    }
}
