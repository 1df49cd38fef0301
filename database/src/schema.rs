//! Idempotent schema statements, executed in order on every start.

/// Columns selected whenever a full task row is returned
pub const TASK_COLUMNS: &str =
    "id, title, description, status, priority, created_at, updated_at, due_date";

pub const CREATE_TASKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tasks (
    id SERIAL PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    description TEXT,
    status VARCHAR(20) NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'in_progress', 'completed')),
    priority VARCHAR(10) NOT NULL DEFAULT 'medium'
        CHECK (priority IN ('low', 'medium', 'high')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
    due_date TIMESTAMPTZ
)
"#;

pub const CREATE_STATUS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status)";

pub const CREATE_PRIORITY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_tasks_priority ON tasks(priority)";

pub const CREATE_UPDATED_AT_FUNCTION: &str = r#"
CREATE OR REPLACE FUNCTION update_updated_at_column()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = CURRENT_TIMESTAMP;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql
"#;

pub const DROP_UPDATED_AT_TRIGGER: &str =
    "DROP TRIGGER IF EXISTS update_tasks_updated_at ON tasks";

pub const CREATE_UPDATED_AT_TRIGGER: &str = r#"
CREATE TRIGGER update_tasks_updated_at
    BEFORE UPDATE ON tasks
    FOR EACH ROW
    EXECUTE FUNCTION update_updated_at_column()
"#;

/// Schema steps as (label, statement) pairs in execution order
pub const SCHEMA_STEPS: [(&str, &str); 6] = [
    ("create tasks table", CREATE_TASKS_TABLE),
    ("create status index", CREATE_STATUS_INDEX),
    ("create priority index", CREATE_PRIORITY_INDEX),
    ("create updated_at function", CREATE_UPDATED_AT_FUNCTION),
    ("drop updated_at trigger", DROP_UPDATED_AT_TRIGGER),
    ("create updated_at trigger", CREATE_UPDATED_AT_TRIGGER),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_steps_are_idempotent_forms() {
        assert!(CREATE_TASKS_TABLE.contains("IF NOT EXISTS"));
        assert!(CREATE_STATUS_INDEX.contains("IF NOT EXISTS"));
        assert!(CREATE_PRIORITY_INDEX.contains("IF NOT EXISTS"));
        assert!(CREATE_UPDATED_AT_FUNCTION.contains("CREATE OR REPLACE"));
        assert!(DROP_UPDATED_AT_TRIGGER.contains("IF EXISTS"));
    }

    #[test]
    fn test_schema_step_order() {
        let labels: Vec<&str> = SCHEMA_STEPS.iter().map(|(label, _)| *label).collect();
        assert_eq!(labels[0], "create tasks table");
        // The trigger needs both the table and the function
        let function = labels.iter().position(|l| *l == "create updated_at function").unwrap();
        let trigger = labels.iter().position(|l| *l == "create updated_at trigger").unwrap();
        assert!(function < trigger);
    }

    #[test]
    fn test_check_constraints_cover_every_enum_value() {
        for status in task_core::TaskStatus::ALL {
            assert!(CREATE_TASKS_TABLE.contains(&format!("'{}'", status.as_str())));
        }
        for priority in task_core::TaskPriority::ALL {
            assert!(CREATE_TASKS_TABLE.contains(&format!("'{}'", priority.as_str())));
        }
    }
}
