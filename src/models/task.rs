use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::AppError;
use crate::validation::parse_date;

/// Status given to a task created without one.
pub const DEFAULT_TASK_STATUS: &str = "Not Started";

/// Statuses counted individually in per-class statistics. Task status itself
/// is an open string; values outside this list count only toward the total.
pub const TRACKED_TASK_STATUSES: [&str; 3] = ["Not Started", "In Progress", "Completed"];

/// Column list matching [`Task`]'s field order.
pub const TASK_COLUMNS: &str = "id, project_id, kelas_id, title, description, status, due_date";

/// Represents a task as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Task {
    pub id: i64,
    pub project_id: i64,
    pub kelas_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    /// Serialized as `YYYY-MM-DD`.
    pub due_date: NaiveDate,
}

/// A task together with the name of its project, for class-centric listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct TaskWithProject {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub due_date: NaiveDate,
    pub project_id: i64,
    pub project_name: String,
}

/// Input structure for creating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    pub project_id: i64,
    pub kelas_id: i64,
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    pub description: Option<String>,
    /// Free-form; defaults to [`DEFAULT_TASK_STATUS`].
    #[validate(length(min = 1, max = 20))]
    pub status: Option<String>,
    /// `YYYY-MM-DD`.
    pub due_date: String,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct TaskPatch {
    pub project_id: Option<i64>,
    pub kelas_id: Option<i64>,
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,
    /// `null` clears the stored description.
    #[serde(default, deserialize_with = "super::nullable")]
    pub description: Option<Option<String>>,
    #[validate(length(min = 1, max = 20))]
    pub status: Option<String>,
    pub due_date: Option<String>,
}

/// Body of the status-only update endpoint.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskStatusUpdate {
    #[validate(length(min = 1, max = 20))]
    pub status: String,
}

/// Represents query parameters for filtering tasks when listing them.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    pub project_id: Option<i64>,
    pub kelas_id: Option<i64>,
    pub status: Option<String>,
}

impl TaskInput {
    /// Parses the due date and fills the default status.
    pub fn into_task_fields(self) -> Result<TaskFields, AppError> {
        Ok(TaskFields {
            due_date: parse_date("due_date", &self.due_date)?,
            project_id: self.project_id,
            kelas_id: self.kelas_id,
            title: self.title,
            description: self.description,
            status: self
                .status
                .unwrap_or_else(|| DEFAULT_TASK_STATUS.to_string()),
        })
    }
}

impl TaskPatch {
    pub fn merge_into(self, current: &Task) -> Result<TaskFields, AppError> {
        let due_date = match &self.due_date {
            Some(raw) => parse_date("due_date", raw)?,
            None => current.due_date,
        };
        Ok(TaskFields {
            project_id: self.project_id.unwrap_or(current.project_id),
            kelas_id: self.kelas_id.unwrap_or(current.kelas_id),
            title: self.title.unwrap_or_else(|| current.title.clone()),
            description: self.description.unwrap_or_else(|| current.description.clone()),
            status: self.status.unwrap_or_else(|| current.status.clone()),
            due_date,
        })
    }
}

/// Task columns after parsing, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFields {
    pub project_id: i64,
    pub kelas_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub due_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> Task {
        Task {
            id: 5,
            project_id: 1,
            kelas_id: 2,
            title: "Essay".into(),
            description: Some("1500 words".into()),
            status: "In Progress".into(),
            due_date: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
        }
    }

    #[test]
    fn test_task_input_defaults_status() {
        let input = TaskInput {
            project_id: 1,
            kelas_id: 1,
            title: "Lab report".into(),
            description: None,
            status: None,
            due_date: "2024-11-30".into(),
        };
        assert!(input.validate().is_ok());
        let fields = input.into_task_fields().unwrap();
        assert_eq!(fields.status, DEFAULT_TASK_STATUS);
        assert_eq!(fields.due_date, NaiveDate::from_ymd_opt(2024, 11, 30).unwrap());
    }

    #[test]
    fn test_task_input_validation() {
        let empty_title = TaskInput {
            project_id: 1,
            kelas_id: 1,
            title: String::new(),
            description: None,
            status: None,
            due_date: "2024-11-30".into(),
        };
        assert!(empty_title.validate().is_err());

        let bad_date = TaskInput {
            title: "Quiz".into(),
            due_date: "30/11/2024".into(),
            ..empty_title
        };
        assert!(matches!(bad_date.into_task_fields(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_patch_keeps_untouched_fields() {
        let patch = TaskPatch {
            status: Some("Blocked on feedback".into()),
            ..Default::default()
        };
        let merged = patch.merge_into(&stored()).unwrap();
        assert_eq!(merged.status, "Blocked on feedback");
        assert_eq!(merged.title, "Essay");
        assert_eq!(merged.description.as_deref(), Some("1500 words"));
        assert_eq!(merged.due_date, stored().due_date);
    }

    #[test]
    fn test_patch_null_description_clears_it() {
        let patch: TaskPatch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(patch.description, Some(None));
        let merged = patch.merge_into(&stored()).unwrap();
        assert_eq!(merged.description, None);

        let patch: TaskPatch = serde_json::from_str(r#"{"title": "Essay v2"}"#).unwrap();
        assert_eq!(patch.description, None);
        let merged = patch.merge_into(&stored()).unwrap();
        assert_eq!(merged.description.as_deref(), Some("1500 words"));
    }

    #[test]
    fn test_patch_rejects_bad_due_date() {
        let patch = TaskPatch {
            due_date: Some("31-12-2024".into()),
            ..Default::default()
        };
        assert!(matches!(patch.merge_into(&stored()), Err(AppError::BadRequest(_))));
    }
}
