use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::AppError;
use crate::validation::{ensure_date_range, parse_date};

/// The closed set of project statuses. Stored and sent as the display string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    Planned,
    InProgress,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 5] = [
        ProjectStatus::Planned,
        ProjectStatus::InProgress,
        ProjectStatus::OnHold,
        ProjectStatus::Completed,
        ProjectStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Planned => "Planned",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::OnHold => "On Hold",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::Cancelled => "Cancelled",
        }
    }

    /// Fails with `BadRequest` listing the accepted values.
    pub fn parse(value: &str) -> Result<ProjectStatus, AppError> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|s| s.as_str()).collect();
                AppError::BadRequest(format!(
                    "Invalid status '{}'. Must be one of: {}",
                    value,
                    allowed.join(", ")
                ))
            })
    }
}

/// A project as stored and returned. Dates serialize as `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
}

/// Create payload. Dates arrive as text and are parsed by [`ProjectInput::parse_fields`].
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ProjectInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub status: String,
}

/// Fields of a project after parsing and validation, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectFields {
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ProjectStatus,
}

impl ProjectInput {
    pub fn parse_fields(self) -> Result<ProjectFields, AppError> {
        let start_date = parse_date("start_date", &self.start_date)?;
        let end_date = parse_date("end_date", &self.end_date)?;
        ensure_date_range(start_date, end_date)?;
        Ok(ProjectFields {
            name: self.name,
            description: self.description,
            start_date,
            end_date,
            status: ProjectStatus::parse(&self.status)?,
        })
    }
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct ProjectPatch {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    /// `null` clears the stored description.
    #[serde(default, deserialize_with = "super::nullable")]
    pub description: Option<Option<String>>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
}

impl ProjectPatch {
    /// Applies the patch over `current` and validates the merged record, so a
    /// patch touching only one date is still checked against the other.
    pub fn merge_into(self, current: &Project) -> Result<ProjectFields, AppError> {
        let start_date = match &self.start_date {
            Some(raw) => parse_date("start_date", raw)?,
            None => current.start_date,
        };
        let end_date = match &self.end_date {
            Some(raw) => parse_date("end_date", raw)?,
            None => current.end_date,
        };
        ensure_date_range(start_date, end_date)?;
        let status = ProjectStatus::parse(self.status.as_deref().unwrap_or(&current.status))?;

        Ok(ProjectFields {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            description: self.description.unwrap_or_else(|| current.description.clone()),
            start_date,
            end_date,
            status,
        })
    }
}
