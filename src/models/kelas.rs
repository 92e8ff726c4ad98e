use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A class/cohort that tasks are assigned to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Kelas {
    pub id: i64,
    pub name: String,
}

/// List entry with the number of tasks assigned to the class.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct KelasSummary {
    pub id: i64,
    pub name: String,
    pub tasks_count: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct KelasInput {
    #[validate(length(min = 1, max = 50, message = "Name is required"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct KelasPatch {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
}
