use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RoleInput {
    #[validate(length(min = 1, max = 50, message = "Role name is required"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RolePatch {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
}
