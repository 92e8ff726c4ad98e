use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A user as returned by the API. The password hash never leaves the store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct UserView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role_id: i64,
    /// Name of the role referenced by `role_id`.
    pub role: String,
}

/// Columns needed to check a login attempt and issue a token.
#[derive(Debug, FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UserPatch {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(email, length(max = 120))]
    pub email: Option<String>,
    pub role_id: Option<i64>,
}

pub const USER_VIEW_SELECT: &str = "SELECT u.id, u.name, u.email, u.role_id, r.name AS role \
     FROM users u JOIN roles r ON r.id = u.role_id";
