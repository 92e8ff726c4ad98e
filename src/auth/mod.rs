pub mod extractors;
pub mod middleware;
pub mod password;
pub mod roles;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use roles::RoleKind;
pub use token::{Claims, TokenService};

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// User's email address.
    #[validate(email)]
    pub email: String,
    /// User's password.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name, 1 to 100 characters.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Email address for the new account. Must be unique.
    #[validate(email, length(max = 120))]
    pub email: String,
    /// Password for the new account, at least 6 characters.
    #[validate(length(min = 6))]
    pub password: String,
    /// Id of an existing role.
    pub role_id: i64,
}

/// Response after successful registration or login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The JWT for bearer authentication.
    pub token: String,
    /// The authenticated user's id.
    pub user_id: i64,
    /// The role name embedded in the token.
    pub role: String,
}
