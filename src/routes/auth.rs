use crate::{
    auth::{AuthResponse, LoginRequest, PasswordHasher, RegisterRequest, TokenService},
    error::AppError,
    guard::{self, UniqueKey},
    models::UserCredentials,
};
use actix_web::{post, web, HttpResponse, Responder};
use sqlx::SqlitePool;
use validator::Validate;

/// Register a new user
///
/// Public. The referenced role must exist (404) and the email must be unused
/// (409). Returns 201 with a token embedding the new user's role.
#[post("/register")]
pub async fn register(
    pool: web::Data<SqlitePool>,
    tokens: web::Data<TokenService>,
    hasher: web::Data<PasswordHasher>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let role: String = sqlx::query_scalar("SELECT name FROM roles WHERE id = ?1")
        .bind(register_data.role_id)
        .fetch_optional(&**pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Role does not exist".into()))?;

    guard::ensure_unique(&pool, UniqueKey::UserEmail, register_data.email.as_str(), None).await?;

    let password_hash = hasher.hash_password(&register_data.password)?;

    let user_id: i64 = sqlx::query_scalar(
        "INSERT INTO users (name, email, password_hash, role_id) VALUES (?1, ?2, ?3, ?4) RETURNING id",
    )
    .bind(&register_data.name)
    .bind(&register_data.email)
    .bind(&password_hash)
    .bind(register_data.role_id)
    .fetch_one(&**pool)
    .await?;

    let token = tokens.generate_token(user_id, &register_data.email, &role)?;
    log::info!("Registered user {} with role {}", user_id, role);

    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user_id,
        role,
    }))
}

/// Login user
///
/// Verifies the password and issues a token carrying the user's current role.
/// Unknown email and wrong password are indistinguishable (401).
#[post("/login")]
pub async fn login(
    pool: web::Data<SqlitePool>,
    tokens: web::Data<TokenService>,
    hasher: web::Data<PasswordHasher>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let user = sqlx::query_as::<_, UserCredentials>(
        "SELECT u.id, u.email, u.password_hash, r.name AS role \
         FROM users u JOIN roles r ON r.id = u.role_id WHERE u.email = ?1",
    )
    .bind(&login_data.email)
    .fetch_optional(&**pool)
    .await?;

    let invalid = || AppError::Unauthorized("Invalid email or password".into());
    let user = user.ok_or_else(invalid)?;
    if !hasher.verify_password(&login_data.password, &user.password_hash)? {
        log::warn!("Failed login for user {}", user.id);
        return Err(invalid());
    }

    let token = tokens.generate_token(user.id, &user.email, &user.role)?;
    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user_id: user.id,
        role: user.role,
    }))
}
