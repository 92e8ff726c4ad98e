use crate::{
    auth::{AuthenticatedUser, RoleKind},
    error::AppError,
    guard::{self, Table, UniqueKey},
    models::{user::USER_VIEW_SELECT, UserPatch, UserView},
};
use actix_web::{delete, get, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

pub(crate) async fn fetch_user(pool: &SqlitePool, id: i64) -> Result<UserView, AppError> {
    sqlx::query_as::<_, UserView>(&format!("{} WHERE u.id = ?1", USER_VIEW_SELECT))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Table::Users.not_found())
}

#[get("")]
pub async fn list_users(
    pool: web::Data<SqlitePool>,
    _caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let users = sqlx::query_as::<_, UserView>(&format!("{} ORDER BY u.id", USER_VIEW_SELECT))
        .fetch_all(&**pool)
        .await?;
    Ok(HttpResponse::Ok().json(users))
}

#[get("/{id}")]
pub async fn get_user(
    pool: web::Data<SqlitePool>,
    _caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(fetch_user(&pool, id.into_inner()).await?))
}

/// Updates name, email and/or role of a user. Admin only.
///
/// Tokens already issued to the user keep their old role until they expire.
#[put("/{id}")]
pub async fn update_user(
    pool: web::Data<SqlitePool>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
    patch: web::Json<UserPatch>,
) -> Result<impl Responder, AppError> {
    caller.require_role(RoleKind::Admin)?;
    patch.validate()?;
    let id = id.into_inner();
    let current = fetch_user(&pool, id).await?;
    let patch = patch.into_inner();

    if let Some(email) = &patch.email {
        guard::ensure_unique(&pool, UniqueKey::UserEmail, email.as_str(), Some(id)).await?;
    }
    if let Some(role_id) = patch.role_id {
        guard::ensure_exists(&pool, Table::Roles, role_id).await?;
    }

    sqlx::query("UPDATE users SET name = ?1, email = ?2, role_id = ?3 WHERE id = ?4")
        .bind(patch.name.unwrap_or(current.name))
        .bind(patch.email.unwrap_or(current.email))
        .bind(patch.role_id.unwrap_or(current.role_id))
        .bind(id)
        .execute(&**pool)
        .await?;

    log::info!("User {} updated by {}", id, caller.id());
    Ok(HttpResponse::Ok().json(fetch_user(&pool, id).await?))
}

/// Deletes a user and, through the schema, any profiles they own. Admin only.
#[delete("/{id}")]
pub async fn delete_user(
    pool: web::Data<SqlitePool>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    caller.require_role(RoleKind::Admin)?;
    let id = id.into_inner();

    let result = sqlx::query("DELETE FROM users WHERE id = ?1")
        .bind(id)
        .execute(&**pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Table::Users.not_found());
    }

    log::info!("User {} deleted by {}", id, caller.id());
    Ok(HttpResponse::Ok().json(json!({ "message": "User deleted successfully" })))
}
