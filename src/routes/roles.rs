use crate::{
    auth::{AuthenticatedUser, RoleKind},
    error::AppError,
    guard::{self, Dependency, Table, UniqueKey},
    models::{Role, RoleInput, RolePatch},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

async fn fetch_role(pool: &SqlitePool, id: i64) -> Result<Role, AppError> {
    sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Table::Roles.not_found())
}

/// Gates match seeded roles by name, so those rows are fixed.
fn ensure_not_builtin(role: &Role) -> Result<(), AppError> {
    match RoleKind::from_name(&role.name) {
        Some(kind) => {
            log::warn!("Refused to modify built-in role {}", kind);
            Err(AppError::Conflict(format!("Built-in role {} cannot be modified", kind)))
        }
        None => Ok(()),
    }
}

#[get("")]
pub async fn list_roles(
    pool: web::Data<SqlitePool>,
    _caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let roles = sqlx::query_as::<_, Role>("SELECT id, name FROM roles ORDER BY id")
        .fetch_all(&**pool)
        .await?;
    Ok(HttpResponse::Ok().json(roles))
}

#[get("/{id}")]
pub async fn get_role(
    pool: web::Data<SqlitePool>,
    _caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(fetch_role(&pool, id.into_inner()).await?))
}

#[post("")]
pub async fn create_role(
    pool: web::Data<SqlitePool>,
    caller: AuthenticatedUser,
    input: web::Json<RoleInput>,
) -> Result<impl Responder, AppError> {
    caller.require_role(RoleKind::Admin)?;
    input.validate()?;
    guard::ensure_unique(&pool, UniqueKey::RoleName, input.name.as_str(), None).await?;

    let role = sqlx::query_as::<_, Role>("INSERT INTO roles (name) VALUES (?1) RETURNING id, name")
        .bind(&input.name)
        .fetch_one(&**pool)
        .await?;

    log::info!("Role {} ({}) created by {}", role.id, role.name, caller.id());
    Ok(HttpResponse::Created().json(role))
}

/// Renames a role. Built-in roles keep their names (409).
#[put("/{id}")]
pub async fn update_role(
    pool: web::Data<SqlitePool>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
    patch: web::Json<RolePatch>,
) -> Result<impl Responder, AppError> {
    caller.require_role(RoleKind::Admin)?;
    patch.validate()?;
    let id = id.into_inner();
    let current = fetch_role(&pool, id).await?;

    let Some(name) = patch.into_inner().name else {
        return Ok(HttpResponse::Ok().json(current));
    };
    if name == current.name {
        return Ok(HttpResponse::Ok().json(current));
    }
    ensure_not_builtin(&current)?;
    guard::ensure_unique(&pool, UniqueKey::RoleName, name.as_str(), Some(id)).await?;

    let role = sqlx::query_as::<_, Role>("UPDATE roles SET name = ?1 WHERE id = ?2 RETURNING id, name")
        .bind(&name)
        .bind(id)
        .fetch_one(&**pool)
        .await?;

    log::info!("Role {} renamed to {} by {}", id, role.name, caller.id());
    Ok(HttpResponse::Ok().json(role))
}

/// Deletes a role. Refused with 409 for built-in roles and while any user
/// still holds it.
#[delete("/{id}")]
pub async fn delete_role(
    pool: web::Data<SqlitePool>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    caller.require_role(RoleKind::Admin)?;
    let id = id.into_inner();
    let role = fetch_role(&pool, id).await?;
    ensure_not_builtin(&role)?;
    guard::ensure_no_dependents(&pool, Dependency::UsersOfRole, id).await?;

    sqlx::query("DELETE FROM roles WHERE id = ?1")
        .bind(id)
        .execute(&**pool)
        .await?;

    log::info!("Role {} deleted by {}", id, caller.id());
    Ok(HttpResponse::Ok().json(json!({ "message": "Role deleted successfully" })))
}
