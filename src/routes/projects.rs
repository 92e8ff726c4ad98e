use crate::{
    auth::{AuthenticatedUser, RoleKind},
    error::AppError,
    guard::{self, Dependency, Table},
    models::{task::TASK_COLUMNS, Project, ProjectFields, ProjectInput, ProjectPatch, Task},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

const PROJECT_COLUMNS: &str = "id, name, description, start_date, end_date, status";

pub(crate) async fn fetch_project(pool: &SqlitePool, id: i64) -> Result<Project, AppError> {
    sqlx::query_as::<_, Project>(&format!("SELECT {} FROM projects WHERE id = ?1", PROJECT_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Table::Projects.not_found())
}

#[get("")]
pub async fn list_projects(
    pool: web::Data<SqlitePool>,
    _caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let projects = sqlx::query_as::<_, Project>(&format!(
        "SELECT {} FROM projects ORDER BY id",
        PROJECT_COLUMNS
    ))
    .fetch_all(&**pool)
    .await?;
    Ok(HttpResponse::Ok().json(projects))
}

#[get("/{id}")]
pub async fn get_project(
    pool: web::Data<SqlitePool>,
    _caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(fetch_project(&pool, id.into_inner()).await?))
}

/// Creates a project. Dates must be `YYYY-MM-DD` with start ≤ end, and the
/// status must be one of `ProjectStatus`.
#[post("")]
pub async fn create_project(
    pool: web::Data<SqlitePool>,
    caller: AuthenticatedUser,
    input: web::Json<ProjectInput>,
) -> Result<impl Responder, AppError> {
    caller.require_role(RoleKind::Admin)?;
    input.validate()?;
    let fields = input.into_inner().parse_fields()?;

    let project = sqlx::query_as::<_, Project>(&format!(
        "INSERT INTO projects (name, description, start_date, end_date, status) \
         VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {}",
        PROJECT_COLUMNS
    ))
    .bind(&fields.name)
    .bind(&fields.description)
    .bind(fields.start_date)
    .bind(fields.end_date)
    .bind(fields.status.as_str())
    .fetch_one(&**pool)
    .await?;

    log::info!("Project {} created by {}", project.id, caller.id());
    Ok(HttpResponse::Created().json(project))
}

/// Partial update. The merged record is re-validated as a whole.
#[put("/{id}")]
pub async fn update_project(
    pool: web::Data<SqlitePool>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
    patch: web::Json<ProjectPatch>,
) -> Result<impl Responder, AppError> {
    caller.require_role(RoleKind::Admin)?;
    patch.validate()?;
    let id = id.into_inner();
    let current = fetch_project(&pool, id).await?;
    let fields: ProjectFields = patch.into_inner().merge_into(&current)?;

    let project = sqlx::query_as::<_, Project>(&format!(
        "UPDATE projects SET name = ?1, description = ?2, start_date = ?3, end_date = ?4, status = ?5 \
         WHERE id = ?6 RETURNING {}",
        PROJECT_COLUMNS
    ))
    .bind(&fields.name)
    .bind(&fields.description)
    .bind(fields.start_date)
    .bind(fields.end_date)
    .bind(fields.status.as_str())
    .bind(id)
    .fetch_one(&**pool)
    .await?;

    log::info!("Project {} updated by {}", id, caller.id());
    Ok(HttpResponse::Ok().json(project))
}

/// Deletes a project. Refused with 409 while it still has tasks.
#[delete("/{id}")]
pub async fn delete_project(
    pool: web::Data<SqlitePool>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    caller.require_role(RoleKind::Admin)?;
    let id = id.into_inner();
    fetch_project(&pool, id).await?;
    guard::ensure_no_dependents(&pool, Dependency::TasksOfProject, id).await?;

    sqlx::query("DELETE FROM projects WHERE id = ?1")
        .bind(id)
        .execute(&**pool)
        .await?;

    log::info!("Project {} deleted by {}", id, caller.id());
    Ok(HttpResponse::Ok().json(json!({ "message": "Project deleted successfully" })))
}

#[get("/{id}/tasks")]
pub async fn get_project_tasks(
    pool: web::Data<SqlitePool>,
    _caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let project = fetch_project(&pool, id.into_inner()).await?;
    let tasks = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE project_id = ?1 ORDER BY id",
        TASK_COLUMNS
    ))
    .bind(project.id)
    .fetch_all(&**pool)
    .await?;
    Ok(HttpResponse::Ok().json(tasks))
}
