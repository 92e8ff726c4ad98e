use crate::{
    auth::{AuthenticatedUser, RoleKind},
    error::AppError,
    guard::{self, Table},
    models::{
        task::TASK_COLUMNS, Task, TaskFields, TaskInput, TaskPatch, TaskQuery, TaskStatusUpdate,
    },
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

const TASK_EDITORS: [RoleKind; 2] = [RoleKind::Admin, RoleKind::Dosen];

async fn fetch_task(pool: &SqlitePool, id: i64) -> Result<Task, AppError> {
    sqlx::query_as::<_, Task>(&format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Table::Tasks.not_found())
}

/// Both references of a task must point at existing rows.
async fn ensure_task_references(pool: &SqlitePool, fields: &TaskFields) -> Result<(), AppError> {
    guard::ensure_exists(pool, Table::Projects, fields.project_id).await?;
    guard::ensure_exists(pool, Table::Kelas, fields.kelas_id).await?;
    Ok(())
}

/// Retrieves tasks, optionally filtered.
///
/// ## Query Parameters:
/// - `project_id` (optional): only tasks of this project.
/// - `kelas_id` (optional): only tasks assigned to this class.
/// - `status` (optional): exact status match.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects ordered by id.
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn list_tasks(
    pool: web::Data<SqlitePool>,
    _caller: AuthenticatedUser,
    query_params: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let mut sql = format!("SELECT {} FROM tasks", TASK_COLUMNS);
    let mut conditions: Vec<String> = Vec::new();
    let mut param_count = 1;

    if query_params.project_id.is_some() {
        conditions.push(format!("project_id = ?{}", param_count));
        param_count += 1;
    }
    if query_params.kelas_id.is_some() {
        conditions.push(format!("kelas_id = ?{}", param_count));
        param_count += 1;
    }
    if query_params.status.is_some() {
        conditions.push(format!("status = ?{}", param_count));
    }

    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(" ORDER BY id");

    let mut query_builder = sqlx::query_as::<_, Task>(&sql);
    if let Some(project_id) = query_params.project_id {
        query_builder = query_builder.bind(project_id);
    }
    if let Some(kelas_id) = query_params.kelas_id {
        query_builder = query_builder.bind(kelas_id);
    }
    if let Some(status) = &query_params.status {
        query_builder = query_builder.bind(status);
    }

    let tasks = query_builder.fetch_all(&**pool).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<SqlitePool>,
    _caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(fetch_task(&pool, id.into_inner()).await?))
}

/// Creates a task in a project and assigns it to a class.
///
/// ## Responses:
/// - `201 Created`: the stored `Task`.
/// - `400 Bad Request`: invalid fields or a `due_date` not in `YYYY-MM-DD` form.
/// - `403 Forbidden`: caller is neither Admin nor Dosen.
/// - `404 Not Found`: the project or class does not exist.
#[post("")]
pub async fn create_task(
    pool: web::Data<SqlitePool>,
    caller: AuthenticatedUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    caller.require_any_role(&TASK_EDITORS)?;
    task_data.validate()?;
    let fields = task_data.into_inner().into_task_fields()?;
    ensure_task_references(&pool, &fields).await?;

    let task = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (project_id, kelas_id, title, description, status, due_date) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(fields.project_id)
    .bind(fields.kelas_id)
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(&fields.status)
    .bind(fields.due_date)
    .fetch_one(&**pool)
    .await?;

    log::info!(
        "Task {} created in project {} for class {} by {}",
        task.id,
        task.project_id,
        task.kelas_id,
        caller.id()
    );
    Ok(HttpResponse::Created().json(task))
}

/// Partial update. A rejected field leaves the stored task untouched.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<SqlitePool>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
    patch: web::Json<TaskPatch>,
) -> Result<impl Responder, AppError> {
    caller.require_any_role(&TASK_EDITORS)?;
    patch.validate()?;
    let id = id.into_inner();
    let current = fetch_task(&pool, id).await?;
    let fields = patch.into_inner().merge_into(&current)?;
    if fields.project_id != current.project_id || fields.kelas_id != current.kelas_id {
        ensure_task_references(&pool, &fields).await?;
    }

    let task = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks SET project_id = ?1, kelas_id = ?2, title = ?3, description = ?4, \
         status = ?5, due_date = ?6 WHERE id = ?7 RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(fields.project_id)
    .bind(fields.kelas_id)
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(&fields.status)
    .bind(fields.due_date)
    .bind(id)
    .fetch_one(&**pool)
    .await?;

    log::info!("Task {} updated by {}", id, caller.id());
    Ok(HttpResponse::Ok().json(task))
}

#[patch("/{id}/status")]
pub async fn update_task_status(
    pool: web::Data<SqlitePool>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
    body: web::Json<TaskStatusUpdate>,
) -> Result<impl Responder, AppError> {
    caller.require_any_role(&TASK_EDITORS)?;
    body.validate()?;
    let id = id.into_inner();

    let task = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks SET status = ?1 WHERE id = ?2 RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(&body.status)
    .bind(id)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| Table::Tasks.not_found())?;

    log::info!("Task {} status set to {:?} by {}", id, task.status, caller.id());
    Ok(HttpResponse::Ok().json(task))
}

#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<SqlitePool>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    caller.require_role(RoleKind::Admin)?;
    let id = id.into_inner();

    let result = sqlx::query("DELETE FROM tasks WHERE id = ?1")
        .bind(id)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Table::Tasks.not_found());
    }

    log::info!("Task {} deleted by {}", id, caller.id());
    Ok(HttpResponse::Ok().json(json!({ "message": "Task deleted successfully" })))
}
