use crate::{
    auth::{AuthenticatedUser, RoleKind},
    error::AppError,
    guard::{self, Dependency, Table, UniqueKey},
    models::{
        task::{TASK_COLUMNS, TRACKED_TASK_STATUSES},
        Kelas, KelasInput, KelasPatch, KelasSummary, Task, TaskWithProject,
    },
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::{json, Map, Value};
use sqlx::SqlitePool;
use validator::Validate;

async fn fetch_kelas(pool: &SqlitePool, id: i64) -> Result<Kelas, AppError> {
    sqlx::query_as::<_, Kelas>("SELECT id, name FROM kelas WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Table::Kelas.not_found())
}

/// Lists every class with the number of tasks assigned to it.
#[get("")]
pub async fn list_kelas(
    pool: web::Data<SqlitePool>,
    _caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let kelas = sqlx::query_as::<_, KelasSummary>(
        "SELECT k.id, k.name, COUNT(t.id) AS tasks_count \
         FROM kelas k LEFT JOIN tasks t ON t.kelas_id = k.id \
         GROUP BY k.id, k.name ORDER BY k.id",
    )
    .fetch_all(&**pool)
    .await?;
    Ok(HttpResponse::Ok().json(kelas))
}

#[get("/{id}")]
pub async fn get_kelas(
    pool: web::Data<SqlitePool>,
    _caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let kelas = fetch_kelas(&pool, id.into_inner()).await?;
    let tasks = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE kelas_id = ?1 ORDER BY id",
        TASK_COLUMNS
    ))
    .bind(kelas.id)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "id": kelas.id,
        "name": kelas.name,
        "tasks": tasks,
    })))
}

#[post("")]
pub async fn create_kelas(
    pool: web::Data<SqlitePool>,
    caller: AuthenticatedUser,
    input: web::Json<KelasInput>,
) -> Result<impl Responder, AppError> {
    caller.require_role(RoleKind::Admin)?;
    input.validate()?;
    guard::ensure_unique(&pool, UniqueKey::KelasName, input.name.as_str(), None).await?;

    let kelas = sqlx::query_as::<_, Kelas>("INSERT INTO kelas (name) VALUES (?1) RETURNING id, name")
        .bind(&input.name)
        .fetch_one(&**pool)
        .await?;

    log::info!("Class {} ({}) created by {}", kelas.id, kelas.name, caller.id());
    Ok(HttpResponse::Created().json(kelas))
}

#[put("/{id}")]
pub async fn update_kelas(
    pool: web::Data<SqlitePool>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
    patch: web::Json<KelasPatch>,
) -> Result<impl Responder, AppError> {
    caller.require_role(RoleKind::Admin)?;
    patch.validate()?;
    let id = id.into_inner();
    let current = fetch_kelas(&pool, id).await?;

    let Some(name) = patch.into_inner().name else {
        return Ok(HttpResponse::Ok().json(current));
    };
    guard::ensure_unique(&pool, UniqueKey::KelasName, name.as_str(), Some(id)).await?;

    let kelas = sqlx::query_as::<_, Kelas>("UPDATE kelas SET name = ?1 WHERE id = ?2 RETURNING id, name")
        .bind(&name)
        .bind(id)
        .fetch_one(&**pool)
        .await?;

    log::info!("Class {} renamed to {} by {}", id, kelas.name, caller.id());
    Ok(HttpResponse::Ok().json(kelas))
}

/// Deletes a class. Refused with 409 while tasks are still assigned to it.
#[delete("/{id}")]
pub async fn delete_kelas(
    pool: web::Data<SqlitePool>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    caller.require_role(RoleKind::Admin)?;
    let id = id.into_inner();
    fetch_kelas(&pool, id).await?;
    guard::ensure_no_dependents(&pool, Dependency::TasksOfKelas, id).await?;

    sqlx::query("DELETE FROM kelas WHERE id = ?1")
        .bind(id)
        .execute(&**pool)
        .await?;

    log::info!("Class {} deleted by {}", id, caller.id());
    Ok(HttpResponse::Ok().json(json!({ "message": "Class deleted successfully" })))
}

/// Tasks of a class, each with its project's id and name.
#[get("/{id}/tasks")]
pub async fn get_kelas_tasks(
    pool: web::Data<SqlitePool>,
    _caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let kelas = fetch_kelas(&pool, id.into_inner()).await?;
    let tasks = sqlx::query_as::<_, TaskWithProject>(
        "SELECT t.id, t.title, t.description, t.status, t.due_date, t.project_id, p.name AS project_name \
         FROM tasks t JOIN projects p ON p.id = t.project_id \
         WHERE t.kelas_id = ?1 ORDER BY t.id",
    )
    .bind(kelas.id)
    .fetch_all(&**pool)
    .await?;

    let tasks: Vec<Value> = tasks
        .into_iter()
        .map(|t| {
            json!({
                "id": t.id,
                "title": t.title,
                "description": t.description,
                "status": t.status,
                "due_date": t.due_date,
                "project": { "id": t.project_id, "name": t.project_name },
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "kelas_id": kelas.id,
        "kelas_name": kelas.name,
        "tasks": tasks,
    })))
}

/// Per-status task counts for a class.
///
/// Only the tracked statuses get their own bucket; free-form statuses still
/// count toward `total_tasks`.
#[get("/{id}/tasks/status")]
pub async fn get_kelas_task_statistics(
    pool: web::Data<SqlitePool>,
    _caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let kelas = fetch_kelas(&pool, id.into_inner()).await?;
    let counts = sqlx::query_as::<_, (String, i64)>(
        "SELECT status, COUNT(*) FROM tasks WHERE kelas_id = ?1 GROUP BY status",
    )
    .bind(kelas.id)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(task_statistics(&kelas, &counts)))
}

fn task_statistics(kelas: &Kelas, counts: &[(String, i64)]) -> Value {
    let mut buckets = Map::new();
    for status in TRACKED_TASK_STATUSES {
        let count = counts
            .iter()
            .find(|(s, _)| s == status)
            .map_or(0, |(_, n)| *n);
        buckets.insert(status.to_string(), json!(count));
    }
    let total: i64 = counts.iter().map(|(_, n)| n).sum();

    json!({
        "kelas_id": kelas.id,
        "kelas_name": kelas.name,
        "task_statistics": buckets,
        "total_tasks": total,
    })
}
