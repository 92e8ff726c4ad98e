//! Handler bodies shared by the `/mahasiswa` and `/dosen` resources.
//!
//! Callers apply the role gate before delegating here.

use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    guard::{self, Table},
    models::{NewProfile, Profile, ProfileKind},
};
use actix_web::HttpResponse;
use serde_json::json;
use sqlx::SqlitePool;

async fn fetch_profile(pool: &SqlitePool, kind: ProfileKind, id: i64) -> Result<Profile, AppError> {
    sqlx::query_as::<_, Profile>(&format!("{} WHERE p.id = ?1", kind.select_sql()))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| kind.table().not_found())
}

pub(crate) async fn list(pool: &SqlitePool, kind: ProfileKind) -> Result<HttpResponse, AppError> {
    let profiles = sqlx::query_as::<_, Profile>(&format!("{} ORDER BY p.id", kind.select_sql()))
        .fetch_all(pool)
        .await?;
    let body: Vec<_> = profiles.iter().map(|p| p.to_json(kind)).collect();
    Ok(HttpResponse::Ok().json(body))
}

pub(crate) async fn get(pool: &SqlitePool, kind: ProfileKind, id: i64) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(fetch_profile(pool, kind, id).await?.to_json(kind)))
}

/// The target user must exist, must not already own a profile of this kind,
/// and the identifier must be unused.
pub(crate) async fn create(
    pool: &SqlitePool,
    caller: &AuthenticatedUser,
    kind: ProfileKind,
    new: NewProfile,
) -> Result<HttpResponse, AppError> {
    guard::ensure_exists(pool, Table::Users, new.user_id).await?;
    guard::ensure_unique(pool, kind.owner_key(), new.user_id, None).await?;
    guard::ensure_unique(pool, kind.ident_key(), new.ident.as_str(), None).await?;

    let sql = format!(
        "INSERT INTO {} (user_id, {}) VALUES (?1, ?2) RETURNING id",
        kind.table().name(),
        kind.ident_field()
    );
    let id: i64 = sqlx::query_scalar(&sql)
        .bind(new.user_id)
        .bind(&new.ident)
        .fetch_one(pool)
        .await?;

    log::info!("{} {} created for user {} by {}", kind.noun(), id, new.user_id, caller.id());
    Ok(HttpResponse::Created().json(fetch_profile(pool, kind, id).await?.to_json(kind)))
}

pub(crate) async fn update(
    pool: &SqlitePool,
    caller: &AuthenticatedUser,
    kind: ProfileKind,
    id: i64,
    ident: Option<String>,
) -> Result<HttpResponse, AppError> {
    let current = fetch_profile(pool, kind, id).await?;

    let Some(ident) = ident else {
        return Ok(HttpResponse::Ok().json(current.to_json(kind)));
    };
    guard::ensure_unique(pool, kind.ident_key(), ident.as_str(), Some(id)).await?;

    let sql = format!(
        "UPDATE {} SET {} = ?1 WHERE id = ?2",
        kind.table().name(),
        kind.ident_field()
    );
    sqlx::query(&sql).bind(&ident).bind(id).execute(pool).await?;

    log::info!("{} {} updated by {}", kind.noun(), id, caller.id());
    Ok(HttpResponse::Ok().json(fetch_profile(pool, kind, id).await?.to_json(kind)))
}

pub(crate) async fn delete(
    pool: &SqlitePool,
    caller: &AuthenticatedUser,
    kind: ProfileKind,
    id: i64,
) -> Result<HttpResponse, AppError> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", kind.table().name());
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(kind.table().not_found());
    }

    log::info!("{} {} deleted by {}", kind.noun(), id, caller.id());
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("{} deleted successfully", kind.noun())
    })))
}
