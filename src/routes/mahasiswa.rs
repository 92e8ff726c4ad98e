use crate::{
    auth::{AuthenticatedUser, RoleKind},
    error::AppError,
    models::{MahasiswaInput, MahasiswaPatch, ProfileKind},
    routes::profiles,
};
use actix_web::{delete, get, post, put, web, Responder};
use sqlx::SqlitePool;
use validator::Validate;

const KIND: ProfileKind = ProfileKind::Mahasiswa;

#[get("")]
pub async fn list_mahasiswa(
    pool: web::Data<SqlitePool>,
    _caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    profiles::list(&pool, KIND).await
}

#[get("/{id}")]
pub async fn get_mahasiswa(
    pool: web::Data<SqlitePool>,
    _caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    profiles::get(&pool, KIND, id.into_inner()).await
}

#[post("")]
pub async fn create_mahasiswa(
    pool: web::Data<SqlitePool>,
    caller: AuthenticatedUser,
    input: web::Json<MahasiswaInput>,
) -> Result<impl Responder, AppError> {
    caller.require_role(RoleKind::Admin)?;
    input.validate()?;
    profiles::create(&pool, &caller, KIND, input.into_inner().into()).await
}

#[put("/{id}")]
pub async fn update_mahasiswa(
    pool: web::Data<SqlitePool>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
    patch: web::Json<MahasiswaPatch>,
) -> Result<impl Responder, AppError> {
    caller.require_role(RoleKind::Admin)?;
    patch.validate()?;
    profiles::update(&pool, &caller, KIND, id.into_inner(), patch.into_inner().nim).await
}

#[delete("/{id}")]
pub async fn delete_mahasiswa(
    pool: web::Data<SqlitePool>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    caller.require_role(RoleKind::Admin)?;
    profiles::delete(&pool, &caller, KIND, id.into_inner()).await
}
