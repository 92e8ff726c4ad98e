pub mod auth;
pub mod dosen;
pub mod health;
pub mod kelas;
pub mod mahasiswa;
pub mod profiles;
pub mod projects;
pub mod roles;
pub mod tasks;
pub mod users;

use crate::error::AppError;
use actix_web::web;

/// Malformed JSON bodies answer with the same `{"message": ...}` shape as
/// every other error.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// Registers every `/api` resource. Mounted under a scope wrapped in
/// `AuthMiddleware`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .service(
            web::scope("/auth")
                .service(auth::login)
                .service(auth::register),
        )
        .service(
            web::scope("/users")
                .service(users::list_users)
                .service(users::get_user)
                .service(users::update_user)
                .service(users::delete_user),
        )
        .service(
            web::scope("/roles")
                .service(roles::list_roles)
                .service(roles::create_role)
                .service(roles::get_role)
                .service(roles::update_role)
                .service(roles::delete_role),
        )
        .service(
            web::scope("/mahasiswa")
                .service(mahasiswa::list_mahasiswa)
                .service(mahasiswa::create_mahasiswa)
                .service(mahasiswa::get_mahasiswa)
                .service(mahasiswa::update_mahasiswa)
                .service(mahasiswa::delete_mahasiswa),
        )
        .service(
            web::scope("/dosen")
                .service(dosen::list_dosen)
                .service(dosen::create_dosen)
                .service(dosen::get_dosen)
                .service(dosen::update_dosen)
                .service(dosen::delete_dosen),
        )
        .service(
            web::scope("/kelas")
                .service(kelas::list_kelas)
                .service(kelas::create_kelas)
                .service(kelas::get_kelas)
                .service(kelas::update_kelas)
                .service(kelas::delete_kelas)
                .service(kelas::get_kelas_tasks)
                .service(kelas::get_kelas_task_statistics),
        )
        .service(
            web::scope("/projects")
                .service(projects::list_projects)
                .service(projects::create_project)
                .service(projects::get_project)
                .service(projects::update_project)
                .service(projects::delete_project)
                .service(projects::get_project_tasks),
        )
        .service(
            web::scope("/tasks")
                .service(tasks::list_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::update_task_status)
                .service(tasks::delete_task),
        );
}
