#![allow(dead_code)]

use actix_cors::Cors;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::{header, StatusCode},
    middleware::Logger,
    test, web, App,
};
use classforge::auth::{AuthMiddleware, AuthResponse, PasswordHasher, RoleKind, TokenService};
use classforge::{db, routes};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};

pub const TEST_SECRET: &str = "integration_test_secret";
pub const PASSWORD: &str = "Password123!";

/// Fresh in-memory database with the schema applied and roles seeded.
pub async fn test_pool() -> SqlitePool {
    db::setup("sqlite::memory:", 1)
        .await
        .expect("Failed to set up in-memory database")
}

/// A database file under the temp dir, for tests that need several pooled
/// connections. Returns the pool and the path to remove afterwards.
pub async fn file_pool(name: &str, max_connections: u32) -> (SqlitePool, PathBuf) {
    let path = std::env::temp_dir().join(format!("classforge-{}-{}.db", name, std::process::id()));
    remove_db_files(&path);
    let url = format!("sqlite://{}", path.display());
    let pool = db::setup(&url, max_connections)
        .await
        .expect("Failed to set up file database");
    (pool, path)
}

pub fn remove_db_files(path: &Path) {
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
    }
}

pub fn tokens() -> TokenService {
    TokenService::new(TEST_SECRET, 1)
}

/// The production app layout over `pool`, with a cheap bcrypt cost.
pub async fn init_app(
    pool: SqlitePool,
) -> impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
{
    test::init_service(
        App::new()
            .app_data(web::Data::new(pool))
            .app_data(web::Data::new(tokens()))
            .app_data(web::Data::new(PasswordHasher::new(4)))
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .service(routes::health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            ),
    )
    .await
}

pub async fn role_id(pool: &SqlitePool, role: RoleKind) -> i64 {
    sqlx::query_scalar("SELECT id FROM roles WHERE name = ?1")
        .bind(role.as_str())
        .fetch_one(pool)
        .await
        .expect("Seeded role missing")
}

/// Registers a user with `role` and returns the token response.
pub async fn register_as(
    app: &impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    pool: &SqlitePool,
    role: RoleKind,
    email: &str,
) -> AuthResponse {
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "name": format!("{} user", role),
            "email": email,
            "password": PASSWORD,
            "role_id": role_id(pool, role).await,
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    assert_eq!(
        status,
        StatusCode::CREATED,
        "Registration failed. Body: {:?}",
        String::from_utf8_lossy(&body)
    );
    serde_json::from_slice(&body).expect("Failed to parse registration response")
}

/// Sends `method uri` with an optional bearer token and JSON body, returning
/// the status and the parsed JSON body.
pub async fn send(
    app: &impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = match method {
        "GET" => test::TestRequest::get(),
        "POST" => test::TestRequest::post(),
        "PUT" => test::TestRequest::put(),
        "PATCH" => test::TestRequest::patch(),
        "DELETE" => test::TestRequest::delete(),
        other => panic!("Unsupported method {}", other),
    }
    .uri(uri);
    if let Some(token) = token {
        req = req.insert_header((header::AUTHORIZATION, format!("Bearer {}", token)));
    }
    if let Some(body) = body {
        req = req.set_json(body);
    }

    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            panic!("Non-JSON body for {} {}: {:?}", method, uri, String::from_utf8_lossy(&bytes))
        })
    };
    (status, json)
}
