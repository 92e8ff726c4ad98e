mod common;

use actix_web::{http::StatusCode, rt, web, App, HttpServer};
use classforge::auth::{AuthMiddleware, PasswordHasher, RoleKind};
use classforge::routes;
use common::{init_app, register_as, send, test_pool, tokens, PASSWORD};
use serde_json::json;
use std::net::TcpListener;
use std::time::Duration;

#[actix_rt::test]
async fn test_register_and_login_flow() {
    let pool = test_pool().await;
    let app = init_app(pool.clone()).await;

    let registered = register_as(&app, &pool, RoleKind::Mahasiswa, "student@example.com").await;
    assert!(!registered.token.is_empty());
    assert_eq!(registered.role, "Mahasiswa");

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "student@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "Login failed: {}", body);
    assert_eq!(body["user_id"], registered.user_id);
    assert_eq!(body["role"], "Mahasiswa");

    let token = body["token"].as_str().unwrap().to_string();
    let claims = tokens().verify_token(&token).unwrap();
    assert_eq!(claims.sub, registered.user_id);
    assert_eq!(claims.role, "Mahasiswa");

    // The token opens protected routes.
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/users/{}", registered.user_id),
        Some(token.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "student@example.com");
    assert!(body.get("password_hash").is_none());
}

#[actix_rt::test]
async fn test_duplicate_email_conflicts() {
    let pool = test_pool().await;
    let app = init_app(pool.clone()).await;
    register_as(&app, &pool, RoleKind::Dosen, "lecturer@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Someone Else",
            "email": "lecturer@example.com",
            "password": "another-secret",
            "role_id": common::role_id(&pool, RoleKind::Mahasiswa).await,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already registered");
}

#[actix_rt::test]
async fn test_invalid_registration_inputs() {
    let pool = test_pool().await;
    let app = init_app(pool.clone()).await;
    let mahasiswa = common::role_id(&pool, RoleKind::Mahasiswa).await;

    let cases = vec![
        json!({ "name": "A", "email": "not-an-email", "password": "secret1", "role_id": mahasiswa }),
        json!({ "name": "A", "email": "a@example.com", "password": "123", "role_id": mahasiswa }),
        json!({ "name": "", "email": "a@example.com", "password": "secret1", "role_id": mahasiswa }),
        json!({ "email": "a@example.com", "password": "secret1", "role_id": mahasiswa }),
    ];
    for payload in cases {
        let (status, body) = send(&app, "POST", "/api/auth/register", None, Some(payload.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {} gave {}", payload, body);
        assert!(body["message"].is_string());
    }

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "A", "email": "a@example.com", "password": "secret1", "role_id": 999 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Role does not exist");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[actix_rt::test]
async fn test_invalid_login_inputs() {
    let pool = test_pool().await;
    let app = init_app(pool.clone()).await;
    register_as(&app, &pool, RoleKind::Mahasiswa, "login@example.com").await;

    let (status, wrong_password) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "login@example.com", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown_email) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_email);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "login@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_protected_routes_require_token() {
    let pool = test_pool().await;
    let app = init_app(pool.clone()).await;

    let (status, body) = send(&app, "GET", "/api/kelas", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing token");

    let (status, _) = send(&app, "GET", "/api/kelas", Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");
}

#[actix_rt::test]
async fn test_role_gating() {
    let pool = test_pool().await;
    let app = init_app(pool.clone()).await;
    let admin = register_as(&app, &pool, RoleKind::Admin, "admin@example.com").await;
    let student = register_as(&app, &pool, RoleKind::Mahasiswa, "student@example.com").await;

    let payload = json!({ "name": "TI-1A" });
    let (status, body) = send(&app, "POST", "/api/kelas", Some(student.token.as_str()), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Unauthorized access");

    let (status, body) = send(&app, "POST", "/api/kelas", Some(admin.token.as_str()), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "TI-1A");

    // Forbidden is reported before the body is looked at.
    let (status, _) = send(&app, "POST", "/api/kelas", Some(student.token.as_str()), Some(json!({ "name": "" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Only Admin may change accounts.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/users/{}", admin.user_id),
        Some(student.token.as_str()),
        Some(json!({ "name": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn test_unknown_role_in_token_is_forbidden() {
    let pool = test_pool().await;
    let app = init_app(pool.clone()).await;

    let token = tokens()
        .generate_token(7, "ghost@example.com", "Tamu")
        .unwrap();
    let (status, _) = send(&app, "GET", "/api/roles", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "POST", "/api/roles", Some(token.as_str()), Some(json!({ "name": "Tamu" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn test_live_server_rejects_unauthenticated_requests() {
    let pool = test_pool().await;

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server_pool = pool.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(server_pool.clone()))
            .app_data(web::Data::new(tokens()))
            .app_data(web::Data::new(PasswordHasher::new(4)))
            .service(routes::health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            )
    })
    .workers(1)
    .listen(listener)
    .expect("Failed to listen")
    .run();
    let handle = server.handle();
    rt::spawn(server);
    rt::time::sleep(Duration::from_millis(100)).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://127.0.0.1:{}/api/tasks", port))
        .json(&json!({ "title": "Sneaky task" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Missing token");

    let resp = client
        .get(format!("http://127.0.0.1:{}/health", port))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    handle.stop(false).await;
}
