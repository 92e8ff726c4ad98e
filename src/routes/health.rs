use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;

/// Health check endpoint
///
/// Reports whether the database answers a trivial query. Always 200; a failed
/// ping shows up as `"status": "degraded"`.
#[get("/health")]
pub async fn health(pool: web::Data<SqlitePool>) -> impl Responder {
    let database = match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&**pool).await {
        Ok(_) => "ok",
        Err(e) => {
            log::error!("Health check query failed: {}", e);
            "unavailable"
        }
    };

    HttpResponse::Ok().json(json!({
        "status": if database == "ok" { "ok" } else { "degraded" },
        "database": database,
        "timestamp": Utc::now()
    }))
}
