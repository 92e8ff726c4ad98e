use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use classforge::{
    auth::{AuthMiddleware, PasswordHasher, TokenService},
    config::Config,
    db, routes,
};
use std::io;

fn to_io_error(err: classforge::AppError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(to_io_error)?;
    let pool = db::setup(&config.database_url, config.database_max_connections)
        .await
        .map_err(to_io_error)?;

    let tokens = web::Data::new(TokenService::new(
        &config.jwt_secret,
        config.jwt_expiration_hours,
    ));
    let hasher = web::Data::new(PasswordHasher::new(config.bcrypt_cost));
    let pool = web::Data::new(pool);

    log::info!("Starting ClassForge server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(tokens.clone())
            .app_data(hasher.clone())
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .service(routes::health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
