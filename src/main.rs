use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use taskvault::auth::{AuthService, PasswordHasher, TokenService};
use taskvault::config::Config;
use taskvault::routes::{self, health};
use taskvault::store::{PgTaskStore, PgUserStore};
use taskvault::tasks::TaskService;

/// Loads `.env.stage.<STAGE>` when `STAGE` is set, then `.env`.
fn load_env_files() {
    if let Ok(stage) = std::env::var("STAGE") {
        dotenv::from_filename(format!(".env.stage.{}", stage)).ok();
    }
    dotenv::dotenv().ok();
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    load_env_files();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(io::Error::other)?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(io::Error::other)?;

    let hasher = PasswordHasher::new(config.bcrypt_cost).map_err(io::Error::other)?;
    let auth_service = AuthService::new(
        Arc::new(PgUserStore::new(pool.clone())),
        hasher,
        TokenService::new(&config.jwt_secret, config.jwt_expires_in),
    )
    .map_err(io::Error::other)?;
    let auth_service = web::Data::new(auth_service);
    let task_service = web::Data::new(TaskService::new(Arc::new(PgTaskStore::new(pool))));

    log::info!("Starting taskvault server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(auth_service.clone())
            .app_data(task_service.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
