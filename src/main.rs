use actix_cors::Cors;
use actix_files::Files;
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::str::FromStr;
use tracing::{Level, error, info};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use erms::config::Config;
use erms::db::{init_db, run_migrations};
use erms::docs::ApiDoc;
use erms::routes::{self, RateLimits};
use erms::utils::usernames::UsernameRegistry;

#[get("/")]
async fn index() -> impl Responder {
    "ERMS API is running"
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let level = Level::from_str(&config.log_level)
        .with_context(|| format!("LOG_LEVEL has an invalid value: {:?}", config.log_level))?;

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(level)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url, config.db_max_connections)
        .await
        .context("failed to connect to the database")?;

    if config.run_migrations {
        run_migrations(&pool)
            .await
            .context("failed to apply migrations")?;
    }

    std::fs::create_dir_all(&config.upload_dir)
        .with_context(|| format!("cannot create upload directory {}", config.upload_dir))?;

    let limits = RateLimits::from_config(&config)?;
    let usernames = Data::new(UsernameRegistry::default());

    let registry = usernames.clone();
    let warmup_pool = pool.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = registry.warmup_filter(&warmup_pool, 100).await {
            error!(error = ?e, "Failed to warm up username filter");
        }
        // Last 30 days of logins, in batches of 250
        if let Err(e) = registry.warmup_cache(&warmup_pool, 30, 250).await {
            error!(error = ?e, "Failed to warm up username cache");
        }
    });

    let server_addr = config.server_addr.clone();
    let pool = Data::new(pool);
    let config = Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .wrap(Cors::permissive())
            .service(
                // wildcard {_:.*} so the UI's JS/CSS assets match
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(pool.clone())
            .app_data(config.clone())
            .app_data(usernames.clone())
            .service(index)
            .service(Files::new(&config.uploads_url_prefix, &config.upload_dir))
            .configure(|cfg| routes::configure(cfg, &config, &limits))
    })
    .bind(&server_addr)
    .with_context(|| format!("cannot bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
