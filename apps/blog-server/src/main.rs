//! # Quill Blog Server
//!
//! Public blog pages, the admin area and the JSON API on Actix-web.

use actix_files::Files;
use actix_web::middleware::Compress;
use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;
mod uploads;
mod views;

#[cfg(test)]
mod tests;

use config::AppConfig;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Quill blog server on {}:{}",
        config.host,
        config.port
    );

    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let state = AppState::new(&config).await?;
    let upload_dir = config.upload_dir.clone();
    let static_dir = config.public_dir.join("static");

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::security::security_headers())
            .wrap(Compress::default())
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .service(Files::new(uploads::PUBLIC_PREFIX, &upload_dir))
            .service(Files::new("/static", &static_dir))
            .configure(handlers::configure_routes)
            .default_service(web::to(handlers::not_found))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}
