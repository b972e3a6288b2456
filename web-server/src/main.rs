// Web Server - main.rs
// qawakun/web-server/src/main.rs
mod admin;
mod api;
mod backend;
mod error;
mod middleware;
mod proxy;
mod token_manager;

use actix_web::{web, App, HttpServer, Responder, HttpResponse, get};
use common::{setup_tracing, Config};
use std::sync::Arc;

use crate::backend::HttpBackend;
use crate::middleware::OriginFilter;
use crate::proxy::AppState;

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().body("Qawakun Web Proxy")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Setup tracing
    setup_tracing();

    // Load configuration
    let config = Config::from_env();

    // Save address before moving config into web::Data
    let server_addr = config.web_server_addr.clone();

    let backend = HttpBackend::new(&config.backend_url)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    if config.credentials.pair().is_none() {
        tracing::warn!("API_USER / API_PASSWORD not set; backend calls will fail");
    }
    if config.admin.admin_wallets().is_empty() {
        tracing::warn!("No admin wallet configured; context updates are disabled");
    }

    tracing::info!("Proxying to backend at {}", config.backend_url);
    tracing::info!("Starting Web Server on {}", server_addr);

    let origin_filter = OriginFilter::new(&config.origin_filter);
    let state = web::Data::new(AppState::new(config, Arc::new(backend)));

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .wrap(origin_filter.clone())
            .app_data(state.clone())
            .service(index)
            .configure(api::configure)
    })
    .bind(&server_addr)?
    .run()
    .await
}
