mod api;
mod config;
mod core;
mod db;
mod error;
mod logger;
mod models;
mod repositories;
mod services;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing::{error, info};

use crate::services::completion::CompletionClient;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cfg = match config::Config::init_global() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("Failed to load config: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = logger::init(cfg) {
        eprintln!("Failed to init logger: {err:#}");
        std::process::exit(1);
    }

    let pool = match db::init(&cfg.database_path).await {
        Ok(pool) => pool,
        Err(err) => {
            error!("Failed to init database: {err:#}");
            std::process::exit(1);
        }
    };

    cfg.print();

    let summarizer = Arc::new(CompletionClient::new(cfg.completion()));
    let state = api::AppState::new(pool, summarizer);
    let app = api::router(state);

    let addr = SocketAddr::new(
        cfg.host
            .parse()
            .unwrap_or_else(|_| "0.0.0.0".parse().unwrap()),
        cfg.port,
    );
    info!("Server running on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind: {err}");
            std::process::exit(1);
        }
    };

    let server = axum::serve(listener, app);

    if let Err(err) = server.with_graceful_shutdown(shutdown_signal()).await {
        error!("Server error: {err}");
    }
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("Shutdown signal received");
}
