// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use ocr_gateway::{
    api::{self, AppState},
    config::ServiceConfig,
    vision::{initialize_engine, EngineHandle},
};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // .env before clap so OCR_* values from the file are visible
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServiceConfig::parse();
    config.validate().context("Invalid configuration")?;

    println!("🚀 Starting {}...\n", ocr_gateway::version::SERVICE_NAME);
    println!("📦 BUILD VERSION: {}", ocr_gateway::version::VERSION);
    println!("🧩 Features: {}", ocr_gateway::version::FEATURES.join(", "));
    println!("📅 Build Date: {}", ocr_gateway::version::BUILD_DATE);
    println!();

    let addr = config.listen_addr()?;
    let engine = EngineHandle::new();
    let state = AppState::from_config(&config, engine.clone())
        .context("Failed to create image fetcher")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    // Models load after the listener is up so /health can report progress
    let engine_config = config.engine_config();
    tokio::spawn(async move {
        if let Err(e) = initialize_engine(&engine_config, &engine).await {
            error!("Failed to initialize OCR engine: {:#}", e);
            std::process::exit(1);
        }
    });

    info!("{}", ocr_gateway::version::get_version_string());
    info!(
        "Serving OCR for language '{}' on http://{}",
        config.language(),
        addr
    );

    api::serve(listener, state, shutdown_signal()).await?;

    println!("\n⏹️  Shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
