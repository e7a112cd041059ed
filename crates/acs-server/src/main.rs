// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! Wires configuration, persistence, the engine, and the HTTP surface into
//! a running Access Control Service.

use std::sync::Arc;

use acs_core::config::AcsConfig;
use acs_engine::AcsEngine;
use acs_repository::{InMemoryRepository, PostgresRepository, Repository};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    let config = AcsConfig::load(std::env::var("ACS_CONFIG_PATH").ok().as_deref()).unwrap_or_else(|error| {
        eprintln!("failed to load configuration, falling back to defaults: {error}");
        AcsConfig::default()
    });

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.to_string())))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let repository: Arc<dyn Repository> = match &config.database_url {
        Some(database_url) => {
            let repo = PostgresRepository::connect(database_url).await.expect("failed to connect to database");
            repo.migrate().await.expect("failed to run migrations");
            Arc::new(repo)
        }
        None => {
            tracing::warn!("no database_url configured, using the volatile in-memory repository");
            Arc::new(InMemoryRepository::new())
        }
    };

    let listen_addr = config.listen_addr.clone();
    let engine = Arc::new(AcsEngine::new(config, repository).await.expect("failed to initialize engine"));

    let app = acs_api::router(acs_api::AppState::new(engine));

    tracing::info!(addr = %listen_addr, "access control service listening");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await.expect("failed to bind listen address");
    axum::serve(listener, app).await.expect("server error");
}
