// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ride-Intake API Server
//!
//! Accepts public ride-request submissions, persists them to MongoDB and
//! notifies operators over Telegram. The admin bot runs as a separate
//! process (`admin_bot`).

use ride_intake::{config::Config, db::RideStore, services::Notifier, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Ride-Intake API");

    // Connect to MongoDB and ensure the secondary indexes
    let store = RideStore::connect(&config.mongo_uri, &config.mongo_db, &config.mongo_collection)
        .await
        .expect("Failed to connect to MongoDB");
    store
        .ensure_indexes()
        .await
        .expect("Failed to create indexes");

    // Operator notifications (no-op without credentials)
    let notifier = Notifier::from_config(&config);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        notifier,
    });

    // Build router
    let app = ride_intake::routes::create_router(state);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ride_intake=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
