// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin bot process.
//!
//! Shares the store with the API server but runs independently of it, so
//! operator traffic and intake traffic never contend for one process.

use ride_intake::bot::AdminBot;
use ride_intake::config::Config;
use ride_intake::db::RideStore;
use ride_intake::services::TelegramClient;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::from_env()?;
    let token = config.require_bot_token()?.to_string();

    let store = RideStore::connect(&config.mongo_uri, &config.mongo_db, &config.mongo_collection)
        .await
        .map_err(|e| anyhow::anyhow!("MongoDB connection failed: {}", e))?;

    let bot = Arc::new(AdminBot::new(
        TelegramClient::new(&token),
        store,
        config.allowed_ids.clone(),
    ));

    bot.run().await;
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
