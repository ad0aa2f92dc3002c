// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use ride_intake::config::Config;
use ride_intake::db::RideStore;
use ride_intake::routes::create_router;
use ride_intake::services::Notifier;
use ride_intake::AppState;
use std::sync::Arc;

/// Check if a test MongoDB is available via environment variable.
#[allow(dead_code)]
pub fn mongo_available() -> bool {
    std::env::var("TEST_MONGO_URI").is_ok()
}

/// Skip test with message if no test MongoDB is available.
#[macro_export]
macro_rules! require_mongo {
    () => {
        if !crate::common::mongo_available() {
            eprintln!("⚠️  Skipping: TEST_MONGO_URI not set");
            return;
        }
    };
}

/// Connect a store to an isolated collection of the test database.
#[allow(dead_code)]
pub async fn test_store(collection: &str) -> RideStore {
    let uri = std::env::var("TEST_MONGO_URI").expect("TEST_MONGO_URI not set");
    RideStore::connect(&uri, "ride_test", collection)
        .await
        .expect("Failed to connect to test MongoDB")
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default())
}

/// Same, with a caller-adjusted config.
#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config,
        store: RideStore::new_mock(),
        notifier: Notifier::disabled(),
    });

    (create_router(state.clone()), state)
}
