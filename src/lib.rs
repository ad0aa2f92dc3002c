// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ride-Intake: sign-up backend for a scheduled group ride
//!
//! This crate provides the intake API for ride requests (validation,
//! normalization, persistence, operator notification) and the Telegram
//! admin bot that monitors and moderates the same records.

pub mod bot;
pub mod config;
pub mod db;
pub mod error;
pub mod intake;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::RideStore;
use services::Notifier;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: RideStore,
    pub notifier: Notifier,
}
