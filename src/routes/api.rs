// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Intake API: submission, health, count summary, token-guarded delete.

use crate::db::store::parse_object_id;
use crate::error::{AppError, Result};
use crate::intake::{self, RideRequestIn};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Header carrying the shared delete secret.
const DELETE_TOKEN_HEADER: &str = "x-delete-token";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/ride-request", post(create_request))
        .route("/api/ride-request/{id}", delete(delete_request))
        .route("/api/health", get(health))
        .route("/api/count", get(count_summary))
}

// ─── Submission ──────────────────────────────────────────────

#[derive(Serialize)]
pub struct SubmitResponse {
    pub ok: bool,
    pub id: String,
}

/// Accept a sign-up submission.
///
/// Validation failures answer 422 with a field-name-level message only.
/// The notification is scheduled strictly after the insert succeeds and the
/// response never waits on its delivery.
async fn create_request(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RideRequestIn>,
) -> Result<Json<SubmitResponse>> {
    let canonical = intake::canonicalize(payload)?;
    let record = canonical.into_record(chrono::Utc::now());

    let id = state.store.insert(&record).await?;
    tracing::info!(id = %id, day = %record.day, "Ride request stored");

    state.notifier.schedule(&record, &id);

    Ok(Json(SubmitResponse {
        ok: true,
        id: id.to_hex(),
    }))
}

// ─── Health ──────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

// ─── Count Summary ───────────────────────────────────────────

#[derive(Serialize)]
pub struct CountResponse {
    pub ok: bool,
    pub count: u64,
    pub people: i64,
}

/// Monitoring summary: request count and participant total.
///
/// The two reads are independent and not snapshot-consistent under
/// concurrent inserts.
async fn count_summary(State(state): State<Arc<AppState>>) -> Result<Json<CountResponse>> {
    let count = state.store.count().await?;
    let people = state.store.sum_people().await?;

    Ok(Json(CountResponse {
        ok: true,
        count,
        people,
    }))
}

// ─── Delete ──────────────────────────────────────────────────

#[derive(Serialize)]
pub struct DeleteResponse {
    pub ok: bool,
    pub id: String,
}

/// Delete a record, guarded by the shared-secret header.
///
/// The token check runs first and answers 403 for a missing secret, a
/// missing header, or a mismatch alike, with nothing revealing which. Only
/// then is the identifier looked at.
async fn delete_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DeleteResponse>> {
    let expected = state.config.delete_token.as_deref().ok_or(AppError::Forbidden)?;
    let supplied = headers
        .get(DELETE_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Forbidden)?;

    if !bool::from(supplied.as_bytes().ct_eq(expected.as_bytes())) {
        return Err(AppError::Forbidden);
    }

    let object_id = parse_object_id(&id).ok_or(AppError::InvalidId)?;

    if state.store.delete_by_id(&object_id).await? {
        tracing::info!(id = %id, "Ride request deleted");
        Ok(Json(DeleteResponse { ok: true, id }))
    } else {
        Err(AppError::NotFound)
    }
}
