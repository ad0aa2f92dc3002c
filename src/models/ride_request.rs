// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Canonical ride-request record as persisted in MongoDB.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Stored ride-request record.
///
/// Produced only by the intake path; the store never constructs or
/// mutates one. `id` is filled in by MongoDB on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideRequest {
    /// MongoDB document id, absent until inserted
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Participant name
    pub name: String,
    /// Canonicalized contact phone (10-15 digits after normalization)
    pub phone: String,
    /// Telegram handle without the leading `@`, absent when not supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tg: Option<String>,
    /// Scheduling day, one of "30" / "31"
    pub day: String,
    /// Earliest departure time, zero-padded `HH:MM`
    pub earliest_time: String,
    /// Participant count; older records may lack the field
    #[serde(default = "default_people")]
    pub people: i64,
    /// Pickup location with derived geo point
    pub start_point: StartPoint,
    /// RFC3339 UTC timestamp stamped by the API at insert time
    pub created_at: String,
}

pub(crate) fn default_people() -> i64 {
    1
}

/// Pickup location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartPoint {
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    /// Derived GeoJSON point for the 2dsphere index, never caller-supplied
    pub geo: GeoPoint,
}

/// GeoJSON-style point. Coordinate order is `[lon, lat]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    /// Build a point from latitude/longitude in the usual argument order.
    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [lon, lat],
        }
    }
}

impl RideRequest {
    /// Telegram handle for human display, `@`-prefixed, `-` when absent.
    pub fn display_tg(&self) -> String {
        match self.tg.as_deref() {
            Some(tg) if !tg.is_empty() => format!("@{}", tg),
            _ => "-".to_string(),
        }
    }

    /// Document id as a hex string, empty when not yet inserted.
    pub fn display_id(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}
