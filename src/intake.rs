// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Intake validation and normalization for ride-request submissions.
//!
//! Pure and synchronous: a raw submission either becomes a canonical set of
//! fields (minus id, created_at and the derived geo point, which the API
//! stamps at insert time) or fails with a validation error naming the field.
//!
//! Order of checks: structural (lengths, ranges, patterns) first, then phone
//! and handle normalization, then a second, looser digit-count bound on the
//! normalized phone. A structurally valid phone full of punctuation can
//! still normalize to too few digits, so the second pass is not redundant.

use crate::error::AppError;
use crate::models::ride_request::default_people;
use crate::models::{GeoPoint, RideRequest, StartPoint};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use validator::Validate;

/// Minimum digit count for a normalized phone.
const PHONE_MIN_DIGITS: usize = 10;
/// Maximum digit count for a normalized phone.
const PHONE_MAX_DIGITS: usize = 15;

/// Raw submission payload as posted by the sign-up form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RideRequestIn {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 5, max = 32))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub tg: Option<String>,
    pub day: String,
    pub earliest_time: String,
    #[serde(default = "default_people")]
    #[validate(range(min = 1, max = 10))]
    pub people: i64,
    #[validate(nested)]
    pub start_point: StartPointIn,
}

/// Raw pickup location. `geo` is never accepted from the caller.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartPointIn {
    #[validate(length(min = 2, max = 200))]
    pub address: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
}

/// Canonical submission produced by [`canonicalize`].
#[derive(Debug, Clone)]
pub struct CanonicalRequest {
    pub name: String,
    pub phone: String,
    pub tg: Option<String>,
    pub day: String,
    pub earliest_time: String,
    pub people: i64,
    pub address: String,
    pub lat: f64,
    pub lon: f64,
}

impl CanonicalRequest {
    /// Build the persisted record: stamp `created_at`, derive the geo point.
    pub fn into_record(self, created_at: DateTime<Utc>) -> RideRequest {
        let geo = GeoPoint::from_lat_lon(self.lat, self.lon);
        RideRequest {
            id: None,
            name: self.name,
            phone: self.phone,
            tg: self.tg,
            day: self.day,
            earliest_time: self.earliest_time,
            people: self.people,
            start_point: StartPoint {
                address: self.address,
                lat: self.lat,
                lon: self.lon,
                geo,
            },
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Validate and normalize a raw submission.
pub fn canonicalize(input: RideRequestIn) -> Result<CanonicalRequest, AppError> {
    input
        .validate()
        .map_err(|e| AppError::Validation(describe_validation_errors(&e)))?;

    if !is_valid_day(&input.day) {
        return Err(AppError::Validation("Invalid day".to_string()));
    }
    if !is_valid_time(&input.earliest_time) {
        return Err(AppError::Validation("Invalid earliest_time".to_string()));
    }

    let phone = normalize_phone(&input.phone);
    let digit_count = phone.chars().filter(char::is_ascii_digit).count();
    if !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digit_count) {
        return Err(AppError::Validation("Invalid phone".to_string()));
    }

    Ok(CanonicalRequest {
        name: input.name,
        phone,
        tg: normalize_tg(input.tg.as_deref()),
        day: input.day,
        earliest_time: input.earliest_time,
        people: input.people,
        address: input.start_point.address,
        lat: input.start_point.lat,
        lon: input.start_point.lon,
    })
}

/// Canonicalize a contact phone.
///
/// An 11-digit number with the domestic `8` trunk prefix is rewritten to the
/// international `+7` form; a `+`-prefixed value keeps the plus and drops
/// everything that is not a digit; anything else keeps only digits.
/// Idempotent: re-normalizing a normalized phone is a no-op.
pub fn normalize_phone(raw: &str) -> String {
    let raw = raw.trim();
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 11 && digits.starts_with('8') {
        return format!("+7{}", &digits[1..]);
    }
    if raw.starts_with('+') {
        return format!("+{}", digits);
    }
    digits
}

/// Strip whitespace and a leading `@` from a Telegram handle.
/// An empty result is treated as "not supplied". Idempotent.
pub fn normalize_tg(raw: Option<&str>) -> Option<String> {
    let v = raw.unwrap_or_default().trim().replace(' ', "");
    let v = v.strip_prefix('@').unwrap_or(&v);
    if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}

/// The event spans exactly two scheduling days.
fn is_valid_day(day: &str) -> bool {
    matches!(day, "30" | "31")
}

/// Zero-padded 24-hour `HH:MM`. Not range-validated.
fn is_valid_time(time: &str) -> bool {
    let b = time.as_bytes();
    b.len() == 5
        && b[0].is_ascii_digit()
        && b[1].is_ascii_digit()
        && b[2] == b':'
        && b[3].is_ascii_digit()
        && b[4].is_ascii_digit()
}

/// Field-name-level summary for the 422 body; no values are echoed back.
fn describe_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<String> = errors.errors().keys().map(|k| k.to_string()).collect();
    fields.sort_unstable();
    format!("Invalid {}", fields.join(", "))
}
