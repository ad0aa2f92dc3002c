// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod ride_request;

pub use ride_request::{GeoPoint, RideRequest, StartPoint};
