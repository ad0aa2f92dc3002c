// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Best-effort operator notification for new ride requests.
//!
//! Delivery is fire-and-forget: the submission path only enqueues, never
//! awaits, and never observes the outcome. A failed send is logged and
//! dropped; it must not alter the HTTP response already produced.

use crate::config::Config;
use crate::models::RideRequest;
use crate::services::telegram::TelegramClient;
use mongodb::bson::oid::ObjectId;

/// Notification dispatcher. Does nothing unless both the bot token and the
/// destination chat are configured.
#[derive(Clone)]
pub struct Notifier {
    channel: Option<Channel>,
}

#[derive(Clone)]
struct Channel {
    client: TelegramClient,
    chat_id: String,
    thread_id: Option<i64>,
}

impl Notifier {
    /// Build from configuration; missing credentials disable dispatch.
    pub fn from_config(config: &Config) -> Self {
        let channel = match (config.bot_token.as_deref(), config.notify_chat_id.clone()) {
            (Some(token), Some(chat_id)) => Some(Channel {
                client: TelegramClient::new(token),
                chat_id,
                thread_id: config.notify_thread_id,
            }),
            _ => {
                tracing::info!("Telegram notifications disabled (no credentials)");
                None
            }
        };
        Self { channel }
    }

    /// A disabled dispatcher, for tests.
    pub fn disabled() -> Self {
        Self { channel: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.channel.is_some()
    }

    /// Enqueue a notification for a freshly inserted record.
    ///
    /// Returns as soon as the delivery task is spawned; the task owns its
    /// own copy of the message and swallows any failure.
    pub fn schedule(&self, record: &RideRequest, id: &ObjectId) {
        let Some(channel) = self.channel.clone() else {
            return;
        };

        let text = format_request(record, &id.to_hex());
        let id = id.to_hex();

        tokio::spawn(async move {
            if let Err(e) = channel
                .client
                .send_message(&channel.chat_id, channel.thread_id, &text, None)
                .await
            {
                tracing::warn!(id = %id, error = %e, "Notification delivery failed");
            }
        });
    }
}

/// Human-readable summary of a request. Shared between notifications and
/// the admin bot's `last` listing.
pub fn format_request(record: &RideRequest, id: &str) -> String {
    [
        format!("id: {}", id),
        format!("phone: {}", record.phone),
        format!("tg: {}", record.display_tg()),
        format!("day/time: {} {}", record.day, record.earliest_time),
        format!("address: {}", record.start_point.address),
        format!(
            "map: https://maps.google.com/?q={},{}",
            record.start_point.lat, record.start_point.lon
        ),
    ]
    .join("\n")
}
