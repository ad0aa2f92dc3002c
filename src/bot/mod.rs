// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Telegram admin bot: operator commands over the ride-request store.
//!
//! Runs as its own process beside the API server, long-polling for
//! operator messages. Every handler is idempotent and re-entrant; updates
//! are handled on their own tasks and nothing here assumes serialized
//! access to the store.

use crate::db::store::parse_object_id;
use crate::db::RideStore;
use crate::models::RideRequest;
use crate::services::notify::format_request;
use crate::services::telegram::{Message, ReplyKeyboardMarkup, TelegramClient};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Server-side long-poll window for `getUpdates`.
const POLL_TIMEOUT_SECS: u64 = 30;
/// Back-off after a failed poll.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);
/// How many records `last` shows.
const RECENT_LIMIT: i64 = 5;

/// Keyboard labels, doubling as free-text shortcuts (matched
/// case-insensitively).
const LABEL_COUNT: &str = "How many signed up?";
const LABEL_LAST: &str = "Last 5";

const REPLY_REFUSED: &str = "Access denied.";
const REPLY_MENU: &str = "Ready. Available actions:";
const REPLY_EMPTY: &str = "Nothing yet.";
const REPLY_DELETE_USAGE: &str = "Usage: /delete <id>";
const REPLY_INVALID_ID: &str = "Invalid id.";
const REPLY_DELETED: &str = "Deleted.";
const REPLY_NOT_FOUND: &str = "Not found.";
const REPLY_SERVER_ERROR: &str = "Server error.";
const REPLY_NOT_UNDERSTOOD: &str = "Command not understood. Try /count, /last, /delete <id>.";

/// Recognized operator commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Count,
    Last,
    Delete(Option<String>),
    Unknown,
}

/// Parse a message text into a command.
///
/// Slash commands may carry an `@botname` suffix. Free text is matched
/// case-insensitively against the two keyboard labels.
pub fn parse_command(text: &str) -> Command {
    let text = text.trim();

    if let Some(rest) = text.strip_prefix('/') {
        let mut parts = rest.split_whitespace();
        let name = parts
            .next()
            .unwrap_or_default()
            .split('@')
            .next()
            .unwrap_or_default();
        return match name {
            "start" => Command::Start,
            "count" => Command::Count,
            "last" => Command::Last,
            "delete" => Command::Delete(parts.next().map(str::to_string)),
            _ => Command::Unknown,
        };
    }

    let lower = text.to_lowercase();
    if lower == LABEL_COUNT.to_lowercase() {
        Command::Count
    } else if lower == LABEL_LAST.to_lowercase() {
        Command::Last
    } else {
        Command::Unknown
    }
}

/// Sender check against the allow-list. An empty list permits everyone.
fn is_allowed(allowed_ids: &HashSet<String>, user_id: Option<i64>) -> bool {
    if allowed_ids.is_empty() {
        return true;
    }
    user_id.is_some_and(|id| allowed_ids.contains(&id.to_string()))
}

/// Render a record the way notifications do, plus the created-at line.
/// A malformed stored timestamp is shown as-is rather than failing the
/// whole listing.
fn format_record_with_created(record: &RideRequest) -> String {
    let created = match chrono::DateTime::parse_from_rfc3339(&record.created_at) {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => record.created_at.clone(),
    };
    format!(
        "{}\ncreated: {}",
        format_request(record, &record.display_id()),
        created
    )
}

/// The admin bot process.
pub struct AdminBot {
    client: TelegramClient,
    store: RideStore,
    allowed_ids: HashSet<String>,
    keyboard: ReplyKeyboardMarkup,
}

impl AdminBot {
    pub fn new(client: TelegramClient, store: RideStore, allowed_ids: HashSet<String>) -> Self {
        Self {
            client,
            store,
            allowed_ids,
            keyboard: ReplyKeyboardMarkup::from_rows(&[LABEL_COUNT, LABEL_LAST]),
        }
    }

    /// Poll for updates forever, fanning each message out to its own task.
    pub async fn run(self: Arc<Self>) {
        tracing::info!(
            allowed = self.allowed_ids.len(),
            "Admin bot polling for updates"
        );

        let mut offset = 0i64;
        loop {
            match self.client.get_updates(offset, POLL_TIMEOUT_SECS).await {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        if let Some(message) = update.message {
                            let bot = Arc::clone(&self);
                            tokio::spawn(async move {
                                bot.handle_message(message).await;
                            });
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "getUpdates failed, backing off");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                }
            }
        }
    }

    async fn handle_message(&self, message: Message) {
        let Some(text) = message.text.as_deref() else {
            return;
        };
        let chat_id = message.chat.id.to_string();

        if !is_allowed(&self.allowed_ids, message.from.as_ref().map(|u| u.id)) {
            self.reply(&chat_id, REPLY_REFUSED).await;
            return;
        }

        let reply = match parse_command(text) {
            Command::Start => REPLY_MENU.to_string(),
            Command::Count => self.count_reply().await,
            Command::Last => self.last_reply().await,
            Command::Delete(arg) => self.delete_reply(arg.as_deref()).await,
            Command::Unknown => REPLY_NOT_UNDERSTOOD.to_string(),
        };

        self.reply(&chat_id, &reply).await;
    }

    async fn count_reply(&self) -> String {
        match self.store.count().await {
            Ok(count) => format!("Participants: {}", count),
            Err(e) => {
                tracing::error!(error = %e, "count failed");
                REPLY_SERVER_ERROR.to_string()
            }
        }
    }

    async fn last_reply(&self) -> String {
        match self.store.find_recent(RECENT_LIMIT).await {
            Ok(records) if records.is_empty() => REPLY_EMPTY.to_string(),
            Ok(records) => records
                .iter()
                .map(format_record_with_created)
                .collect::<Vec<_>>()
                .join("\n\n"),
            Err(e) => {
                tracing::error!(error = %e, "find_recent failed");
                REPLY_SERVER_ERROR.to_string()
            }
        }
    }

    async fn delete_reply(&self, arg: Option<&str>) -> String {
        let Some(raw_id) = arg else {
            return REPLY_DELETE_USAGE.to_string();
        };
        let Some(id) = parse_object_id(raw_id) else {
            return REPLY_INVALID_ID.to_string();
        };
        match self.store.delete_by_id(&id).await {
            Ok(true) => REPLY_DELETED.to_string(),
            Ok(false) => REPLY_NOT_FOUND.to_string(),
            Err(e) => {
                tracing::error!(error = %e, "delete failed");
                REPLY_SERVER_ERROR.to_string()
            }
        }
    }

    /// Send a reply with the standard keyboard attached; failures are
    /// logged and dropped.
    async fn reply(&self, chat_id: &str, text: &str) {
        if let Err(e) = self
            .client
            .send_message(chat_id, None, text, Some(&self.keyboard))
            .await
        {
            tracing::warn!(chat_id, error = %e, "Failed to send reply");
        }
    }
}
