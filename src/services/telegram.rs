// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Telegram Bot API client.
//!
//! Handles:
//! - Outbound notifications (`sendMessage`, optionally into a forum topic)
//! - Long-polling for operator commands (`getUpdates`)
//! - Response checking, including Telegram's in-band `ok` flag

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeout for a single outbound send. A stalled Telegram API must not
/// accumulate unbounded background work.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Extra headroom over the server-side long-poll window.
const POLL_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

/// Telegram Bot API client.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    /// Create a client for the given bot token.
    pub fn new(token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("https://api.telegram.org/bot{}", token),
        }
    }

    /// Send a plain-text message to a chat, optionally scoped to a forum
    /// topic and optionally carrying a reply keyboard.
    pub async fn send_message(
        &self,
        chat_id: &str,
        thread_id: Option<i64>,
        text: &str,
        keyboard: Option<&ReplyKeyboardMarkup>,
    ) -> Result<(), AppError> {
        let url = format!("{}/sendMessage", self.base_url);

        let body = SendMessageRequest {
            chat_id,
            message_thread_id: thread_id,
            text,
            reply_markup: keyboard,
        };

        let response = self
            .http
            .post(&url)
            .timeout(SEND_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Telegram(e.to_string()))?;

        self.check_response(response).await
    }

    /// Long-poll for updates after `offset`, waiting up to `timeout_secs`
    /// on the server side.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, AppError> {
        let url = format!("{}/getUpdates", self.base_url);

        let response = self
            .http
            .get(&url)
            .timeout(Duration::from_secs(timeout_secs) + POLL_TIMEOUT_MARGIN)
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", timeout_secs.to_string()),
                ("allowed_updates", "[\"message\"]".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Telegram(e.to_string()))?;

        let envelope: ApiResponse<Vec<Update>> = self.check_response_json(response).await?;
        envelope
            .result
            .ok_or_else(|| AppError::Telegram("getUpdates returned no result".to_string()))
    }

    /// Check response status and Telegram's `ok` flag.
    async fn check_response(&self, response: reqwest::Response) -> Result<(), AppError> {
        let _: ApiResponse<serde_json::Value> = self.check_response_json(response).await?;
        Ok(())
    }

    /// Check response and parse the API envelope.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<ApiResponse<T>, AppError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Telegram(format!("HTTP {}: {}", status, body)));
        }

        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| AppError::Telegram(format!("JSON parse error: {}", e)))?;

        if !envelope.ok {
            return Err(AppError::Telegram(format!(
                "API not ok: {}",
                envelope.description.as_deref().unwrap_or("no description")
            )));
        }

        Ok(envelope)
    }
}

/// Telegram API response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    description: Option<String>,
    result: Option<T>,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_thread_id: Option<i64>,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a ReplyKeyboardMarkup>,
}

/// Persistent reply keyboard shown under the operator's input field.
#[derive(Debug, Clone, Serialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyboardButton {
    pub text: String,
}

impl ReplyKeyboardMarkup {
    /// One button per row.
    pub fn from_rows(rows: &[&str]) -> Self {
        Self {
            keyboard: rows
                .iter()
                .map(|text| {
                    vec![KeyboardButton {
                        text: text.to_string(),
                    }]
                })
                .collect(),
            resize_keyboard: true,
        }
    }
}

/// Incoming update from `getUpdates`.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_from_rows() {
        let kbd = ReplyKeyboardMarkup::from_rows(&["a", "b"]);
        assert_eq!(kbd.keyboard.len(), 2);
        assert_eq!(kbd.keyboard[0][0].text, "a");
        assert!(kbd.resize_keyboard);
    }

    #[test]
    fn test_send_message_request_omits_empty_fields() {
        let body = SendMessageRequest {
            chat_id: "42",
            message_thread_id: None,
            text: "hi",
            reply_markup: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"chat_id": "42", "text": "hi"}));
    }

    #[test]
    fn test_update_envelope_parses() {
        let raw = serde_json::json!({
            "ok": true,
            "result": [{
                "update_id": 7,
                "message": {
                    "message_id": 1,
                    "from": {"id": 123, "is_bot": false, "first_name": "Op"},
                    "chat": {"id": 123, "type": "private"},
                    "text": "/count"
                }
            }]
        });
        let envelope: ApiResponse<Vec<Update>> = serde_json::from_value(raw).unwrap();
        assert!(envelope.ok);
        let updates = envelope.result.unwrap();
        assert_eq!(updates[0].update_id, 7);
        assert_eq!(updates[0].message.as_ref().unwrap().text.as_deref(), Some("/count"));
    }
}
