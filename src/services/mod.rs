// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! External services and background dispatch.

pub mod notify;
pub mod telegram;

pub use notify::Notifier;
pub use telegram::TelegramClient;
