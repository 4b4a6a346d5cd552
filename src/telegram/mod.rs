//! Telegram bot plumbing
//!
//! - `client` - Bot API calls (getMe, getUpdates, sendMessage)
//! - `listener` - long-poll loop feeding the command handler
//! - `types` - wire types

pub mod client;
pub mod listener;
pub mod types;

use crate::error::Result;
use async_trait::async_trait;

pub use client::TelegramClient;
pub use listener::BotListener;

/// Outbound message delivery to a chat
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()>;
}

/// Recording transport for tests
#[cfg(test)]
pub mod testing {
    use super::ChatTransport;
    use crate::error::{AppError, Result};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashSet;

    #[derive(Default)]
    pub struct RecordingTransport {
        pub sent: Mutex<Vec<(i64, String)>>,
        pub failing_chats: Mutex<HashSet<i64>>,
    }

    impl RecordingTransport {
        pub fn sent_to(&self, chat_id: i64) -> Vec<String> {
            self.sent
                .lock()
                .iter()
                .filter(|(id, _)| *id == chat_id)
                .map(|(_, text)| text.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ChatTransport for RecordingTransport {
        async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
            if self.failing_chats.lock().contains(&chat_id) {
                return Err(AppError::Telegram(format!("chat {} unreachable", chat_id)));
            }
            self.sent.lock().push((chat_id, text.to_string()));
            Ok(())
        }
    }
}
