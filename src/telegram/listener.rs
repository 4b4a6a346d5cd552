//! Long-poll loop: one update at a time, replies sent in order

use super::types::Update;
use super::{ChatTransport, TelegramClient};
use crate::commands::CommandHandler;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const RETRY_DELAY: Duration = Duration::from_secs(1);

pub struct BotListener {
    client: Arc<TelegramClient>,
    transport: Arc<dyn ChatTransport>,
    handler: CommandHandler,
}

impl BotListener {
    pub fn new(
        client: Arc<TelegramClient>,
        transport: Arc<dyn ChatTransport>,
        handler: CommandHandler,
    ) -> Self {
        Self {
            client,
            transport,
            handler,
        }
    }

    /// Handle one update and deliver its replies. Returns the number of replies sent.
    pub async fn dispatch(&self, update: &Update) -> usize {
        let Some(message) = &update.message else {
            return 0;
        };
        let Some(text) = message.text.as_deref() else {
            return 0;
        };

        let chat_id = message.chat.id;
        let mut sent = 0;
        for reply in self.handler.handle(chat_id, text) {
            match self.transport.send_message(chat_id, &reply).await {
                Ok(()) => sent += 1,
                Err(e) => warn!(chat_id, error = %e, "Failed to send message"),
            }
        }
        sent
    }

    pub async fn run(self, cancel: CancellationToken) {
        info!("Starting Telegram bot");
        let mut offset = 0;

        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.client.get_updates(offset) => result,
            };

            match result {
                Ok(updates) => {
                    for update in &updates {
                        offset = offset.max(update.update_id + 1);
                        self.dispatch(update).await;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "getUpdates failed, retrying");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(RETRY_DELAY) => {}
                    }
                }
            }
        }

        info!("Telegram bot stopped");
    }
}
