//! Chat bot commands
//!
//! Parses inbound message text into a `Command` and renders the reply
//! messages. Delivery is left to the caller.

pub mod messages;
pub mod rates;
pub mod subscription;

use crate::db::{RateStore, SubscriptionStore};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Coins,
    Rates(Option<String>),
    StartAuto(Option<String>),
    StopAuto,
    Unknown(String),
}

impl Command {
    /// Parse `/name[@bot] [arg ...]`. Text that is not a command yields `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let head = parts.next()?.strip_prefix('/')?;
        let name = head.split('@').next().unwrap_or(head);
        let arg = parts.next().map(str::to_string);

        let command = match name {
            "start" => Command::Start,
            "help" => Command::Help,
            "coins" => Command::Coins,
            "rates" => Command::Rates(arg),
            "start_auto" => Command::StartAuto(arg),
            "stop_auto" => Command::StopAuto,
            other => Command::Unknown(other.to_string()),
        };
        Some(command)
    }
}

/// Renders replies for inbound commands
pub struct CommandHandler {
    rates: Arc<dyn RateStore>,
    subscriptions: Arc<dyn SubscriptionStore>,
    default_interval_minutes: u32,
}

impl CommandHandler {
    pub fn new(
        rates: Arc<dyn RateStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
        default_interval_minutes: u32,
    ) -> Self {
        Self {
            rates,
            subscriptions,
            default_interval_minutes,
        }
    }

    /// Replies to send back to `chat_id`, in order. Empty for non-command text.
    pub fn handle(&self, chat_id: i64, text: &str) -> Vec<String> {
        let Some(command) = Command::parse(text) else {
            return Vec::new();
        };
        debug!(chat_id, ?command, "Handling command");

        match command {
            Command::Start => vec![messages::WELCOME.to_string()],
            Command::Help => vec![messages::HELP.to_string()],
            Command::Coins => vec![rates::coin_list()],
            Command::Rates(None) => vec![rates::all_rates(self.rates.as_ref())],
            Command::Rates(Some(coin)) => vec![rates::single_rate(self.rates.as_ref(), &coin)],
            Command::StartAuto(arg) => vec![subscription::start_auto(
                self.subscriptions.as_ref(),
                chat_id,
                arg.as_deref(),
                self.default_interval_minutes,
            )],
            Command::StopAuto => vec![subscription::stop_auto(self.subscriptions.as_ref(), chat_id)],
            Command::Unknown(_) => vec![
                messages::UNKNOWN_COMMAND.to_string(),
                messages::HELP.to_string(),
            ],
        }
    }
}
