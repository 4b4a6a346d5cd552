//! Scheduler module for Currency Hub
//!
//! Periodic background tasks, each stopped by the shared cancellation token:
//! - Price fetch from CoinGecko (every 5 minutes, plus once at startup)
//! - Auto-update notifications to subscribed chats (every minute)

mod notifier;
mod price_fetcher;

pub use notifier::{NotificationScheduler, TickReport};
pub use price_fetcher::{FetchReport, PriceFetcher};
