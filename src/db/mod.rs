//! Storage layer
//!
//! Storage is only ever reached through two narrow capability traits:
//! - `RateStore` - per-coin price aggregates
//! - `SubscriptionStore` - per-user auto-update preferences
//!
//! Backends:
//! - `sqlite::SqliteDb` - r2d2-pooled SQLite, used by the running service
//! - `memory::MemoryDb` - in-process fake for tests

pub mod memory;
pub mod models;
pub mod sqlite;

use crate::coins;
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use models::{CurrencyRate, Subscription, User};

/// Capability set for per-coin price aggregates
pub trait RateStore: Send + Sync {
    /// Load the stored row for a coin, if any
    fn load_rate(&self, currency_id: &str) -> Result<Option<CurrencyRate>>;

    /// Atomic insert-or-merge of a computed row
    fn upsert_rate(&self, rate: &CurrencyRate) -> Result<()>;

    /// One row per observed coin, ordered by currency id
    fn latest_rates(&self) -> Result<Vec<CurrencyRate>>;

    /// Record a price observation and return the row as computed in-process.
    ///
    /// The load-compute-upsert sequence is not one transaction; two concurrent
    /// writers for the same coin can race. The upsert merge keeps extrema from
    /// regressing within a window, but `current_price` and the window markers
    /// follow the last writer.
    fn record_price(&self, currency_id: &str, price: f64, now: DateTime<Utc>) -> Result<CurrencyRate> {
        let rate = match self.load_rate(currency_id)? {
            Some(mut existing) => {
                existing.observe(price, now);
                existing
            }
            None => CurrencyRate::seed(currency_id, price, now),
        };

        self.upsert_rate(&rate)?;
        Ok(rate)
    }

    /// Latest row for one coin; unsupported ids fail without touching storage
    fn get_rate(&self, currency_id: &str) -> Result<CurrencyRate> {
        if !coins::is_supported(currency_id) {
            return Err(AppError::NotFound(format!("currency not supported: {}", currency_id)));
        }

        self.load_rate(currency_id)?
            .ok_or_else(|| AppError::NotFound(format!("no data for currency: {}", currency_id)))
    }

    /// Latest row for every observed coin
    fn get_all_rates(&self) -> Result<Vec<CurrencyRate>> {
        self.latest_rates()
    }
}

/// Capability set for subscription preferences
pub trait SubscriptionStore: Send + Sync {
    /// Upsert the user with auto-updates on. `interval_minutes` is validated by the caller.
    fn set_auto_subscribe(&self, user_id: i64, interval_minutes: u32) -> Result<()>;

    /// Turn auto-updates off and zero the interval
    fn disable_auto_subscribe(&self, user_id: i64) -> Result<()>;

    /// Every currently subscribed user
    fn list_subscribed(&self) -> Result<Vec<Subscription>>;

    /// Look up one user row
    fn get_user(&self, user_id: i64) -> Result<Option<User>>;
}
