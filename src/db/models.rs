//! Storage models and the price-statistics window logic

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Length of the rolling hour window, in seconds
pub const HOUR_WINDOW_SECS: i64 = 3600;

/// Current-state row for one coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRate {
    pub currency_id: String,
    pub current_price: f64,
    /// Extrema for the current UTC calendar day
    pub min_price: f64,
    pub max_price: f64,
    /// Amplitude of the hour window relative to its floor, in percent
    pub change_percent: f64,
    /// Extrema for the rolling hour window starting at `time_stamp`
    pub hour_min_price: f64,
    pub hour_max_price: f64,
    pub time_stamp: DateTime<Utc>,
    pub date: NaiveDate,
}

impl CurrencyRate {
    /// First observation for a coin: every price field equals `price`
    pub fn seed(currency_id: &str, price: f64, now: DateTime<Utc>) -> Self {
        Self {
            currency_id: currency_id.to_string(),
            current_price: price,
            min_price: price,
            max_price: price,
            change_percent: 0.0,
            hour_min_price: price,
            hour_max_price: price,
            time_stamp: now,
            date: now.date_naive(),
        }
    }

    /// Fold a new observation into the running day and hour windows
    pub fn observe(&mut self, price: f64, now: DateTime<Utc>) {
        self.current_price = price;

        let today = now.date_naive();
        if self.date < today {
            self.min_price = price;
            self.max_price = price;
            self.date = today;
        } else {
            self.min_price = self.min_price.min(price);
            self.max_price = self.max_price.max(price);
        }

        if now - self.time_stamp >= Duration::seconds(HOUR_WINDOW_SECS) {
            self.hour_min_price = price;
            self.hour_max_price = price;
            self.time_stamp = now;
        } else {
            self.hour_min_price = self.hour_min_price.min(price);
            self.hour_max_price = self.hour_max_price.max(price);
        }

        self.change_percent = change_percent(self.hour_min_price, self.hour_max_price);
    }

    /// Combine an incoming row with the one already stored.
    ///
    /// Extrema are merged with min/max only while both rows belong to the same
    /// window; after a window reset the incoming values replace the stored ones.
    /// The SQLite upsert statement encodes the same rule.
    pub fn merge_into_stored(stored: &CurrencyRate, incoming: &CurrencyRate) -> CurrencyRate {
        let mut merged = incoming.clone();

        if stored.date == incoming.date {
            merged.min_price = stored.min_price.min(incoming.min_price);
            merged.max_price = stored.max_price.max(incoming.max_price);
        }

        if stored.time_stamp == incoming.time_stamp {
            merged.hour_min_price = stored.hour_min_price.min(incoming.hour_min_price);
            merged.hour_max_price = stored.hour_max_price.max(incoming.hour_max_price);
        }

        merged
    }

    /// Trend direction derived from the sign of `change_percent`
    pub fn trend(&self) -> Trend {
        if self.change_percent > 0.0 {
            Trend::Up
        } else if self.change_percent < 0.0 {
            Trend::Down
        } else {
            Trend::Flat
        }
    }
}

/// `(max - min) / min * 100`, or 0 when the floor is 0
pub fn change_percent(hour_min: f64, hour_max: f64) -> f64 {
    if hour_min == 0.0 {
        0.0
    } else {
        (hour_max - hour_min) / hour_min * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Flat,
    Down,
}

/// Telegram user and subscription preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub telegram_id: i64,
    pub auto_subscribe: bool,
    /// Minutes between notifications, meaningful only while subscribed
    pub send_interval: u32,
}

/// An opted-in user and their interval in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub user_id: i64,
    pub interval_minutes: u32,
}
