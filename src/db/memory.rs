//! In-memory storage backend
//!
//! Mirrors the SQLite semantics (including the windowed upsert merge) so the
//! services, scheduler and command layers can be tested without a database.

use super::models::{CurrencyRate, Subscription, User};
use super::{RateStore, SubscriptionStore};
use crate::error::{AppError, Result};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct MemoryDb {
    rates: Mutex<BTreeMap<String, CurrencyRate>>,
    users: Mutex<BTreeMap<i64, User>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of storage reads served so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of storage writes served so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent call fail like an unreachable database
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Insert a row as-is, bypassing the merge and the counters
    pub fn put_rate(&self, rate: CurrencyRate) {
        self.rates.lock().insert(rate.currency_id.clone(), rate);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(AppError::Database(rusqlite::Error::InvalidQuery))
        } else {
            Ok(())
        }
    }

    fn read(&self) -> Result<()> {
        self.check()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn write(&self) -> Result<()> {
        self.check()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl RateStore for MemoryDb {
    fn load_rate(&self, currency_id: &str) -> Result<Option<CurrencyRate>> {
        self.read()?;
        Ok(self.rates.lock().get(currency_id).cloned())
    }

    fn upsert_rate(&self, rate: &CurrencyRate) -> Result<()> {
        self.write()?;
        let mut rates = self.rates.lock();
        let merged = match rates.get(&rate.currency_id) {
            Some(stored) => CurrencyRate::merge_into_stored(stored, rate),
            None => rate.clone(),
        };
        rates.insert(rate.currency_id.clone(), merged);
        Ok(())
    }

    fn latest_rates(&self) -> Result<Vec<CurrencyRate>> {
        self.read()?;
        Ok(self.rates.lock().values().cloned().collect())
    }
}

impl SubscriptionStore for MemoryDb {
    fn set_auto_subscribe(&self, user_id: i64, interval_minutes: u32) -> Result<()> {
        self.write()?;
        self.users.lock().insert(
            user_id,
            User {
                telegram_id: user_id,
                auto_subscribe: true,
                send_interval: interval_minutes,
            },
        );
        Ok(())
    }

    fn disable_auto_subscribe(&self, user_id: i64) -> Result<()> {
        self.write()?;
        if let Some(user) = self.users.lock().get_mut(&user_id) {
            user.auto_subscribe = false;
            user.send_interval = 0;
        }
        Ok(())
    }

    fn list_subscribed(&self) -> Result<Vec<Subscription>> {
        self.read()?;
        Ok(self
            .users
            .lock()
            .values()
            .filter(|u| u.auto_subscribe)
            .map(|u| Subscription {
                user_id: u.telegram_id,
                interval_minutes: u.send_interval,
            })
            .collect())
    }

    fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        self.read()?;
        Ok(self.users.lock().get(&user_id).cloned())
    }
}
