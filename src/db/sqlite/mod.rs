//! SQLite database module

mod connection;
mod currency;
mod migrations;
mod user;

pub use connection::{connect_with_retry, DbPool};

use super::models::{CurrencyRate, Subscription, User};
use super::{RateStore, SubscriptionStore};
use crate::error::Result;

/// SQLite database wrapper
pub struct SqliteDb {
    pool: DbPool,
}

impl SqliteDb {
    /// Wrap an open pool and run migrations
    pub fn new(pool: DbPool) -> Result<Self> {
        let db = Self { pool };
        db.run_migrations()?;
        Ok(db)
    }

    /// Private in-memory database, mostly for tests
    pub fn open_in_memory() -> Result<Self> {
        Self::new(connection::create_memory_pool()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.pool.get()?;
        migrations::run_migrations(&conn)
    }

    /// Current pool state, for shutdown logging
    pub fn pool_state(&self) -> r2d2::State {
        self.pool.state()
    }
}

// ========== Rate Methods ==========

impl RateStore for SqliteDb {
    fn load_rate(&self, currency_id: &str) -> Result<Option<CurrencyRate>> {
        let conn = self.pool.get()?;
        currency::get_rate(&conn, currency_id)
    }

    fn upsert_rate(&self, rate: &CurrencyRate) -> Result<()> {
        let conn = self.pool.get()?;
        currency::upsert_rate(&conn, rate)
    }

    fn latest_rates(&self) -> Result<Vec<CurrencyRate>> {
        let conn = self.pool.get()?;
        currency::get_rates(&conn)
    }
}

// ========== User Methods ==========

impl SubscriptionStore for SqliteDb {
    fn set_auto_subscribe(&self, user_id: i64, interval_minutes: u32) -> Result<()> {
        let conn = self.pool.get()?;
        user::set_auto_subscribe(&conn, user_id, interval_minutes)
    }

    fn disable_auto_subscribe(&self, user_id: i64) -> Result<()> {
        let conn = self.pool.get()?;
        user::disable_auto_subscribe(&conn, user_id)
    }

    fn list_subscribed(&self) -> Result<Vec<Subscription>> {
        let conn = self.pool.get()?;
        user::get_subscribed_users(&conn)
    }

    fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        user::get_user(&conn, user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::time::Duration as StdDuration;
    use tempfile::tempdir;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    fn create_test_db() -> SqliteDb {
        SqliteDb::open_in_memory().unwrap()
    }

    #[test]
    fn test_record_price_roundtrips_row() {
        let db = create_test_db();
        let seeded = db.record_price("bitcoin", 100.0, t0()).unwrap();

        let stored = db.get_rate("bitcoin").unwrap();
        assert_eq!(stored, seeded);
        assert_eq!(stored.change_percent, 0.0);
    }

    #[test]
    fn test_record_price_scenario() {
        let db = create_test_db();
        db.record_price("bitcoin", 100.0, t0()).unwrap();
        db.record_price("bitcoin", 90.0, t0() + Duration::minutes(1)).unwrap();
        db.record_price("bitcoin", 110.0, t0() + Duration::minutes(2)).unwrap();

        let rate = db.get_rate("bitcoin").unwrap();
        assert_eq!(rate.current_price, 110.0);
        assert_eq!(rate.min_price, 90.0);
        assert_eq!(rate.max_price, 110.0);
        assert_eq!(rate.hour_min_price, 90.0);
        assert_eq!(rate.hour_max_price, 110.0);
        assert!((rate.change_percent - 22.22).abs() < 0.01);
        assert_eq!(rate.time_stamp, t0());
    }

    #[test]
    fn test_window_resets_persist() {
        let db = create_test_db();
        db.record_price("ethereum", 3000.0, t0()).unwrap();
        db.record_price("ethereum", 3600.0, t0() + Duration::minutes(10)).unwrap();

        let next_day = t0() + Duration::days(1);
        db.record_price("ethereum", 3100.0, next_day).unwrap();

        let rate = db.get_rate("ethereum").unwrap();
        assert_eq!(rate.min_price, 3100.0);
        assert_eq!(rate.max_price, 3100.0);
        assert_eq!(rate.hour_min_price, 3100.0);
        assert_eq!(rate.hour_max_price, 3100.0);
        assert_eq!(rate.date, next_day.date_naive());
        assert_eq!(rate.time_stamp, next_day);
    }

    #[test]
    fn test_upsert_merges_within_window() {
        let db = create_test_db();
        db.record_price("solana", 100.0, t0()).unwrap();
        let stale = db.load_rate("solana").unwrap().unwrap();
        db.record_price("solana", 80.0, t0() + Duration::minutes(1)).unwrap();

        let mut late = stale;
        late.observe(95.0, t0() + Duration::minutes(2));
        db.upsert_rate(&late).unwrap();

        let rate = db.get_rate("solana").unwrap();
        assert_eq!(rate.min_price, 80.0);
        assert_eq!(rate.hour_min_price, 80.0);
        assert_eq!(rate.current_price, 95.0);
    }

    #[test]
    fn test_get_rate_errors() {
        let db = create_test_db();
        assert!(matches!(db.get_rate("xrp"), Err(AppError::NotFound(_))));
        assert!(matches!(db.get_rate("tron"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_get_all_rates_one_per_coin() {
        let db = create_test_db();
        db.record_price("tron", 0.1, t0()).unwrap();
        db.record_price("bitcoin", 60000.0, t0()).unwrap();
        db.record_price("bitcoin", 61000.0, t0() + Duration::minutes(5)).unwrap();

        let rates = db.get_all_rates().unwrap();
        let ids: Vec<&str> = rates.iter().map(|r| r.currency_id.as_str()).collect();
        assert_eq!(ids, vec!["bitcoin", "tron"]);
        assert_eq!(rates[0].current_price, 61000.0);
    }

    #[test]
    fn test_subscription_lifecycle() {
        let db = create_test_db();
        db.set_auto_subscribe(42, 10).unwrap();
        db.set_auto_subscribe(43, 30).unwrap();
        db.set_auto_subscribe(42, 20).unwrap();
        db.disable_auto_subscribe(43).unwrap();

        let subs = db.list_subscribed().unwrap();
        assert_eq!(
            subs,
            vec![Subscription {
                user_id: 42,
                interval_minutes: 20
            }]
        );

        let user = db.get_user(43).unwrap().unwrap();
        assert!(!user.auto_subscribe);
        assert_eq!(user.send_interval, 0);
        assert!(db.get_user(44).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_database_persists_across_pools() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hub.db");

        {
            let pool = connect_with_retry(&path, 2, 1, StdDuration::from_millis(1))
                .await
                .unwrap();
            let db = SqliteDb::new(pool).unwrap();
            db.record_price("dogecoin", 0.15, t0()).unwrap();
            db.set_auto_subscribe(1, 5).unwrap();
        }

        let pool = connect_with_retry(&path, 2, 1, StdDuration::from_millis(1))
            .await
            .unwrap();
        let db = SqliteDb::new(pool).unwrap();
        assert_eq!(db.get_rate("dogecoin").unwrap().current_price, 0.15);
        assert_eq!(db.list_subscribed().unwrap().len(), 1);
    }
}
