//! Auto-update notifications
//!
//! Each tick loads the subscribers and the latest rates once, renders one
//! summary and sends it to every subscriber whose interval has elapsed since
//! their last send. The last-send times live only in this scheduler, so a
//! restart makes every subscriber due on the first tick.

use crate::commands::messages::AUTO_UPDATE_HEADER;
use crate::db::{RateStore, SubscriptionStore};
use crate::error::Result;
use crate::services::{presentation, RatesService};
use crate::telegram::ChatTransport;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Outcome of one notification tick
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub due: usize,
    pub sent: usize,
    pub failed: usize,
}

pub struct NotificationScheduler {
    rates: Arc<dyn RateStore>,
    subscriptions: Arc<dyn SubscriptionStore>,
    transport: Arc<dyn ChatTransport>,
    tick_interval: Duration,
    last_sent: HashMap<i64, DateTime<Utc>>,
}

impl NotificationScheduler {
    pub fn new(
        rates: Arc<dyn RateStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
        transport: Arc<dyn ChatTransport>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            rates,
            subscriptions,
            transport,
            tick_interval,
            last_sent: HashMap::new(),
        }
    }

    fn is_due(&self, user_id: i64, interval_minutes: u32, now: DateTime<Utc>) -> bool {
        match self.last_sent.get(&user_id) {
            None => true,
            Some(last) => now - *last >= ChronoDuration::minutes(i64::from(interval_minutes)),
        }
    }

    /// Run one notification pass at `now`.
    ///
    /// A failed send is logged and still recorded as the user's last send.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<TickReport> {
        let subscribers = self.subscriptions.list_subscribed()?;
        if subscribers.is_empty() {
            return Ok(TickReport::default());
        }

        let rates = RatesService::get_rates(self.rates.as_ref())?;
        if rates.is_empty() {
            debug!("No rates observed yet, skipping notifications");
            return Ok(TickReport::default());
        }

        let message = presentation::format_summary(AUTO_UPDATE_HEADER, &rates);

        let mut report = TickReport::default();
        for sub in subscribers {
            if !self.is_due(sub.user_id, sub.interval_minutes, now) {
                continue;
            }
            report.due += 1;

            match self.transport.send_message(sub.user_id, &message).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    warn!(chat_id = sub.user_id, error = %e, "Failed to send auto-update");
                    report.failed += 1;
                }
            }
            self.last_sent.insert(sub.user_id, now);
        }

        Ok(report)
    }

    /// Tick every `tick_interval` (first tick one interval after start) until cancelled
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(tick_secs = self.tick_interval.as_secs(), "Notification scheduler started");

        let mut ticker =
            tokio::time::interval_at(Instant::now() + self.tick_interval, self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            match self.tick(Utc::now()).await {
                Ok(report) if report.due > 0 => info!(
                    due = report.due,
                    sent = report.sent,
                    failed = report.failed,
                    "Auto-updates sent"
                ),
                Ok(_) => {}
                Err(e) => error!(error = %e, "Notification tick failed"),
            }
        }

        info!("Notification scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryDb;
    use crate::telegram::testing::RecordingTransport;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    fn scheduler(db: &Arc<MemoryDb>, transport: &Arc<RecordingTransport>) -> NotificationScheduler {
        NotificationScheduler::new(
            db.clone(),
            db.clone(),
            transport.clone(),
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn test_interval_is_respected() {
        let db = Arc::new(MemoryDb::new());
        let transport = Arc::new(RecordingTransport::default());
        db.record_price("bitcoin", 100.0, t0()).unwrap();
        db.set_auto_subscribe(42, 10).unwrap();
        let mut notifier = scheduler(&db, &transport);

        let first = notifier.tick(t0()).await.unwrap();
        assert_eq!(first, TickReport { due: 1, sent: 1, failed: 0 });

        let second = notifier.tick(t0() + ChronoDuration::minutes(5)).await.unwrap();
        assert_eq!(second.due, 0);

        let third = notifier.tick(t0() + ChronoDuration::minutes(11)).await.unwrap();
        assert_eq!(third.sent, 1);

        let sent = transport.sent_to(42);
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], "🔔 Auto-update:\n\n💰 bitcoin: $100.00 ➡️(0.00%)\n");
    }

    #[tokio::test]
    async fn test_exact_interval_boundary_is_due() {
        let db = Arc::new(MemoryDb::new());
        let transport = Arc::new(RecordingTransport::default());
        db.record_price("bitcoin", 100.0, t0()).unwrap();
        db.set_auto_subscribe(7, 3).unwrap();
        let mut notifier = scheduler(&db, &transport);

        notifier.tick(t0()).await.unwrap();
        assert_eq!(notifier.tick(t0() + ChronoDuration::minutes(2)).await.unwrap().due, 0);
        assert_eq!(notifier.tick(t0() + ChronoDuration::minutes(3)).await.unwrap().sent, 1);
    }

    #[tokio::test]
    async fn test_failed_send_still_updates_last_sent() {
        let db = Arc::new(MemoryDb::new());
        let transport = Arc::new(RecordingTransport::default());
        transport.failing_chats.lock().insert(42);
        db.record_price("bitcoin", 100.0, t0()).unwrap();
        db.set_auto_subscribe(42, 10).unwrap();
        db.set_auto_subscribe(43, 10).unwrap();
        let mut notifier = scheduler(&db, &transport);

        let report = notifier.tick(t0()).await.unwrap();
        assert_eq!(report, TickReport { due: 2, sent: 1, failed: 1 });

        transport.failing_chats.lock().clear();
        let report = notifier.tick(t0() + ChronoDuration::minutes(1)).await.unwrap();
        assert_eq!(report.due, 0);
        assert!(transport.sent_to(42).is_empty());
    }

    #[tokio::test]
    async fn test_no_rates_sends_nothing() {
        let db = Arc::new(MemoryDb::new());
        let transport = Arc::new(RecordingTransport::default());
        db.set_auto_subscribe(42, 10).unwrap();
        let mut notifier = scheduler(&db, &transport);

        assert_eq!(notifier.tick(t0()).await.unwrap(), TickReport::default());

        // lastSent untouched, so the user is due as soon as data arrives
        db.record_price("bitcoin", 100.0, t0()).unwrap();
        let report = notifier.tick(t0() + ChronoDuration::minutes(1)).await.unwrap();
        assert_eq!(report.sent, 1);
    }

    #[tokio::test]
    async fn test_rates_loaded_once_per_tick() {
        let db = Arc::new(MemoryDb::new());
        let transport = Arc::new(RecordingTransport::default());
        db.record_price("bitcoin", 100.0, t0()).unwrap();
        for user in 1..=5 {
            db.set_auto_subscribe(user, 1).unwrap();
        }
        let mut notifier = scheduler(&db, &transport);

        let before = db.read_count();
        let report = notifier.tick(t0()).await.unwrap();
        assert_eq!(report.sent, 5);
        // list_subscribed + latest_rates
        assert_eq!(db.read_count() - before, 2);
    }

    #[tokio::test]
    async fn test_storage_failure_is_error() {
        let db = Arc::new(MemoryDb::new());
        let transport = Arc::new(RecordingTransport::default());
        db.set_failing(true);
        let mut notifier = scheduler(&db, &transport);

        assert!(notifier.tick(t0()).await.unwrap_err().is_storage());
    }
}
