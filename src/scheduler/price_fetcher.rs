//! Periodic price fetch into the rate store

use crate::coins::{self, SUPPORTED_COINS};
use crate::db::RateStore;
use crate::error::Result;
use crate::quotes::PriceSource;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Outcome of one fetch tick
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FetchReport {
    pub stored: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub struct PriceFetcher {
    source: Arc<dyn PriceSource>,
    store: Arc<dyn RateStore>,
    interval: Duration,
}

impl PriceFetcher {
    pub fn new(source: Arc<dyn PriceSource>, store: Arc<dyn RateStore>, interval: Duration) -> Self {
        Self {
            source,
            store,
            interval,
        }
    }

    /// Fetch every supported coin once and record what came back.
    ///
    /// Coins missing from the response and entries with an unusable price
    /// count as skipped. An upstream failure abandons the tick. A storage
    /// failure for one coin is logged and the remaining coins are still
    /// recorded.
    pub async fn fetch_once(&self, now: DateTime<Utc>) -> Result<FetchReport> {
        let prices = self.source.fetch_prices(&SUPPORTED_COINS).await?;

        let mut report = FetchReport::default();

        let mut extra: Vec<&String> = prices.keys().filter(|c| !coins::is_supported(c)).collect();
        extra.sort();
        for coin in extra {
            warn!(coin = %coin, "Ignoring unsupported coin in response");
            report.skipped += 1;
        }

        for coin in SUPPORTED_COINS {
            let Some(&price) = prices.get(coin) else {
                warn!(coin, "Price not found for coin");
                report.skipped += 1;
                continue;
            };
            if !price.is_finite() || price < 0.0 {
                warn!(coin, price, "Ignoring invalid price");
                report.skipped += 1;
                continue;
            }

            match self.store.record_price(coin, price, now) {
                Ok(rate) => {
                    debug!(coin, price, change = rate.change_percent, "Recorded price");
                    report.stored += 1;
                }
                Err(e) => {
                    error!(coin, error = %e, "Failed to save price");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Fetch immediately, then on every interval until cancelled
    pub async fn run(self, cancel: CancellationToken) {
        info!(
            source = self.source.name(),
            interval_secs = self.interval.as_secs(),
            "Price fetcher started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            info!("Starting currency update");
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Currency update abandoned on shutdown");
                    break;
                }
                result = self.fetch_once(Utc::now()) => match result {
                    Ok(report) => info!(
                        stored = report.stored,
                        skipped = report.skipped,
                        failed = report.failed,
                        "Currency update completed"
                    ),
                    Err(e) => error!(error = %e, "Failed to update prices"),
                },
            }
        }

        info!("Price fetcher stopped");
    }
}
