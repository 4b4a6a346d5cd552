//! Rates Service
//!
//! Read side of the rate store, shared by HTTP handlers, chat commands and
//! the notification scheduler.

use super::presentation;
use crate::coins;
use crate::db::models::CurrencyRate;
use crate::db::RateStore;
use crate::error::Result;
use tracing::debug;

/// Rates service for query logic
pub struct RatesService;

impl RatesService {
    /// Latest row for every observed coin
    pub fn get_rates(store: &dyn RateStore) -> Result<Vec<CurrencyRate>> {
        let rates = store.get_all_rates()?;
        debug!("RatesService::get_rates - {} rows", rates.len());
        Ok(rates)
    }

    /// Latest row for one coin. The id is normalized first; unsupported ids
    /// fail with `NotFound` before storage is touched.
    pub fn get_rate(store: &dyn RateStore, currency_id: &str) -> Result<CurrencyRate> {
        store.get_rate(&coins::normalize(currency_id))
    }

    /// HTTP body for `GET /rates`
    pub fn rates_text(store: &dyn RateStore) -> Result<String> {
        let rates = Self::get_rates(store)?;
        Ok(presentation::format_rates(&rates))
    }

    /// HTTP body for `GET /rates/{currency}`
    pub fn rate_text(store: &dyn RateStore, currency_id: &str) -> Result<String> {
        let rate = Self::get_rate(store, currency_id)?;
        Ok(presentation::format_rate(&rate))
    }
}
