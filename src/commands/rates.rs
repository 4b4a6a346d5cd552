//! `/rates`, `/rates <coin>` and `/coins`

use super::messages;
use crate::coins::{self, SUPPORTED_COINS};
use crate::db::RateStore;
use crate::error::AppError;
use crate::services::{presentation, RatesService};
use tracing::error;

/// All observed coins, one line each
pub fn all_rates(store: &dyn RateStore) -> String {
    match RatesService::get_rates(store) {
        Ok(rates) => presentation::format_summary(messages::RATES_HEADER, &rates),
        Err(e) => {
            error!(error = %e, "Failed to get rates");
            messages::RATES_FAILED.to_string()
        }
    }
}

/// Detailed block for one coin
pub fn single_rate(store: &dyn RateStore, raw_id: &str) -> String {
    let currency_id = coins::normalize(raw_id);
    if !coins::is_supported(&currency_id) {
        return messages::CURRENCY_NOT_FOUND.to_string();
    }

    match RatesService::get_rate(store, &currency_id) {
        Ok(rate) => presentation::format_rate_detail(&rate),
        Err(AppError::NotFound(_)) => messages::no_data_yet(&currency_id),
        Err(e) => {
            error!(currency = %currency_id, error = %e, "Failed to get rate");
            messages::RATES_FAILED.to_string()
        }
    }
}

pub fn coin_list() -> String {
    format!("{}\n{}", messages::COINS_HEADER, SUPPORTED_COINS.join("\n"))
}
