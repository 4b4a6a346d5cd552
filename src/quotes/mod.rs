//! Upstream price sources

pub mod coingecko;

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

pub use coingecko::CoinGeckoClient;

/// Anything that can quote USD prices for a batch of coin ids
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Source name, used in logs
    fn name(&self) -> &'static str;

    /// Fetch USD prices for the given ids. Ids the source does not know are
    /// simply absent from the result.
    async fn fetch_prices(&self, ids: &[&str]) -> Result<HashMap<String, f64>>;
}
