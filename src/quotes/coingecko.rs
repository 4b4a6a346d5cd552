//! CoinGecko `simple/price` client

use super::PriceSource;
use crate::config::CoinGeckoCfg;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

const VS_CURRENCY: &str = "usd";

/// `{"bitcoin": {"usd": 65000.0}, ...}`
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CoinGeckoClient {
    pub fn new(cfg: &CoinGeckoCfg) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
        })
    }

    fn price_url(&self, ids: &[&str]) -> String {
        let mut url = format!(
            "{}/simple/price?ids={}&vs_currencies={}",
            self.base_url,
            ids.join(","),
            VS_CURRENCY
        );
        if !self.api_key.is_empty() {
            url.push_str("&x_cg_demo_api_key=");
            url.push_str(&self.api_key);
        }
        url
    }
}

/// Flatten the nested response, dropping coins without a USD quote
fn parse_prices(body: SimplePriceResponse) -> HashMap<String, f64> {
    body.into_iter()
        .filter_map(|(coin, quotes)| match quotes.get(VS_CURRENCY) {
            Some(price) => Some((coin, *price)),
            None => {
                tracing::warn!(coin = %coin, "Price not found for coin");
                None
            }
        })
        .collect()
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    fn name(&self) -> &'static str {
        "coingecko"
    }

    async fn fetch_prices(&self, ids: &[&str]) -> Result<HashMap<String, f64>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        // The query string carries the API key
        let response = self
            .client
            .get(self.price_url(ids))
            .send()
            .await
            .map_err(|e| AppError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "coingecko returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let body: SimplePriceResponse = response
            .json()
            .await
            .map_err(|e| AppError::Http(e.without_url()))?;
        Ok(parse_prices(body))
    }
}
