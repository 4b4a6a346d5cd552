//! Application state management

use crate::config::Config;
use crate::db::sqlite::{connect_with_retry, SqliteDb};
use crate::error::{AppError, Result};
use crate::quotes::{CoinGeckoClient, PriceSource};
use crate::server::{ApiState, HttpMetrics};
use crate::telegram::TelegramClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Long-lived handles shared by all background tasks
pub struct AppState {
    pub config: Config,

    /// SQLite database (rate and subscription store)
    pub sqlite: Arc<SqliteDb>,

    /// Telegram Bot API client
    pub telegram: Arc<TelegramClient>,

    /// Upstream price source
    pub prices: Arc<dyn PriceSource>,

    /// HTTP request metrics
    pub metrics: Arc<HttpMetrics>,
}

impl AppState {
    /// Connect storage (with retry), run migrations and check the bot token
    pub async fn init(config: Config) -> Result<Self> {
        let db_cfg = &config.database;
        let pool = connect_with_retry(
            &db_cfg.path,
            db_cfg.pool_size,
            db_cfg.connect_attempts,
            Duration::from_secs(db_cfg.connect_backoff_secs),
        )
        .await?;
        let sqlite = Arc::new(SqliteDb::new(pool)?);

        let telegram = Arc::new(TelegramClient::new(&config.telegram)?);
        let me = telegram
            .get_me()
            .await
            .map_err(|e| AppError::Telegram(format!("bot authentication failed: {}", e)))?;
        info!(
            bot = me.username.as_deref().unwrap_or(&me.first_name),
            "Authorized on Telegram"
        );

        let prices: Arc<dyn PriceSource> = Arc::new(CoinGeckoClient::new(&config.coingecko)?);

        Ok(Self {
            config,
            sqlite,
            telegram,
            prices,
            metrics: Arc::new(HttpMetrics::new()),
        })
    }

    pub fn api_state(&self) -> Arc<ApiState> {
        Arc::new(ApiState::new(self.sqlite.clone(), self.metrics.clone()))
    }
}
