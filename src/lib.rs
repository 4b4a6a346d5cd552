//! Currency Hub - cryptocurrency price tracker
//!
//! Polls CoinGecko for spot prices, keeps per-coin day and hour statistics
//! in SQLite, and serves them over a plain-text HTTP API and a Telegram bot
//! with optional periodic auto-updates.

pub mod coins;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod quotes;
pub mod scheduler;
pub mod server;
pub mod services;
pub mod state;
pub mod telegram;

use commands::CommandHandler;
use config::Config;
use error::{AppError, Result};
use scheduler::{NotificationScheduler, PriceFetcher};
use server::ApiServer;
use state::AppState;
use std::time::Duration;
use telegram::BotListener;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Wait for `tasks` in turn, giving up once `deadline` passes
async fn join_until(tasks: Vec<JoinHandle<()>>, deadline: Instant) -> Result<()> {
    let joined = tokio::time::timeout_at(deadline, async {
        for task in tasks {
            if let Err(e) = task.await {
                error!("Background task failed: {}", e);
            }
        }
    })
    .await;

    joined.map_err(|_| {
        AppError::Shutdown("background tasks did not stop before the shutdown deadline".to_string())
    })
}

/// Load config, start every task and run until a shutdown signal
pub async fn run() -> Result<()> {
    let config = Config::load()?;
    let _log_guard = logging::init(&config.logging)?;

    info!("Starting Currency Hub...");

    let state = AppState::init(config).await?;
    let cfg = &state.config;
    let cancel = CancellationToken::new();

    let server = ApiServer::bind(&cfg.bind_addr(), state.api_state(), cfg.shutdown_timeout()).await?;

    let fetcher = PriceFetcher::new(state.prices.clone(), state.sqlite.clone(), cfg.fetch_interval());

    let notifier = NotificationScheduler::new(
        state.sqlite.clone(),
        state.sqlite.clone(),
        state.telegram.clone(),
        Duration::from_secs(cfg.notifier.tick_secs),
    );

    let handler = CommandHandler::new(
        state.sqlite.clone(),
        state.sqlite.clone(),
        cfg.notifier.default_interval_minutes,
    );
    let bot = BotListener::new(state.telegram.clone(), state.telegram.clone(), handler);

    let mut server_task = tokio::spawn(server.run(cancel.clone()));
    let background = vec![
        tokio::spawn(fetcher.run(cancel.clone())),
        tokio::spawn(notifier.run(cancel.clone())),
        tokio::spawn(bot.run(cancel.clone())),
    ];

    info!("Currency Hub started");

    let early_exit = tokio::select! {
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
            None
        }
        result = &mut server_task => Some(result),
    };

    cancel.cancel();
    let deadline = Instant::now() + cfg.shutdown_timeout();

    let server_result = match early_exit {
        Some(result) => result,
        None => match tokio::time::timeout_at(deadline, server_task).await {
            Ok(result) => result,
            Err(_) => Ok(Err(AppError::Shutdown(format!(
                "API server did not stop within {:?}",
                cfg.shutdown_timeout()
            )))),
        },
    };
    let server_result = server_result
        .map_err(|e| AppError::Internal(format!("API server task failed: {}", e)))
        .and_then(|r| r);

    let drained = join_until(background, deadline).await;

    let pool = state.sqlite.pool_state();
    info!(
        connections = pool.connections,
        idle = pool.idle_connections,
        "Closing storage"
    );

    server_result?;
    drained?;

    info!("Currency Hub stopped");
    Ok(())
}
