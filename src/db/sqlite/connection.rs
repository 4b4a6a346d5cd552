//! SQLite connection pool utilities

use crate::error::{AppError, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use std::time::Duration;

pub type DbPool = Pool<SqliteConnectionManager>;

const POOL_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(2);

const CONNECTION_PRAGMAS: &str =
    "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA busy_timeout=5000;";

/// Create a pooled connection manager for the given database file
pub fn create_pool(path: &Path, max_size: u32) -> Result<DbPool> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let manager =
        SqliteConnectionManager::file(path).with_init(|conn| conn.execute_batch(CONNECTION_PRAGMAS));
    let pool = Pool::builder()
        .max_size(max_size)
        .connection_timeout(POOL_CHECKOUT_TIMEOUT)
        .build(manager)?;
    Ok(pool)
}

/// Single-connection in-memory pool (each in-memory connection is its own database)
pub fn create_memory_pool() -> Result<DbPool> {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager)?;
    Ok(pool)
}

/// Check the pool with a trivial query
pub fn ping(pool: &DbPool) -> Result<()> {
    let conn = pool.get()?;
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
    Ok(())
}

/// Open the pool, retrying a fixed number of times with a fixed backoff
pub async fn connect_with_retry(
    path: &Path,
    max_size: u32,
    attempts: u32,
    backoff: Duration,
) -> Result<DbPool> {
    let mut last_error = None;

    for attempt in 1..=attempts {
        match create_pool(path, max_size).and_then(|pool| ping(&pool).map(|_| pool)) {
            Ok(pool) => {
                tracing::info!(path = %path.display(), attempt, "Connected to database");
                return Ok(pool);
            }
            Err(e) => {
                tracing::warn!(attempt, attempts, error = %e, "Failed to connect to database, retrying...");
                last_error = Some(e);
                if attempt < attempts {
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    Err(AppError::Config(format!(
        "could not connect to database at {} after {} attempts: {}",
        path.display(),
        attempts,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    )))
}
