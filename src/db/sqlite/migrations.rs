//! SQLite database migrations

use crate::error::Result;
use rusqlite::Connection;

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    // Create migrations table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    run_migration(conn, "001_currencies", CREATE_CURRENCIES_TABLE)?;
    run_migration(conn, "002_users", CREATE_USERS_TABLE)?;
    run_migration(conn, "003_users_subscribed_index", CREATE_USERS_SUBSCRIBED_INDEX)?;

    tracing::info!("Database migrations completed");
    Ok(())
}

fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
    // Check if migration already applied
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM migrations WHERE name = ?)",
        [name],
        |row| row.get(0),
    )?;

    if !exists {
        tracing::info!("Running migration: {}", name);
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO migrations (name) VALUES (?)", [name])?;
    }

    Ok(())
}

const CREATE_CURRENCIES_TABLE: &str = r#"
CREATE TABLE currencies (
    currency_id TEXT PRIMARY KEY,
    current_price REAL NOT NULL,
    min_price REAL NOT NULL,
    max_price REAL NOT NULL,
    change_percent REAL NOT NULL DEFAULT 0,
    hour_min_price REAL NOT NULL,
    hour_max_price REAL NOT NULL,
    time_stamp TEXT NOT NULL,
    date TEXT NOT NULL
);
"#;

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE users (
    telegram_id INTEGER PRIMARY KEY,
    auto_subscribe INTEGER NOT NULL DEFAULT 0,
    send_interval INTEGER NOT NULL DEFAULT 0
);
"#;

const CREATE_USERS_SUBSCRIBED_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_users_auto_subscribe ON users(auto_subscribe);
"#;
