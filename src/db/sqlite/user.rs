//! User subscription persistence

use crate::db::models::{Subscription, User};
use crate::error::Result;
use rusqlite::{params, Connection, OptionalExtension};

/// Enable auto-updates for a user, creating the row if needed
pub fn set_auto_subscribe(conn: &Connection, telegram_id: i64, interval: u32) -> Result<()> {
    conn.execute(
        "INSERT INTO users (telegram_id, auto_subscribe, send_interval)
         VALUES (?1, 1, ?2)
         ON CONFLICT (telegram_id) DO UPDATE SET
             auto_subscribe = excluded.auto_subscribe,
             send_interval = excluded.send_interval",
        params![telegram_id, interval],
    )?;
    Ok(())
}

/// Disable auto-updates for a user
pub fn disable_auto_subscribe(conn: &Connection, telegram_id: i64) -> Result<()> {
    conn.execute(
        "UPDATE users SET auto_subscribe = 0, send_interval = 0 WHERE telegram_id = ?1",
        [telegram_id],
    )?;
    Ok(())
}

/// Get all subscribed users and their intervals
pub fn get_subscribed_users(conn: &Connection) -> Result<Vec<Subscription>> {
    let mut stmt = conn.prepare(
        "SELECT telegram_id, send_interval FROM users
         WHERE auto_subscribe = 1
         ORDER BY telegram_id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(Subscription {
            user_id: row.get(0)?,
            interval_minutes: row.get(1)?,
        })
    })?;

    let users = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(users)
}

/// Get a single user row
pub fn get_user(conn: &Connection, telegram_id: i64) -> Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT telegram_id, auto_subscribe, send_interval FROM users WHERE telegram_id = ?1",
            [telegram_id],
            |row| {
                Ok(User {
                    telegram_id: row.get(0)?,
                    auto_subscribe: row.get(1)?,
                    send_interval: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}
