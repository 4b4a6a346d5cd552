//! Currency rate persistence

use crate::db::models::CurrencyRate;
use crate::error::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

const RATE_COLUMNS: &str = "currency_id, current_price, min_price, max_price, change_percent,
    hour_min_price, hour_max_price, time_stamp, date";

fn map_rate(row: &Row<'_>) -> rusqlite::Result<CurrencyRate> {
    Ok(CurrencyRate {
        currency_id: row.get(0)?,
        current_price: row.get(1)?,
        min_price: row.get(2)?,
        max_price: row.get(3)?,
        change_percent: row.get(4)?,
        hour_min_price: row.get(5)?,
        hour_max_price: row.get(6)?,
        time_stamp: row.get(7)?,
        date: row.get(8)?,
    })
}

/// Get the stored row for a coin
pub fn get_rate(conn: &Connection, currency_id: &str) -> Result<Option<CurrencyRate>> {
    let rate = conn
        .query_row(
            &format!("SELECT {} FROM currencies WHERE currency_id = ?1", RATE_COLUMNS),
            [currency_id],
            map_rate,
        )
        .optional()?;
    Ok(rate)
}

/// Get every stored row, ordered by currency id
pub fn get_rates(conn: &Connection) -> Result<Vec<CurrencyRate>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM currencies ORDER BY currency_id",
        RATE_COLUMNS
    ))?;
    let rows = stmt.query_map([], map_rate)?;
    let rates = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rates)
}

/// Insert or merge a computed row.
///
/// Day extrema merge only when the stored `date` matches, hour extrema only
/// when the stored `time_stamp` matches; otherwise the incoming window wins.
pub fn upsert_rate(conn: &Connection, rate: &CurrencyRate) -> Result<()> {
    conn.execute(
        "INSERT INTO currencies (
            currency_id, current_price, min_price, max_price, change_percent,
            hour_min_price, hour_max_price, time_stamp, date
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT (currency_id) DO UPDATE SET
            current_price = excluded.current_price,
            min_price = CASE WHEN currencies.date = excluded.date
                THEN MIN(currencies.min_price, excluded.min_price)
                ELSE excluded.min_price END,
            max_price = CASE WHEN currencies.date = excluded.date
                THEN MAX(currencies.max_price, excluded.max_price)
                ELSE excluded.max_price END,
            change_percent = excluded.change_percent,
            hour_min_price = CASE WHEN currencies.time_stamp = excluded.time_stamp
                THEN MIN(currencies.hour_min_price, excluded.hour_min_price)
                ELSE excluded.hour_min_price END,
            hour_max_price = CASE WHEN currencies.time_stamp = excluded.time_stamp
                THEN MAX(currencies.hour_max_price, excluded.hour_max_price)
                ELSE excluded.hour_max_price END,
            time_stamp = excluded.time_stamp,
            date = excluded.date",
        params![
            rate.currency_id,
            rate.current_price,
            rate.min_price,
            rate.max_price,
            rate.change_percent,
            rate.hour_min_price,
            rate.hour_max_price,
            rate.time_stamp,
            rate.date,
        ],
    )?;
    Ok(())
}
