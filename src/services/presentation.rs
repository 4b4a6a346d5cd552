//! Text rendering for rates, shared by the HTTP API and the chat bot

use crate::db::models::{CurrencyRate, Trend};

/// Separator between records in the HTTP "all rates" body
pub const RECORD_SEPARATOR: &str = "\r\n\r\n";

/// Fixed-format block used by both HTTP rate endpoints
pub fn format_rate(rate: &CurrencyRate) -> String {
    format!(
        "CurrencyID: {}\r\nCurrentPrice: {:.2}\r\nMinPrice: {:.2}\r\nMaxPrice: {:.2}\r\nChangePercent: {:.2}%",
        rate.currency_id, rate.current_price, rate.min_price, rate.max_price, rate.change_percent
    )
}

pub fn format_rates(rates: &[CurrencyRate]) -> String {
    rates
        .iter()
        .map(format_rate)
        .collect::<Vec<_>>()
        .join(RECORD_SEPARATOR)
}

pub fn trend_emoji(trend: Trend) -> &'static str {
    match trend {
        Trend::Up => "📈",
        Trend::Flat => "➡️",
        Trend::Down => "📉",
    }
}

/// Dense one-line form for chat lists
pub fn format_rate_line(rate: &CurrencyRate) -> String {
    format!(
        "💰 {}: ${:.2} {}({:.2}%)",
        rate.currency_id,
        rate.current_price,
        trend_emoji(rate.trend()),
        rate.change_percent
    )
}

/// Detailed chat block for a single coin
pub fn format_rate_detail(rate: &CurrencyRate) -> String {
    format!(
        "💰 {} rate:\n📊 Current: ${:.2}\n📉 Day min: ${:.2}\n📈 Day max: ${:.2}\n{} Hourly change: {:.2}%",
        rate.currency_id,
        rate.current_price,
        rate.min_price,
        rate.max_price,
        trend_emoji(rate.trend()),
        rate.change_percent
    )
}

/// Header, blank line, then one line per coin
pub fn format_summary(header: &str, rates: &[CurrencyRate]) -> String {
    let mut msg = String::from(header);
    msg.push_str("\n\n");
    for rate in rates {
        msg.push_str(&format_rate_line(rate));
        msg.push('\n');
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn rate(id: &str, price: f64, min: f64, max: f64, change: f64) -> CurrencyRate {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        CurrencyRate {
            currency_id: id.to_string(),
            current_price: price,
            min_price: min,
            max_price: max,
            change_percent: change,
            hour_min_price: min,
            hour_max_price: max,
            time_stamp: now,
            date: now.date_naive(),
        }
    }

    #[test]
    fn test_format_rate() {
        let text = format_rate(&rate("bitcoin", 110.0, 90.0, 110.0, 22.2222));
        assert_eq!(
            text,
            "CurrencyID: bitcoin\r\nCurrentPrice: 110.00\r\nMinPrice: 90.00\r\nMaxPrice: 110.00\r\nChangePercent: 22.22%"
        );
    }

    #[test]
    fn test_format_rates_joins_with_blank_line() {
        let body = format_rates(&[
            rate("bitcoin", 1.0, 1.0, 1.0, 0.0),
            rate("tron", 2.0, 2.0, 2.0, 0.0),
        ]);
        assert_eq!(body.matches(RECORD_SEPARATOR).count(), 1);
        assert!(body.starts_with("CurrencyID: bitcoin\r\n"));
        assert!(body.ends_with("ChangePercent: 0.00%"));
        assert_eq!(format_rates(&[]), "");
    }

    #[test]
    fn test_format_rate_line_trends() {
        assert_eq!(
            format_rate_line(&rate("bitcoin", 110.0, 90.0, 110.0, 22.2222)),
            "💰 bitcoin: $110.00 📈(22.22%)"
        );
        assert_eq!(
            format_rate_line(&rate("tron", 0.5, 0.5, 0.5, 0.0)),
            "💰 tron: $0.50 ➡️(0.00%)"
        );
        assert_eq!(
            format_rate_line(&rate("dai", 1.0, 1.0, 1.0, -0.5)),
            "💰 dai: $1.00 📉(-0.50%)"
        );
    }

    #[test]
    fn test_format_summary() {
        let msg = format_summary("🔔 Auto-update:", &[rate("bitcoin", 100.0, 100.0, 100.0, 0.0)]);
        assert_eq!(msg, "🔔 Auto-update:\n\n💰 bitcoin: $100.00 ➡️(0.00%)\n");
    }

    #[test]
    fn test_format_rate_detail() {
        let msg = format_rate_detail(&rate("ethereum", 3000.0, 2900.0, 3100.0, 1.5));
        assert!(msg.starts_with("💰 ethereum rate:\n📊 Current: $3000.00"));
        assert!(msg.contains("📉 Day min: $2900.00"));
        assert!(msg.contains("📈 Day max: $3100.00"));
        assert!(msg.ends_with("📈 Hourly change: 1.50%"));
    }
}
