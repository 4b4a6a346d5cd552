//! `/start_auto [min]` and `/stop_auto`

use super::messages;
use crate::db::SubscriptionStore;
use crate::error::{AppError, Result};
use tracing::{error, info};

/// Positive whole minutes, or the default when no argument was given
pub fn parse_interval(arg: Option<&str>, default_minutes: u32) -> Result<u32> {
    let Some(raw) = arg else {
        return Ok(default_minutes);
    };

    match raw.trim().parse::<u32>() {
        Ok(minutes) if minutes > 0 => Ok(minutes),
        _ => Err(AppError::Validation(format!("invalid interval: {}", raw))),
    }
}

pub fn start_auto(
    store: &dyn SubscriptionStore,
    chat_id: i64,
    arg: Option<&str>,
    default_minutes: u32,
) -> String {
    let minutes = match parse_interval(arg, default_minutes) {
        Ok(minutes) => minutes,
        Err(_) => return messages::INVALID_INTERVAL.to_string(),
    };

    match store.set_auto_subscribe(chat_id, minutes) {
        Ok(()) => {
            info!(chat_id, minutes, "Auto-updates enabled");
            messages::auto_enabled(minutes)
        }
        Err(e) => {
            error!(chat_id, error = %e, "Failed to set auto subscribe");
            messages::SUBSCRIBE_FAILED.to_string()
        }
    }
}

pub fn stop_auto(store: &dyn SubscriptionStore, chat_id: i64) -> String {
    match store.disable_auto_subscribe(chat_id) {
        Ok(()) => {
            info!(chat_id, "Auto-updates disabled");
            messages::AUTO_DISABLED.to_string()
        }
        Err(e) => {
            error!(chat_id, error = %e, "Failed to disable auto subscribe");
            messages::UNSUBSCRIBE_FAILED.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval(None, 10).unwrap(), 10);
        assert_eq!(parse_interval(Some("15"), 10).unwrap(), 15);
        assert!(parse_interval(Some("0"), 10).is_err());
        assert!(parse_interval(Some("-5"), 10).is_err());
        assert!(parse_interval(Some("abc"), 10).is_err());
        assert!(parse_interval(Some("2.5"), 10).is_err());
    }
}
