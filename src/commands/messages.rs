//! Fixed chat texts

pub const WELCOME: &str = "🤖 💰 Welcome to Currency Hub Bot!

📋 Available commands:
/rates - show all rates 📊
/rates [coin] - show the rate of one coin 📈
/coins - list supported coins 🪙
/start_auto [min] - enable auto-updates 🔔
/stop_auto - disable auto-updates 🔕
/help - show this help ❓";

pub const HELP: &str = "🤖 💰 Available commands:

📊 /rates - show all rates
📈 /rates [coin] - show the rate of one coin
🪙 /coins - list supported coins
🔔 /start_auto [min] - enable auto-updates
🔕 /stop_auto - disable auto-updates
❓ /help - show this help";

pub const RATES_HEADER: &str = "📊 Current rates:";
pub const COINS_HEADER: &str = "📋 Supported coins:";
pub const AUTO_UPDATE_HEADER: &str = "🔔 Auto-update:";

pub const CURRENCY_NOT_FOUND: &str = "❌ Currency not found";
pub const RATES_FAILED: &str = "❌ Failed to load rates, try again later";
pub const INVALID_INTERVAL: &str = "❌ Invalid interval. Use a whole number of minutes greater than 0";
pub const SUBSCRIBE_FAILED: &str = "❌ Failed to enable auto-updates";
pub const UNSUBSCRIBE_FAILED: &str = "❌ Failed to disable auto-updates";
pub const AUTO_DISABLED: &str = "🔕 Auto-updates disabled";
pub const UNKNOWN_COMMAND: &str = "❌ Unknown command";

pub fn no_data_yet(currency_id: &str) -> String {
    format!("❌ No data yet for {}", currency_id)
}

pub fn auto_enabled(minutes: u32) -> String {
    format!("🔔 Auto-updates enabled every {} minute(s)", minutes)
}
