//! Supported currency set
//!
//! Every user-supplied coin name is validated by membership in this list.
//! Identifiers are CoinGecko coin ids.

pub const SUPPORTED_COINS: [&str; 20] = [
    "bitcoin",
    "ethereum",
    "tether",
    "binancecoin",
    "solana",
    "usd-coin",
    "ripple",
    "the-open-network",
    "dogecoin",
    "cardano",
    "shiba-inu",
    "avalanche-2",
    "polkadot",
    "tron",
    "chainlink",
    "polygon-pos",
    "bitcoin-cash",
    "litecoin",
    "uniswap",
    "dai",
];

/// Check whether a coin id is in the supported set (exact match)
pub fn is_supported(coin_id: &str) -> bool {
    SUPPORTED_COINS.contains(&coin_id)
}

/// Normalize user input to a coin id (trimmed, lower-case)
pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}
