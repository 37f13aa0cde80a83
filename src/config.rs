use crate::error::{AppError, Result};

pub const DB_PATH: &str = "watchmarket.db";
pub const DEALER_GROUP: &str = "USA WATCH DEALERS";

/// Chat messages shorter than this (after trimming) are never parsed.
pub const MIN_MESSAGE_CHARS: usize = 10;

/// Characters taken on each side of a reference-number match when looking
/// for special editions, materials and dial colours.
pub const CONTEXT_RADIUS_CHARS: usize = 50;

/// Analytics refresh interval (seconds).
pub const ANALYTICS_INTERVAL_SECS: u64 = 300;

/// Sanity band for anything read as a price. Values outside are dropped.
pub mod price_band {
    pub const FLOOR_USD: f64 = 1_000.0;
    pub const CEILING_USD: f64 = 2_000_000.0;

    /// Prices inside this narrower band earn the plausibility bonus.
    pub const PLAUSIBLE_MIN_USD: f64 = 5_000.0;
    pub const PLAUSIBLE_MAX_USD: f64 = 500_000.0;
}

/// Additive confidence contributions. The sum is a ranking score, not a
/// probability, and is never clamped.
pub mod confidence {
    pub const MODEL_QUALIFIED: f64 = 0.9;
    pub const BRAND_QUALIFIED: f64 = 0.7;
    pub const BARE_SIX_DIGIT: f64 = 0.7;
    pub const BARE_FIVE_DIGIT: f64 = 0.6;
    pub const BARE_FOUR_DIGIT: f64 = 0.5;

    pub const SPECIAL_EDITION_BONUS: f64 = 0.2;
    pub const MATERIAL_BONUS: f64 = 0.1;
    pub const DIAL_BONUS: f64 = 0.1;
    pub const PLAUSIBLE_PRICE_BONUS: f64 = 0.1;
}

/// Trend direction thresholds (percent change, second half vs first half).
pub mod trend_thresholds {
    pub const UP_PCT: f64 = 2.0;
    pub const DOWN_PCT: f64 = -2.0;
    /// Fewer points than this report a flat 0% trend.
    pub const MIN_POINTS: usize = 4;
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub db_path: String,
    pub api_port: u16,
    /// Minimum max-min spread in USD for a key to count as an arbitrage (ARBITRAGE_MIN_SPREAD_USD)
    pub arbitrage_min_spread_usd: f64,
    /// A listing is a deal when priced below this fraction of its key average (DEAL_DISCOUNT_RATIO)
    pub deal_discount_ratio: f64,
    /// Label attached to wholesale listings imported from chat exports (DEALER_GROUP)
    pub dealer_group: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| DB_PATH.to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            arbitrage_min_spread_usd: std::env::var("ARBITRAGE_MIN_SPREAD_USD")
                .unwrap_or_else(|_| "1000".to_string())
                .parse::<f64>()
                .unwrap_or(1000.0),
            deal_discount_ratio: std::env::var("DEAL_DISCOUNT_RATIO")
                .unwrap_or_else(|_| "0.9".to_string())
                .parse::<f64>()
                .unwrap_or(0.9),
            dealer_group: std::env::var("DEALER_GROUP")
                .unwrap_or_else(|_| DEALER_GROUP.to_string()),
        })
    }
}
