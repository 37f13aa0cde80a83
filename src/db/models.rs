//! Database row types for the catalog schema in `migrations/`.
//! Used by sqlx for typed queries.

use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ListingRow {
    pub id: i64,
    pub source: String,
    pub source_id: String,
    pub source_type: String,
    pub url: Option<String>,
    pub title: Option<String>,
    pub seller_name: Option<String>,
    pub dealer_group: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub reference_number: Option<String>,
    pub comparison_key: Option<String>,
    pub variation_tag: Option<String>,
    pub special_edition: Option<String>,
    pub condition: Option<String>,
    pub price_usd: Option<f64>,
    pub confidence: f64,
    pub last_seen_at: i64,
}

/// Columns selected into [`ListingRow`].
pub const LISTING_COLUMNS: &str = "id, source, source_id, source_type, url, title, seller_name, \
     dealer_group, brand, model, reference_number, comparison_key, variation_tag, \
     special_edition, condition, price_usd, confidence, last_seen_at";

/// Per-key price aggregate over priced listings.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct KeyStatsRow {
    pub comparison_key: String,
    pub listing_count: i64,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_price: f64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DualMarketRow {
    pub comparison_key: String,
    pub wholesale_avg: f64,
    pub wholesale_count: i64,
    pub retail_avg: f64,
    pub retail_count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PricePointRow {
    pub source_id: String,
    pub price_usd: f64,
    pub previous_price: Option<f64>,
    pub price_change_pct: Option<f64>,
    pub recorded_at: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MarketAnalyticsRow {
    pub comparison_key: String,
    pub listing_count: i64,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_price: f64,
    pub median_price: f64,
    pub trend_7d_pct: f64,
    pub trend_30d_pct: f64,
    pub last_updated: i64,
}
