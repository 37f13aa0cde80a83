use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::health::{get_health, HealthState};
use crate::classifier::classify;
use crate::db::models::{ListingRow, MarketAnalyticsRow, PricePointRow};
use crate::db::queries::{
    self, ArbitrageOpportunity, BestDeal, ComparisonStats, DualMarketOpportunity, PriceTrend,
    ReferenceDetails,
};
use crate::error::AppError;
use crate::extractor::Extractor;
use crate::types::{ExtractMode, WatchIdentity, WatchListingCandidate};

#[derive(Clone)]
pub struct ApiState {
    pub pool: sqlx::SqlitePool,
    pub health: Arc<HealthState>,
    /// Default `min_spread` for /arbitrage.
    pub arbitrage_min_spread_usd: f64,
    pub deal_discount_ratio: f64,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/listings", get(get_listings))
        .route("/comparison-keys", get(get_comparison_keys))
        .route("/arbitrage", get(get_arbitrage))
        .route("/best-deals", get(get_best_deals))
        .route("/dual-market", get(get_dual_market))
        .route("/references/:reference", get(get_reference))
        .route("/price-history/:key", get(get_price_history))
        .route("/price-trends/:key", get(get_price_trend))
        .route("/analytics", get(get_analytics))
        .route("/extract", post(post_extract))
        .route("/classify", post(post_classify))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query param / body structs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct ComparisonKeysQuery {
    pub min_count: Option<i64>,
}

#[derive(Deserialize)]
pub struct ArbitrageQuery {
    pub min_spread: Option<f64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct DaysQuery {
    pub days: Option<i64>,
}

#[derive(Deserialize)]
pub struct ExtractRequest {
    pub message: String,
    #[serde(default)]
    pub mode: ExtractMode,
}

#[derive(Deserialize)]
pub struct ClassifyRequest {
    pub reference: String,
    #[serde(default)]
    pub text: String,
}

fn positive(value: Option<i64>, default: i64, name: &str) -> Result<i64, AppError> {
    match value {
        None => Ok(default),
        Some(v) if v > 0 => Ok(v),
        Some(v) => Err(AppError::InvalidInput(format!("{name} must be positive, got {v}"))),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_listings(
    State(state): State<ApiState>,
    Query(params): Query<PageQuery>,
) -> Result<Json<Vec<ListingRow>>, AppError> {
    let limit = positive(params.limit, 100, "limit")?;
    let offset = params.offset.unwrap_or(0).max(0);
    Ok(Json(queries::list_listings(&state.pool, limit, offset).await?))
}

async fn get_comparison_keys(
    State(state): State<ApiState>,
    Query(params): Query<ComparisonKeysQuery>,
) -> Result<Json<Vec<ComparisonStats>>, AppError> {
    let min_count = positive(params.min_count, 2, "min_count")?;
    Ok(Json(queries::comparison_stats(&state.pool, min_count).await?))
}

async fn get_arbitrage(
    State(state): State<ApiState>,
    Query(params): Query<ArbitrageQuery>,
) -> Result<Json<Vec<ArbitrageOpportunity>>, AppError> {
    let min_spread = params.min_spread.unwrap_or(state.arbitrage_min_spread_usd);
    let limit = positive(params.limit, 20, "limit")?;
    Ok(Json(
        queries::arbitrage_opportunities(&state.pool, min_spread, limit).await?,
    ))
}

async fn get_best_deals(
    State(state): State<ApiState>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<BestDeal>>, AppError> {
    let limit = positive(params.limit, 20, "limit")?;
    Ok(Json(
        queries::best_deals(&state.pool, state.deal_discount_ratio, limit).await?,
    ))
}

async fn get_dual_market(
    State(state): State<ApiState>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<DualMarketOpportunity>>, AppError> {
    let limit = positive(params.limit, 20, "limit")?;
    Ok(Json(queries::dual_market(&state.pool, limit).await?))
}

async fn get_reference(
    State(state): State<ApiState>,
    Path(reference): Path<String>,
) -> Result<Json<ReferenceDetails>, AppError> {
    Ok(Json(queries::reference_details(&state.pool, &reference).await?))
}

async fn get_price_history(
    State(state): State<ApiState>,
    Path(key): Path<String>,
    Query(params): Query<DaysQuery>,
) -> Result<Json<Vec<PricePointRow>>, AppError> {
    let days = positive(params.days, 30, "days")?;
    Ok(Json(
        queries::price_history(&state.pool, &key, days, crate::now_ns()).await?,
    ))
}

async fn get_price_trend(
    State(state): State<ApiState>,
    Path(key): Path<String>,
    Query(params): Query<DaysQuery>,
) -> Result<Json<PriceTrend>, AppError> {
    let days = positive(params.days, 30, "days")?;
    Ok(Json(
        queries::price_trend(&state.pool, &key, days, crate::now_ns()).await?,
    ))
}

async fn get_analytics(
    State(state): State<ApiState>,
) -> Result<Json<Vec<MarketAnalyticsRow>>, AppError> {
    Ok(Json(queries::market_analytics(&state.pool).await?))
}

/// Stateless: nothing is persisted.
async fn post_extract(
    Json(body): Json<ExtractRequest>,
) -> Json<Vec<WatchListingCandidate>> {
    Json(Extractor::new(body.mode).extract(&body.message))
}

async fn post_classify(
    Json(body): Json<ClassifyRequest>,
) -> Json<WatchIdentity> {
    Json(classify(&body.reference, &body.text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_params() {
        assert_eq!(positive(None, 20, "limit").unwrap(), 20);
        assert_eq!(positive(Some(5), 20, "limit").unwrap(), 5);
        assert!(matches!(positive(Some(0), 20, "limit"), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn extract_request_defaults_to_chat() {
        let req: ExtractRequest = serde_json::from_str(r#"{"message": "Sub 1680 $30000"}"#).unwrap();
        assert_eq!(req.mode, ExtractMode::Chat);
        let req: ExtractRequest =
            serde_json::from_str(r#"{"message": "Sub 1680", "mode": "listing"}"#).unwrap();
        assert_eq!(req.mode, ExtractMode::Listing);
    }

    #[tokio::test]
    async fn classify_handler_returns_identity() {
        let Json(identity) = post_classify(Json(ClassifyRequest {
            reference: "116610LN".to_string(),
            text: "Submariner Hulk green dial".to_string(),
        }))
        .await;
        assert_eq!(identity.comparison_key(), "116610ln-hulk");
    }
}
