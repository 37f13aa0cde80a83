//! Read-side aggregates over the catalog, grouped by comparison key.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::analytics::{median, price_trend_of};
use crate::classifier::normalize_reference;
use crate::db::models::{
    DualMarketRow, KeyStatsRow, ListingRow, MarketAnalyticsRow, PricePointRow, LISTING_COLUMNS,
};
use crate::error::{AppError, Result};
use crate::types::TrendDirection;

const NS_PER_DAY: i64 = 86_400 * 1_000_000_000;

// ---------------------------------------------------------------------------
// Result shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonStats {
    #[serde(flatten)]
    pub stats: KeyStatsRow,
    /// (max - min) / min, percent.
    pub spread_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArbitrageOpportunity {
    pub comparison_key: String,
    pub listing_count: i64,
    pub buy: ListingRow,
    pub sell_comp: ListingRow,
    pub profit: f64,
    pub profit_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BestDeal {
    pub listing: ListingRow,
    pub key_avg_price: f64,
    pub savings: f64,
    pub discount_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DualMarketOpportunity {
    #[serde(flatten)]
    pub markets: DualMarketRow,
    pub potential_profit: f64,
    pub margin_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceTrend {
    pub comparison_key: String,
    pub days: i64,
    pub points: usize,
    pub change_pct: f64,
    pub direction: TrendDirection,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingVsMedian {
    #[serde(flatten)]
    pub listing: ListingRow,
    pub deviation_from_median: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferenceDetails {
    pub reference: String,
    pub listing_count: usize,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub avg_price: Option<f64>,
    pub median_price: Option<f64>,
    pub listings: Vec<ListingVsMedian>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

pub async fn list_listings(pool: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<ListingRow>> {
    let sql = format!(
        "SELECT {LISTING_COLUMNS} FROM watch_listings ORDER BY last_seen_at DESC, id DESC LIMIT ? OFFSET ?"
    );
    Ok(sqlx::query_as(&sql).bind(limit).bind(offset).fetch_all(pool).await?)
}

/// Count/min/max/avg of priced listings for every key with at least `min_count` listings.
pub async fn key_stats(pool: &SqlitePool, min_count: i64) -> Result<Vec<KeyStatsRow>> {
    Ok(sqlx::query_as(
        r#"
        SELECT comparison_key,
               COUNT(*)       AS listing_count,
               MIN(price_usd) AS min_price,
               MAX(price_usd) AS max_price,
               AVG(price_usd) AS avg_price
        FROM watch_listings
        WHERE price_usd IS NOT NULL AND comparison_key IS NOT NULL
        GROUP BY comparison_key
        HAVING COUNT(*) >= ?
        ORDER BY listing_count DESC, comparison_key
        "#,
    )
    .bind(min_count)
    .fetch_all(pool)
    .await?)
}

pub async fn comparison_stats(pool: &SqlitePool, min_count: i64) -> Result<Vec<ComparisonStats>> {
    Ok(key_stats(pool, min_count)
        .await?
        .into_iter()
        .map(|stats| {
            let spread_pct = pct_of(stats.max_price - stats.min_price, stats.min_price);
            ComparisonStats { stats, spread_pct }
        })
        .collect())
}

/// Keys whose cheapest and dearest listings differ by more than `min_spread` USD.
pub async fn arbitrage_opportunities(
    pool: &SqlitePool,
    min_spread: f64,
    limit: i64,
) -> Result<Vec<ArbitrageOpportunity>> {
    let mut keys: Vec<KeyStatsRow> = key_stats(pool, 2)
        .await?
        .into_iter()
        .filter(|k| k.max_price - k.min_price > min_spread)
        .collect();
    keys.sort_by(|a, b| (b.max_price - b.min_price).total_cmp(&(a.max_price - a.min_price)));
    keys.truncate(usize::try_from(limit).unwrap_or(0));

    let mut out = Vec::with_capacity(keys.len());
    for key in keys {
        let buy = extreme_listing(pool, &key.comparison_key, "ASC").await?;
        let sell_comp = extreme_listing(pool, &key.comparison_key, "DESC").await?;
        let profit = key.max_price - key.min_price;
        out.push(ArbitrageOpportunity {
            profit_pct: pct_of(profit, key.min_price),
            profit,
            listing_count: key.listing_count,
            comparison_key: key.comparison_key,
            buy,
            sell_comp,
        });
    }
    Ok(out)
}

async fn extreme_listing(pool: &SqlitePool, key: &str, order: &str) -> Result<ListingRow> {
    let sql = format!(
        "SELECT {LISTING_COLUMNS} FROM watch_listings \
         WHERE comparison_key = ? AND price_usd IS NOT NULL \
         ORDER BY price_usd {order}, id ASC LIMIT 1"
    );
    Ok(sqlx::query_as(&sql).bind(key).fetch_one(pool).await?)
}

/// Listings priced under `discount_ratio` x their key average. Only keys
/// with at least three listings and a $500 range qualify; at most two deals
/// per key, best discount first.
pub async fn best_deals(pool: &SqlitePool, discount_ratio: f64, limit: i64) -> Result<Vec<BestDeal>> {
    let keys = key_stats(pool, 3).await?;
    let sql = format!(
        "SELECT {LISTING_COLUMNS} FROM watch_listings \
         WHERE comparison_key = ? AND price_usd IS NOT NULL AND price_usd < ? \
         ORDER BY price_usd ASC, id ASC LIMIT 2"
    );

    let mut deals = Vec::new();
    for key in keys.iter().filter(|k| k.max_price - k.min_price >= 500.0) {
        let rows: Vec<ListingRow> = sqlx::query_as(&sql)
            .bind(&key.comparison_key)
            .bind(key.avg_price * discount_ratio)
            .fetch_all(pool)
            .await?;
        for listing in rows {
            let price = listing.price_usd.unwrap_or(key.avg_price);
            let savings = key.avg_price - price;
            deals.push(BestDeal {
                discount_pct: pct_of(savings, key.avg_price),
                savings,
                key_avg_price: key.avg_price,
                listing,
            });
        }
    }

    deals.sort_by(|a, b| b.discount_pct.total_cmp(&a.discount_pct));
    deals.truncate(usize::try_from(limit).unwrap_or(0));
    Ok(deals)
}

/// Keys listed both wholesale and retail, largest retail premium first.
pub async fn dual_market(pool: &SqlitePool, limit: i64) -> Result<Vec<DualMarketOpportunity>> {
    let rows: Vec<DualMarketRow> = sqlx::query_as(
        r#"
        SELECT comparison_key,
               AVG(CASE WHEN source_type = 'wholesale' THEN price_usd END) AS wholesale_avg,
               SUM(CASE WHEN source_type = 'wholesale' THEN 1 ELSE 0 END)  AS wholesale_count,
               AVG(CASE WHEN source_type = 'retail' THEN price_usd END)    AS retail_avg,
               SUM(CASE WHEN source_type = 'retail' THEN 1 ELSE 0 END)     AS retail_count
        FROM watch_listings
        WHERE price_usd IS NOT NULL AND comparison_key IS NOT NULL
        GROUP BY comparison_key
        HAVING wholesale_count > 0 AND retail_count > 0
        ORDER BY (retail_avg - wholesale_avg) DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|markets| {
            let potential_profit = markets.retail_avg - markets.wholesale_avg;
            DualMarketOpportunity {
                margin_pct: pct_of(potential_profit, markets.wholesale_avg),
                potential_profit,
                markets,
            }
        })
        .collect())
}

/// Recorded prices for a key over the last `days`, oldest first.
pub async fn price_history(
    pool: &SqlitePool,
    key: &str,
    days: i64,
    now_ns: i64,
) -> Result<Vec<PricePointRow>> {
    let since = now_ns.saturating_sub(days.saturating_mul(NS_PER_DAY));
    Ok(sqlx::query_as(
        r#"
        SELECT source_id, price_usd, previous_price, price_change_pct, recorded_at
        FROM price_history
        WHERE comparison_key = ? AND recorded_at >= ?
        ORDER BY recorded_at ASC, id ASC
        "#,
    )
    .bind(key)
    .bind(since)
    .fetch_all(pool)
    .await?)
}

pub async fn price_trend(pool: &SqlitePool, key: &str, days: i64, now_ns: i64) -> Result<PriceTrend> {
    let points = price_history(pool, key, days, now_ns).await?;
    let prices: Vec<f64> = points.iter().map(|p| p.price_usd).collect();
    let (change_pct, direction) = price_trend_of(&prices);
    Ok(PriceTrend {
        comparison_key: key.to_string(),
        days,
        points: prices.len(),
        change_pct,
        direction,
    })
}

/// Every listing of a reference across its variations, with each price's
/// deviation from the reference median.
pub async fn reference_details(pool: &SqlitePool, reference: &str) -> Result<ReferenceDetails> {
    let normalized = normalize_reference(reference);
    let sql = format!(
        "SELECT {LISTING_COLUMNS} FROM watch_listings \
         WHERE comparison_key LIKE ? || '-%' \
         ORDER BY price_usd ASC, id ASC"
    );
    let rows: Vec<ListingRow> = sqlx::query_as(&sql).bind(&normalized).fetch_all(pool).await?;
    if rows.is_empty() {
        return Err(AppError::NotFound(format!("no listings for reference {reference}")));
    }

    let prices: Vec<f64> = rows.iter().filter_map(|r| r.price_usd).collect();
    let median_price = median(&prices);
    let listings = rows
        .into_iter()
        .map(|listing| ListingVsMedian {
            deviation_from_median: listing.price_usd.zip(median_price).map(|(p, m)| p - m),
            listing,
        })
        .collect();

    Ok(ReferenceDetails {
        reference: normalized,
        listing_count: prices.len(),
        min_price: prices.iter().copied().reduce(f64::min),
        max_price: prices.iter().copied().reduce(f64::max),
        avg_price: (!prices.is_empty()).then(|| prices.iter().sum::<f64>() / prices.len() as f64),
        median_price,
        listings,
    })
}

pub async fn market_analytics(pool: &SqlitePool) -> Result<Vec<MarketAnalyticsRow>> {
    Ok(sqlx::query_as(
        r#"
        SELECT comparison_key, listing_count, min_price, max_price, avg_price, median_price,
               trend_7d_pct, trend_30d_pct, last_updated
        FROM market_analytics
        ORDER BY listing_count DESC, comparison_key
        "#,
    )
    .fetch_all(pool)
    .await?)
}

fn pct_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{fixtures::record, memory_pool, CatalogWriter};
    use crate::types::SourceType;

    async fn seeded() -> SqlitePool {
        let pool = memory_pool().await;
        let writer = CatalogWriter::new(pool.clone());
        let listings = [
            ("wa-1", SourceType::Wholesale, "Sub 16610 black dial $9000", 1_000),
            ("wa-2", SourceType::Wholesale, "Sub 16610 full set $9500", 2_000),
            ("r-1", SourceType::Retail, "Rolex Submariner 16610 $12000", 3_000),
            ("r-2", SourceType::Retail, "Rolex Submariner 16610 $11500", 4_000),
            ("wa-3", SourceType::Wholesale, "Sub 1680 tiffany dial $42000", 5_000),
        ];
        for (id, source_type, text, at) in listings {
            writer.upsert_listing(&record(id, source_type, text, at)).await.unwrap();
        }
        pool
    }

    #[tokio::test]
    async fn stats_group_by_key() {
        let pool = seeded().await;
        let stats = comparison_stats(&pool, 2).await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].stats.comparison_key, "16610-standard");
        assert_eq!(stats[0].stats.listing_count, 4);
        assert_eq!(stats[0].stats.min_price, 9000.0);
        assert_eq!(stats[0].stats.max_price, 12000.0);
        assert!((stats[0].spread_pct - 3000.0 / 9000.0 * 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn tiffany_never_compares_with_standard() {
        let pool = seeded().await;
        let all = comparison_stats(&pool, 1).await.unwrap();
        let keys: Vec<_> = all.iter().map(|s| s.stats.comparison_key.as_str()).collect();
        assert!(keys.contains(&"1680-tiffany"));
        assert!(keys.contains(&"16610-standard"));
    }

    #[tokio::test]
    async fn arbitrage_buys_cheapest_sells_dearest() {
        let pool = seeded().await;
        let opps = arbitrage_opportunities(&pool, 1000.0, 10).await.unwrap();
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].buy.source_id, "wa-1");
        assert_eq!(opps[0].sell_comp.source_id, "r-1");
        assert_eq!(opps[0].profit, 3000.0);

        assert!(arbitrage_opportunities(&pool, 5000.0, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn best_deals_below_average() {
        let pool = seeded().await;
        // avg 10500; 0.9 x avg = 9450 -> only the $9000 listing qualifies
        let deals = best_deals(&pool, 0.9, 10).await.unwrap();
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].listing.source_id, "wa-1");
        assert_eq!(deals[0].savings, 1500.0);
    }

    #[tokio::test]
    async fn dual_market_compares_wholesale_with_retail() {
        let pool = seeded().await;
        let dual = dual_market(&pool, 10).await.unwrap();
        assert_eq!(dual.len(), 1);
        assert_eq!(dual[0].markets.comparison_key, "16610-standard");
        assert_eq!(dual[0].markets.wholesale_avg, 9250.0);
        assert_eq!(dual[0].markets.retail_avg, 11750.0);
        assert_eq!(dual[0].potential_profit, 2500.0);
    }

    #[tokio::test]
    async fn reference_details_span_variations() {
        let pool = seeded().await;
        let details = reference_details(&pool, "16610").await.unwrap();
        assert_eq!(details.listing_count, 4);
        assert_eq!(details.median_price, Some(10500.0));
        assert_eq!(details.listings[0].deviation_from_median, Some(-1500.0));

        let missing = reference_details(&pool, "5513").await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn trend_needs_history() {
        let pool = seeded().await;
        let trend = price_trend(&pool, "16610-standard", 30, 10_000).await.unwrap();
        assert_eq!(trend.points, 4);
        // (9000, 9500) vs (12000, 11500): +27.0 %
        assert_eq!(trend.direction, TrendDirection::Up);

        let sparse = price_trend(&pool, "1680-tiffany", 30, 10_000).await.unwrap();
        assert_eq!(sparse.change_pct, 0.0);
        assert_eq!(sparse.direction, TrendDirection::Stable);
    }

    #[tokio::test]
    async fn huge_day_window_covers_everything() {
        let pool = seeded().await;
        let trend = price_trend(&pool, "16610-standard", 200_000, 10_000).await.unwrap();
        assert_eq!(trend.points, 4);
        let history = price_history(&pool, "16610-standard", i64::MAX, 10_000).await.unwrap();
        assert_eq!(history.len(), 4);
    }
}
