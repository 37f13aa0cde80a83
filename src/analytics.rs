use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::api::health::HealthState;
use crate::config::{trend_thresholds, ANALYTICS_INTERVAL_SECS};
use crate::db::queries::price_history;
use crate::error::Result;
use crate::types::TrendDirection;

/// Background task that refreshes `market_analytics` for every comparison
/// key on a fixed interval.
pub struct MarketAnalytics {
    pool: sqlx::SqlitePool,
    health: Arc<HealthState>,
}

impl MarketAnalytics {
    pub fn new(pool: sqlx::SqlitePool, health: Arc<HealthState>) -> Self {
        Self { pool, health }
    }

    pub async fn run(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(ANALYTICS_INTERVAL_SECS));

        loop {
            interval.tick().await;
            let now_ns = crate::now_ns();
            match self.refresh(now_ns).await {
                Ok(keys) => self.health.record_analytics(now_ns, keys),
                Err(e) => error!("Analytics error: {e}"),
            }
        }
    }

    /// Recompute analytics for every key with priced listings. Returns the
    /// number of keys written.
    pub async fn refresh(&self, now_ns: i64) -> Result<usize> {
        let rows: Vec<(String, f64)> = sqlx::query_as(
            r#"
            SELECT comparison_key, price_usd
            FROM watch_listings
            WHERE price_usd IS NOT NULL AND comparison_key IS NOT NULL
            ORDER BY comparison_key
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_key: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for (key, price) in rows {
            by_key.entry(key).or_default().push(price);
        }

        for (key, prices) in &by_key {
            let Some(summary) = summarize(prices) else {
                continue;
            };
            let trend_7d = self.trend_pct(key, 7, now_ns).await?;
            let trend_30d = self.trend_pct(key, 30, now_ns).await?;

            sqlx::query(
                r#"
                INSERT INTO market_analytics (
                    comparison_key, listing_count, min_price, max_price, avg_price,
                    median_price, trend_7d_pct, trend_30d_pct, last_updated
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(comparison_key) DO UPDATE SET
                    listing_count = excluded.listing_count,
                    min_price = excluded.min_price,
                    max_price = excluded.max_price,
                    avg_price = excluded.avg_price,
                    median_price = excluded.median_price,
                    trend_7d_pct = excluded.trend_7d_pct,
                    trend_30d_pct = excluded.trend_30d_pct,
                    last_updated = excluded.last_updated
                "#,
            )
            .bind(key)
            .bind(summary.count as i64)
            .bind(summary.min)
            .bind(summary.max)
            .bind(summary.avg)
            .bind(summary.median)
            .bind(trend_7d)
            .bind(trend_30d)
            .bind(now_ns)
            .execute(&self.pool)
            .await?;
        }

        info!("Analytics updated for {} comparison keys", by_key.len());
        Ok(by_key.len())
    }

    async fn trend_pct(&self, key: &str, days: i64, now_ns: i64) -> Result<f64> {
        let points = price_history(&self.pool, key, days, now_ns).await?;
        let prices: Vec<f64> = points.iter().map(|p| p.price_usd).collect();
        Ok(price_trend_of(&prices).0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub median: f64,
}

pub fn summarize(prices: &[f64]) -> Option<PriceSummary> {
    let median = median(prices)?;
    Some(PriceSummary {
        count: prices.len(),
        min: prices.iter().copied().fold(f64::INFINITY, f64::min),
        max: prices.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        avg: prices.iter().sum::<f64>() / prices.len() as f64,
        median,
    })
}

pub fn median(prices: &[f64]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    let mut sorted = prices.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

/// Percent change of the second-half average over the first-half average of
/// a chronological price series, and its direction. Short series are flat.
pub fn price_trend_of(prices: &[f64]) -> (f64, TrendDirection) {
    if prices.len() < trend_thresholds::MIN_POINTS {
        return (0.0, TrendDirection::Stable);
    }
    let mid = prices.len() / 2;
    let (first, second) = prices.split_at(mid);
    let first_avg = first.iter().sum::<f64>() / first.len() as f64;
    let second_avg = second.iter().sum::<f64>() / second.len() as f64;
    if first_avg <= 0.0 {
        return (0.0, TrendDirection::Stable);
    }

    let change_pct = (second_avg - first_avg) / first_avg * 100.0;
    let direction = if change_pct > trend_thresholds::UP_PCT {
        TrendDirection::Up
    } else if change_pct < trend_thresholds::DOWN_PCT {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    };
    (change_pct, direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{fixtures::record, memory_pool, queries::market_analytics, CatalogWriter};
    use crate::types::SourceType;

    #[test]
    fn median_even_and_odd() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn trend_thresholds_apply() {
        assert_eq!(price_trend_of(&[100.0, 100.0, 103.0]), (0.0, TrendDirection::Stable));
        let (pct, dir) = price_trend_of(&[100.0, 100.0, 103.0, 103.0]);
        assert!((pct - 3.0).abs() < 1e-9);
        assert_eq!(dir, TrendDirection::Up);
        assert_eq!(price_trend_of(&[100.0, 100.0, 101.0, 101.0]).1, TrendDirection::Stable);
        assert_eq!(price_trend_of(&[100.0, 100.0, 90.0, 90.0]).1, TrendDirection::Down);
    }

    #[test]
    fn summary_of_prices() {
        let s = summarize(&[9000.0, 12000.0, 9500.0]).unwrap();
        assert_eq!(s.count, 3);
        assert_eq!(s.min, 9000.0);
        assert_eq!(s.max, 12000.0);
        assert_eq!(s.median, 9500.0);
        assert!(summarize(&[]).is_none());
    }

    #[tokio::test]
    async fn refresh_writes_one_row_per_key() {
        let pool = memory_pool().await;
        let writer = CatalogWriter::new(pool.clone());
        for (id, text, at) in [
            ("a", "Sub 16610 $9000", 1_000),
            ("b", "Sub 16610 $10000", 2_000),
            ("c", "Sub 1680 tiffany dial $42000", 3_000),
        ] {
            writer
                .upsert_listing(&record(id, SourceType::Wholesale, text, at))
                .await
                .unwrap();
        }

        let analytics = MarketAnalytics::new(pool.clone(), Arc::new(HealthState::new(0)));
        assert_eq!(analytics.refresh(10_000).await.unwrap(), 2);
        // idempotent
        assert_eq!(analytics.refresh(20_000).await.unwrap(), 2);

        let rows = market_analytics(&pool).await.unwrap();
        assert_eq!(rows.len(), 2);
        let sub = rows.iter().find(|r| r.comparison_key == "16610-standard").unwrap();
        assert_eq!(sub.listing_count, 2);
        assert_eq!(sub.median_price, 9500.0);
        assert_eq!(sub.last_updated, 20_000);
    }
}
