use tracing::{debug, info};

use crate::error::Result;
use crate::types::{ListingRecord, UpsertOutcome};

/// Persists listings keyed by `source_id` and records every price it sees
/// into `price_history`.
#[derive(Clone)]
pub struct CatalogWriter {
    pool: sqlx::SqlitePool,
}

impl CatalogWriter {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert_listing(&self, record: &ListingRecord) -> Result<UpsertOutcome> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<(Option<f64>,)> =
            sqlx::query_as("SELECT price_usd FROM watch_listings WHERE source_id = ?")
                .bind(&record.source_id)
                .fetch_optional(&mut *tx)
                .await?;

        let c = &record.candidate;
        let outcome = match existing {
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO watch_listings (
                        source, source_id, source_type, url, title, seller_name, dealer_group,
                        brand, model, reference_number, comparison_key,
                        variation_tag, variation_label, dial_type,
                        special_edition, material, dial_color,
                        condition, bracelet_condition, case_condition,
                        has_box, has_papers, complete_set, includes_label, serial, year,
                        price_usd, original_currency, original_price,
                        confidence, raw_source, first_seen_at, last_seen_at
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&record.source)
                .bind(&record.source_id)
                .bind(record.source_type.to_string())
                .bind(&record.url)
                .bind(&record.title)
                .bind(&record.seller_name)
                .bind(&record.dealer_group)
                .bind(&c.brand)
                .bind(&c.model)
                .bind(&c.reference_number)
                .bind(&c.comparison_key)
                .bind(c.variation_tag.map(|t| t.to_string()))
                .bind(&c.variation_label)
                .bind(&c.dial_type)
                .bind(&c.special_edition)
                .bind(&c.material)
                .bind(&c.dial_color)
                .bind(&c.condition)
                .bind(&c.bracelet_condition)
                .bind(&c.case_condition)
                .bind(c.accessories.has_box)
                .bind(c.accessories.has_papers)
                .bind(c.accessories.complete_set)
                .bind(c.includes_label)
                .bind(&c.serial)
                .bind(c.year.map(i64::from))
                .bind(c.price_usd)
                .bind(&record.original_currency)
                .bind(record.original_price)
                .bind(c.confidence)
                .bind(&c.raw_source)
                .bind(record.observed_at_ns)
                .bind(record.observed_at_ns)
                .execute(&mut *tx)
                .await?;

                if let Some(price) = c.price_usd {
                    insert_history(&mut tx, record, price, None).await?;
                }
                debug!(source_id = %record.source_id, key = ?c.comparison_key, "new listing");
                UpsertOutcome::New
            }
            Some((previous,)) => {
                sqlx::query(
                    r#"
                    UPDATE watch_listings SET
                        title = ?, seller_name = ?, brand = ?, model = ?,
                        reference_number = ?, comparison_key = ?,
                        variation_tag = ?, variation_label = ?, dial_type = ?,
                        special_edition = ?, material = ?, dial_color = ?,
                        condition = ?, bracelet_condition = ?, case_condition = ?,
                        has_box = ?, has_papers = ?, complete_set = ?, includes_label = ?,
                        serial = ?, year = ?,
                        price_usd = ?, original_currency = ?, original_price = ?,
                        confidence = ?, last_seen_at = ?
                    WHERE source_id = ?
                    "#,
                )
                .bind(&record.title)
                .bind(&record.seller_name)
                .bind(&c.brand)
                .bind(&c.model)
                .bind(&c.reference_number)
                .bind(&c.comparison_key)
                .bind(c.variation_tag.map(|t| t.to_string()))
                .bind(&c.variation_label)
                .bind(&c.dial_type)
                .bind(&c.special_edition)
                .bind(&c.material)
                .bind(&c.dial_color)
                .bind(&c.condition)
                .bind(&c.bracelet_condition)
                .bind(&c.case_condition)
                .bind(c.accessories.has_box)
                .bind(c.accessories.has_papers)
                .bind(c.accessories.complete_set)
                .bind(c.includes_label)
                .bind(&c.serial)
                .bind(c.year.map(i64::from))
                .bind(c.price_usd)
                .bind(&record.original_currency)
                .bind(record.original_price)
                .bind(c.confidence)
                .bind(record.observed_at_ns)
                .bind(&record.source_id)
                .execute(&mut *tx)
                .await?;

                match (previous, c.price_usd) {
                    (Some(previous), Some(current)) if previous != current => {
                        insert_history(&mut tx, record, current, Some(previous)).await?;
                        info!(
                            source_id = %record.source_id,
                            key = ?c.comparison_key,
                            "price change: ${previous:.0} -> ${current:.0}"
                        );
                        UpsertOutcome::PriceChange { previous, current }
                    }
                    (None, Some(current)) => {
                        insert_history(&mut tx, record, current, None).await?;
                        UpsertOutcome::Unchanged
                    }
                    _ => UpsertOutcome::Unchanged,
                }
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }
}

async fn insert_history(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    record: &ListingRecord,
    price: f64,
    previous: Option<f64>,
) -> Result<()> {
    let change = previous.map(|p| price - p);
    let change_pct = previous.filter(|p| *p > 0.0).map(|p| (price - p) / p * 100.0);

    sqlx::query(
        r#"
        INSERT INTO price_history (
            source_id, comparison_key, price_usd, previous_price,
            price_change, price_change_pct, recorded_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.source_id)
    .bind(&record.candidate.comparison_key)
    .bind(price)
    .bind(previous)
    .bind(change)
    .bind(change_pct)
    .bind(record.observed_at_ns)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{fixtures::record, memory_pool};
    use crate::types::SourceType;

    #[tokio::test]
    async fn insert_then_refresh_then_price_change() {
        let pool = memory_pool().await;
        let writer = CatalogWriter::new(pool.clone());

        let first = record("wa-1", SourceType::Wholesale, "Sub 16610 full set $9500", 1_000);
        assert_eq!(writer.upsert_listing(&first).await.unwrap(), UpsertOutcome::New);
        assert_eq!(writer.upsert_listing(&first).await.unwrap(), UpsertOutcome::Unchanged);

        let cheaper = record("wa-1", SourceType::Wholesale, "Sub 16610 full set $9000", 2_000);
        assert_eq!(
            writer.upsert_listing(&cheaper).await.unwrap(),
            UpsertOutcome::PriceChange { previous: 9500.0, current: 9000.0 }
        );

        let (listings,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM watch_listings")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(listings, 1);

        let history: Vec<(f64, Option<f64>, Option<f64>)> = sqlx::query_as(
            "SELECT price_usd, previous_price, price_change_pct FROM price_history ORDER BY recorded_at",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], (9500.0, None, None));
        assert_eq!(history[1].0, 9000.0);
        assert_eq!(history[1].1, Some(9500.0));
        let pct = history[1].2.unwrap();
        assert!((pct - (-500.0 / 9500.0 * 100.0)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn priceless_listing_has_no_history() {
        let pool = memory_pool().await;
        let writer = CatalogWriter::new(pool.clone());

        let listing = record("r-1", SourceType::Retail, "Rolex Submariner 16610 black dial", 1_000);
        assert_eq!(listing.candidate.price_usd, None);
        assert_eq!(writer.upsert_listing(&listing).await.unwrap(), UpsertOutcome::New);

        let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM price_history")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 0);
    }
}
