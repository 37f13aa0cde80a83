pub mod models;
pub mod queries;
pub mod writer;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::Result;

pub use writer::CatalogWriter;

/// Open (creating if needed) the catalog database and apply migrations.
pub async fn connect(db_path: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

/// Single-connection in-memory catalog for tests.
#[cfg(test)]
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

#[cfg(test)]
pub mod fixtures {
    use crate::extractor::Extractor;
    use crate::types::{ExtractMode, ListingRecord, SourceType};

    /// A record built from `text` the same way ingestion builds it.
    pub fn record(source_id: &str, source_type: SourceType, text: &str, observed_at_ns: i64) -> ListingRecord {
        let candidate = Extractor::new(ExtractMode::Listing)
            .extract(text)
            .into_iter()
            .next()
            .unwrap_or_else(|| panic!("fixture text has no watch: {text}"));
        ListingRecord {
            source: match source_type {
                SourceType::Wholesale => "whatsapp".to_string(),
                SourceType::Retail => "bobs_watches".to_string(),
            },
            source_id: source_id.to_string(),
            source_type,
            url: None,
            title: Some(text.to_string()),
            seller_name: Some("Test Dealer".to_string()),
            dealer_group: None,
            original_currency: None,
            original_price: None,
            observed_at_ns,
            candidate,
        }
    }
}
