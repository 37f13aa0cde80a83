//! Batch ingestion: chat messages and scraped listings into the catalog.
//!
//! Extraction is CPU-bound and runs data-parallel; writes go through the
//! catalog writer one record at a time in input order.

use std::collections::HashSet;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::chat::DealerMessage;
use crate::classifier::{classify_with, normalize_reference, UNKNOWN_REFERENCE};
use crate::currency::to_usd;
use crate::db::CatalogWriter;
use crate::error::Result;
use crate::extractor::{extract, Extractor};
use crate::rules::variation::VariationProfile;
use crate::types::{ExtractMode, ListingRecord, SourceType, UpsertOutcome, WatchListingCandidate};

pub const CHAT_SOURCE: &str = "whatsapp";

/// A retail listing as handed over by a site scraper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedListing {
    pub source: String,
    pub url: String,
    pub title: String,
    pub price: Option<f64>,
    /// ISO code of `price`; USD when absent.
    pub currency: Option<String>,
    /// Reference number when the site exposes one as a field.
    pub reference_number: Option<String>,
    pub seller_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub messages: usize,
    pub candidates: usize,
    pub new: usize,
    /// Existing listings seen again, including those whose price changed.
    pub updated: usize,
    pub price_changes: usize,
    /// Chat messages without a priced watch, or duplicate scraped listings.
    pub skipped: usize,
}

impl IngestSummary {
    fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::New => self.new += 1,
            UpsertOutcome::Unchanged => self.updated += 1,
            UpsertOutcome::PriceChange { .. } => {
                self.updated += 1;
                self.price_changes += 1;
            }
        }
    }
}

fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Stable id of the `index`-th candidate of a chat message.
pub fn chat_source_id(message: &DealerMessage, index: usize) -> String {
    let digest = sha256_hex(&format!("{}|{}|{}", message.timestamp, message.sender, message.text));
    format!("{}-{index}", &digest[..16])
}

pub fn url_source_id(url: &str) -> String {
    sha256_hex(url.trim())[..16].to_string()
}

fn chat_records(message: &DealerMessage, dealer_group: &str) -> Vec<ListingRecord> {
    let observed_at_ns = message.timestamp.and_utc().timestamp_nanos_opt().unwrap_or(0);
    extract(&message.text)
        .into_iter()
        .filter(|c| c.price_usd.is_some())
        .enumerate()
        .map(|(index, candidate)| ListingRecord {
            source: CHAT_SOURCE.to_string(),
            source_id: chat_source_id(message, index),
            source_type: SourceType::Wholesale,
            url: None,
            title: None,
            seller_name: Some(message.sender.clone()),
            dealer_group: Some(dealer_group.to_string()),
            original_currency: Some("USD".to_string()),
            original_price: candidate.price_usd,
            observed_at_ns,
            candidate,
        })
        .collect()
}

pub async fn ingest_chat(
    writer: &CatalogWriter,
    messages: &[DealerMessage],
    dealer_group: &str,
) -> Result<IngestSummary> {
    let per_message: Vec<Vec<ListingRecord>> = messages
        .par_iter()
        .map(|m| chat_records(m, dealer_group))
        .collect();

    let mut summary = IngestSummary {
        messages: messages.len(),
        ..Default::default()
    };
    for records in per_message {
        if records.is_empty() {
            summary.skipped += 1;
            continue;
        }
        summary.candidates += records.len();
        for record in &records {
            summary.record(writer.upsert_listing(record).await?);
        }
    }

    info!(
        "Chat import: {} messages, {} listings ({} new, {} updated, {} price changes, {} skipped)",
        summary.messages,
        summary.candidates,
        summary.new,
        summary.updated,
        summary.price_changes,
        summary.skipped,
    );
    Ok(summary)
}

/// Build the catalog candidate of one scraped listing. The reference comes
/// from the site field, else from the title, else `unknown`; variations are
/// read from title and URL with the source's own table.
pub fn scraped_candidate(listing: &ScrapedListing) -> WatchListingCandidate {
    let profile = VariationProfile::for_source(&listing.source);
    let extracted = Extractor::new(ExtractMode::Listing)
        .with_profile(profile)
        .extract(&listing.title)
        .into_iter()
        .next();

    let field_reference = listing
        .reference_number
        .clone()
        .filter(|r| !r.trim().is_empty());

    // Title details of a different watch than the site's reference field
    // describe nothing about this listing.
    let extracted = extracted.filter(|c| match (&field_reference, &c.reference_number) {
        (Some(field), Some(found)) => normalize_reference(field) == normalize_reference(found),
        _ => true,
    });

    let raw_source = format!("{} {}", listing.title, listing.url);
    let mut candidate = extracted.unwrap_or_else(|| WatchListingCandidate {
        raw_source: raw_source.clone(),
        ..Default::default()
    });

    if field_reference.is_some() {
        candidate.confidence = candidate.confidence.max(1.0);
    }
    let reference = field_reference
        .or_else(|| candidate.reference_number.clone())
        .unwrap_or_else(|| UNKNOWN_REFERENCE.to_string());

    let identity = classify_with(profile, &reference, &raw_source);
    candidate.reference_number = Some(reference);
    candidate.variation_tag = Some(identity.variation_tag());
    candidate.variation_label = identity.variation_label().map(str::to_string);
    candidate.dial_type = identity.dial_type().map(str::to_string);
    candidate.comparison_key = Some(identity.comparison_key().to_string());
    if let Some(price) = listing.price {
        candidate.price_usd = Some(to_usd(price, listing.currency.as_deref().unwrap_or("USD")));
    }
    candidate.raw_source = raw_source;
    candidate
}

pub async fn ingest_scraped(
    writer: &CatalogWriter,
    listings: &[ScrapedListing],
    observed_at_ns: i64,
) -> Result<IngestSummary> {
    let mut seen = HashSet::new();
    let unique: Vec<&ScrapedListing> = listings
        .iter()
        .filter(|l| seen.insert(url_source_id(&l.url)))
        .collect();

    let records: Vec<ListingRecord> = unique
        .par_iter()
        .map(|listing| ListingRecord {
            source: listing.source.clone(),
            source_id: url_source_id(&listing.url),
            source_type: SourceType::Retail,
            url: Some(listing.url.clone()),
            title: Some(listing.title.clone()),
            seller_name: listing.seller_name.clone(),
            dealer_group: None,
            original_currency: listing.price.map(|_| {
                listing.currency.clone().unwrap_or_else(|| "USD".to_string())
            }),
            original_price: listing.price,
            observed_at_ns,
            candidate: scraped_candidate(listing),
        })
        .collect();

    let mut summary = IngestSummary {
        messages: listings.len(),
        candidates: records.len(),
        skipped: listings.len() - records.len(),
        ..Default::default()
    };
    if summary.skipped > 0 {
        warn!("{} duplicate listings in batch ignored", summary.skipped);
    }
    for record in &records {
        summary.record(writer.upsert_listing(record).await?);
    }

    info!(
        "Scraped import: {} listings ({} new, {} updated, {} price changes)",
        summary.candidates, summary.new, summary.updated, summary.price_changes,
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::parse_export;
    use crate::db::memory_pool;
    use crate::db::queries::list_listings;

    const EXPORT: &str = "\
[7/31/25, 5:20:16 AM] ~ Tony Watches: Sub 1680 $30000, GMT 1675 $18000
[7/31/25, 5:21:02 AM] ~ Tony Watches: good morning everyone
[7/31/25, 5:23:40 AM] ~ Mike: Daytona 116520 white dial full set $28,000 USD + label
";

    fn scraped(url: &str, title: &str, price: Option<f64>, currency: Option<&str>) -> ScrapedListing {
        ScrapedListing {
            source: "bobs_watches".to_string(),
            url: url.to_string(),
            title: title.to_string(),
            price,
            currency: currency.map(str::to_string),
            reference_number: None,
            seller_name: Some("Bob's Watches".to_string()),
        }
    }

    #[test]
    fn source_ids_are_stable() {
        let messages = parse_export(EXPORT);
        assert_eq!(chat_source_id(&messages[0], 0), chat_source_id(&messages[0], 0));
        assert_ne!(chat_source_id(&messages[0], 0), chat_source_id(&messages[0], 1));
        assert_eq!(url_source_id("https://x/1").len(), 16);
    }

    #[tokio::test]
    async fn chat_import_is_idempotent() {
        let pool = memory_pool().await;
        let writer = CatalogWriter::new(pool.clone());
        let messages = parse_export(EXPORT);

        let first = ingest_chat(&writer, &messages, "USA WATCH DEALERS").await.unwrap();
        assert_eq!(first.messages, 3);
        assert_eq!(first.candidates, 3);
        assert_eq!(first.new, 3);
        assert_eq!(first.skipped, 1);

        let again = ingest_chat(&writer, &messages, "USA WATCH DEALERS").await.unwrap();
        assert_eq!(again.new, 0);
        assert_eq!(again.updated, 3);
        assert_eq!(again.price_changes, 0);

        let rows = list_listings(&pool, 10, 0).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.source_type == "wholesale"));
    }

    #[test]
    fn scraped_candidate_uses_url_and_currency() {
        let listing = scraped(
            "https://www.bobswatches.com/rolex-submariner-16610-red-writing.html",
            "Rolex Submariner 16610",
            Some(10_000.0),
            Some("EUR"),
        );
        let c = scraped_candidate(&listing);
        assert_eq!(c.reference_number.as_deref(), Some("16610"));
        assert_eq!(c.comparison_key.as_deref(), Some("16610-red"));
        assert_eq!(c.price_usd, Some(11_000.0));
    }

    #[test]
    fn scraped_candidate_without_reference_is_unknown() {
        let c = scraped_candidate(&scraped("https://x/vintage", "Vintage tropical diver", None, None));
        assert_eq!(c.comparison_key.as_deref(), Some("unknown-tropical"));
        assert_eq!(c.price_usd, None);
    }

    #[test]
    fn scraped_reference_field_overrides_mismatched_title() {
        let mut listing = scraped(
            "https://x/3",
            "Rolex Submariner 1680 Tiffany dial",
            Some(30_000.0),
            None,
        );
        listing.reference_number = Some("16610".to_string());
        let c = scraped_candidate(&listing);
        assert_eq!(c.reference_number.as_deref(), Some("16610"));
        assert_eq!(c.model, None);
        assert_eq!(c.special_edition, None);
        assert_eq!(c.confidence, 1.0);
        assert_eq!(c.price_usd, Some(30_000.0));

        listing.reference_number = Some("1680".to_string());
        let same = scraped_candidate(&listing);
        assert_eq!(same.model.as_deref(), Some("Submariner"));
        assert_eq!(same.special_edition.as_deref(), Some("Tiffany & Co"));
    }

    #[tokio::test]
    async fn scraped_duplicates_keep_first() {
        let pool = memory_pool().await;
        let writer = CatalogWriter::new(pool.clone());
        let batch = vec![
            scraped("https://x/1", "Rolex GMT-Master 16710", Some(15_000.0), None),
            scraped("https://x/1", "Rolex GMT-Master 16710", Some(99_000.0), None),
            scraped("https://x/2", "Rolex Daytona 116500LN", Some(31_000.0), None),
        ];
        let summary = ingest_scraped(&writer, &batch, 1_000).await.unwrap();
        assert_eq!(summary.new, 2);
        assert_eq!(summary.skipped, 1);

        let rows = list_listings(&pool, 10, 0).await.unwrap();
        let gmt = rows.iter().find(|r| r.url.as_deref() == Some("https://x/1")).unwrap();
        assert_eq!(gmt.price_usd, Some(15_000.0));
        assert_eq!(gmt.comparison_key.as_deref(), Some("16710-standard"));
    }

    #[tokio::test]
    async fn repriced_listing_is_a_price_change() {
        let pool = memory_pool().await;
        let writer = CatalogWriter::new(pool.clone());
        let listing = scraped("https://x/1", "Rolex GMT-Master 16710", Some(15_000.0), None);
        ingest_scraped(&writer, &[listing.clone()], 1_000).await.unwrap();

        let repriced = ScrapedListing { price: Some(14_250.0), ..listing };
        let summary = ingest_scraped(&writer, &[repriced], 2_000).await.unwrap();
        assert_eq!(summary.price_changes, 1);
        assert_eq!(summary.updated, 1);
    }
}
