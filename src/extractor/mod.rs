//! Free-text listing extraction.
//!
//! A message goes through five stages: prices are pulled out first (so
//! their digits are never read as references), then brand/model/reference
//! mentions, then context attributes around each reference, then prices
//! are paired with watches, and finally each pair is classified into a
//! comparison key.

pub mod context;
pub mod entities;
pub mod matching;
pub mod prices;

use tracing::debug;

use crate::classifier::classify_with;
use crate::config::{confidence, price_band, CONTEXT_RADIUS_CHARS, MIN_MESSAGE_CHARS};
use crate::rules::variation::VariationProfile;
use crate::types::{ExtractMode, WatchListingCandidate};

/// Extract candidates from a wholesale chat message.
pub fn extract(message: &str) -> Vec<WatchListingCandidate> {
    Extractor::new(ExtractMode::Chat).extract(message)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Extractor {
    mode: ExtractMode,
    profile: VariationProfile,
}

impl Extractor {
    pub fn new(mode: ExtractMode) -> Self {
        Self { mode, profile: VariationProfile::Canonical }
    }

    /// Use a source-specific variation table for classification.
    pub fn with_profile(mut self, profile: VariationProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Run all stages over `message`. Never fails; text without a
    /// recognisable watch yields an empty vector.
    pub fn extract(&self, message: &str) -> Vec<WatchListingCandidate> {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        if self.mode == ExtractMode::Chat && trimmed.chars().count() < MIN_MESSAGE_CHARS {
            return Vec::new();
        }

        // Stage A
        let scan = prices::scan_prices(message);

        // Stage B + C
        let mut watches = entities::find_watches(message, &scan);
        for watch in &mut watches {
            let near = context::window(message, watch.ref_span, CONTEXT_RADIUS_CHARS);
            context::enrich(watch, near);
        }
        let watch_count = watches.len();

        // Stage D
        let pairs = matching::pair(watches, &scan.prices, self.mode);

        // Stage E
        let candidates: Vec<WatchListingCandidate> = pairs
            .into_iter()
            .map(|(mut watch, price)| {
                if price.is_some_and(is_plausible) {
                    watch.confidence += confidence::PLAUSIBLE_PRICE_BONUS;
                }

                // With several watches in one message the text around each
                // reference is all that describes it.
                let scope = if watch_count > 1 {
                    context::window(message, watch.ref_span, CONTEXT_RADIUS_CHARS)
                } else {
                    message
                };
                let identity = classify_with(self.profile, &watch.reference, scope);
                let details = context::describe(scope, &watch.reference);

                WatchListingCandidate {
                    brand: Some(watch.brand),
                    model: watch.model,
                    reference_number: Some(watch.reference),
                    price_usd: price,
                    special_edition: watch.special_edition,
                    material: watch.material,
                    dial_color: watch.dial_color,
                    condition: details.condition,
                    bracelet_condition: details.bracelet_condition,
                    case_condition: details.case_condition,
                    accessories: details.accessories,
                    includes_label: details.includes_label,
                    serial: details.serial,
                    year: details.year,
                    variation_tag: Some(identity.variation_tag()),
                    variation_label: identity.variation_label().map(str::to_string),
                    dial_type: identity.dial_type().map(str::to_string),
                    confidence: watch.confidence,
                    comparison_key: Some(identity.comparison_key().to_string()),
                    raw_source: message.to_string(),
                }
            })
            .collect();

        debug!(
            mode = ?self.mode,
            prices = scan.prices.len(),
            watches = watch_count,
            candidates = candidates.len(),
            "extracted listing candidates"
        );
        candidates
    }
}

fn is_plausible(price: f64) -> bool {
    (price_band::PLAUSIBLE_MIN_USD..=price_band::PLAUSIBLE_MAX_USD).contains(&price)
}
