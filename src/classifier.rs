use tracing::debug;

use crate::rules::first_match;
use crate::rules::variation::VariationProfile;
use crate::types::{VariationTag, WatchIdentity};

pub const UNKNOWN_REFERENCE: &str = "unknown";

/// Resolve the comparison identity of a listing using the canonical variation table.
/// Total function: no input makes it fail; unmatched text yields `standard`.
pub fn classify(reference_number: &str, search_text: &str) -> WatchIdentity {
    classify_with(VariationProfile::Canonical, reference_number, search_text)
}

/// Same as [`classify`] with a source-specific variation table.
pub fn classify_with(
    profile: VariationProfile,
    reference_number: &str,
    search_text: &str,
) -> WatchIdentity {
    let reference = normalize_reference(reference_number);

    match first_match(profile.rules(), search_text) {
        Some(variation) => {
            debug!(
                reference = %reference,
                tag = %variation.tag,
                "variation detected: {}",
                variation.label
            );
            WatchIdentity::new(
                reference,
                variation.tag,
                Some(variation.label.to_string()),
                Some(variation.dial_type.to_string()),
            )
        }
        None => WatchIdentity::new(reference, VariationTag::Standard, None, None),
    }
}

/// Lower-case alphanumeric form of a reference used for keying
/// (`"RM11-03"` → `"rm1103"`). Empty input becomes `"unknown"`.
pub fn normalize_reference(raw: &str) -> String {
    let normalized: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if normalized.is_empty() {
        UNKNOWN_REFERENCE.to_string()
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn named_variation_beats_material() {
        let id = classify("1680", "yellow gold tiffany dial");
        assert_eq!(id.variation_tag(), VariationTag::Tiffany);
        assert_eq!(id.comparison_key(), "1680-tiffany");
        assert_eq!(id.variation_label(), Some("Tiffany & Co"));
        assert_eq!(id.dial_type(), Some("Tiffany"));
    }

    #[test]
    fn plain_steel_is_standard() {
        let id = classify("16220", "stainless steel oyster bracelet");
        assert_eq!(id.variation_tag(), VariationTag::Standard);
        assert_eq!(id.comparison_key(), "16220-standard");
        assert_eq!(id.variation_label(), None);
    }

    #[test]
    fn material_composite_is_single_suffix() {
        let id = classify("18239", "day-date 18239 yellow gold two-tone presidential");
        assert_eq!(id.comparison_key(), "18239-gold");
    }

    #[test]
    fn empty_text_is_standard() {
        assert_eq!(classify("116610LN", "").comparison_key(), "116610ln-standard");
    }

    #[test]
    fn missing_reference_groups_under_unknown() {
        assert_eq!(classify("unknown", "tropical gilt").comparison_key(), "unknown-tropical");
        assert_eq!(classify("", "").comparison_key(), "unknown-standard");
        assert_eq!(classify("--", "hulk").comparison_key(), "unknown-hulk");
    }

    #[test]
    fn url_slug_counts_as_text() {
        let id = classify(
            "16610",
            "rolex submariner 16610 https://www.bobswatches.com/rolex-submariner-16610-red-writing.html",
        );
        assert_eq!(id.variation_tag(), VariationTag::Red);
    }

    #[test]
    fn key_format_holds_for_every_tag() {
        let key_re = Regex::new(r"^[a-z0-9]+-[a-z]+$").unwrap();
        let texts = [
            "",
            "tiffany",
            "tropical",
            "spider dial",
            "sigma",
            "comex",
            "domino's",
            "mil-sub",
            "kermit",
            "hulk",
            "18k gold",
            "two-tone",
            "blue dial",
            "white face",
            "red writing",
            "silver dial",
            "blue bezel",
            "black bezel",
            "slate serti",
            "champagne dial",
        ];
        for reference in ["116610LN", "RM11-03", "311.30.42.30.01.005", "", "5711/1A"] {
            for text in texts {
                let id = classify(reference, text);
                assert!(key_re.is_match(id.comparison_key()), "bad key {}", id.comparison_key());
            }
        }
    }

    #[test]
    fn classification_is_deterministic() {
        let text = "Rolex GMT-Master 1675 tropical gilt dial pepsi";
        assert_eq!(classify("1675", text), classify("1675", text));
    }

    #[test]
    fn source_profile_changes_ordering() {
        // Chrono24 has no two-tone rule, so "18k" on a steel-and-gold Sub reads as gold.
        let id = classify_with(VariationProfile::Chrono24, "16613", "submariner 16613 18k two tone");
        assert_eq!(id.comparison_key(), "16613-gold");
        let id = classify_with(VariationProfile::Canonical, "16613", "submariner 16613 two tone");
        assert_eq!(id.comparison_key(), "16613-twotone");
    }
}
