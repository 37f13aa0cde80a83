use crate::rules::entity::{looks_like_year, MatchKind, ENTITY_PATTERNS};
use crate::types::WatchInfo;

use super::prices::PriceScan;

fn overlaps(a: (usize, usize), b: (usize, usize)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

/// Stage B: every brand/model/reference mention in `text`, ordered by where
/// the reference appears.
///
/// A reference span is claimed by the first pattern (in table order) that
/// reaches it. Numbers inside price expressions are never references, and
/// a bare number is rejected when it reads as a year or sits inside a
/// dotted/slashed token such as a date.
pub fn find_watches(text: &str, prices: &PriceScan) -> Vec<WatchInfo> {
    let mut watches: Vec<WatchInfo> = Vec::new();

    for pattern in ENTITY_PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(text) {
            let Some(reference) = caps.name("ref") else {
                continue;
            };
            let span = (reference.start(), reference.end());
            if prices.covers(span) || watches.iter().any(|w| overlaps(w.ref_span, span)) {
                continue;
            }
            if pattern.kind == MatchKind::Bare
                && (looks_like_year(reference.as_str()) || inside_compound_token(text, span))
            {
                continue;
            }
            watches.push(WatchInfo {
                brand: pattern.brand.to_string(),
                model: pattern.model.map(str::to_string),
                reference: reference.as_str().to_uppercase(),
                special_edition: None,
                material: None,
                dial_color: None,
                confidence: pattern.confidence,
                ref_span: span,
            });
        }
    }

    watches.sort_by_key(|w| w.ref_span.0);
    watches
}

/// True when the span is glued to `.` or `/` (dates, Omega dotted refs, times).
fn inside_compound_token(text: &str, span: (usize, usize)) -> bool {
    let before = text[..span.0].chars().next_back();
    let after = text[span.1..].chars().next();
    matches!(before, Some('.' | '/')) || matches!(after, Some('/'))
        || (after == Some('.') && text[span.1 + 1..].starts_with(|c: char| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::prices::scan_prices;

    fn watches(text: &str) -> Vec<WatchInfo> {
        find_watches(text, &scan_prices(text))
    }

    #[test]
    fn qualified_reference_and_price_number_do_not_collide() {
        let found = watches("Sub 1680 $30000, GMT 1675 $18000");
        let refs: Vec<_> = found.iter().map(|w| w.reference.as_str()).collect();
        assert_eq!(refs, vec!["1680", "1675"]);
        assert_eq!(found[0].model.as_deref(), Some("Submariner"));
        assert_eq!(found[1].model.as_deref(), Some("GMT-Master"));
    }

    #[test]
    fn bare_number_is_low_confidence_rolex() {
        let found = watches("116610LN mint full set");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reference, "116610LN");
        assert_eq!(found[0].brand, "Rolex");
        assert!((found[0].confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn bare_year_is_skipped() {
        let found = watches("Sub 16610 2019 card $9500");
        let refs: Vec<_> = found.iter().map(|w| w.reference.as_str()).collect();
        assert_eq!(refs, vec!["16610"]);
    }

    #[test]
    fn reverse_order_model_mention() {
        let found = watches("16710 GMT pepsi $15000");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].model.as_deref(), Some("GMT-Master"));
        assert!((found[0].confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn omega_dotted_reference() {
        let found = watches("Omega Speedmaster 311.30.42.30.01.005 $5200");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].brand, "Omega");
        assert_eq!(found[0].reference, "311.30.42.30.01.005");
    }

    #[test]
    fn greeting_has_no_watch() {
        assert!(watches("hello, how are you?").is_empty());
    }
}
