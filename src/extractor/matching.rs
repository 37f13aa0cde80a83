use crate::types::{ExtractMode, WatchInfo};

/// Stage D: attach prices to watches.
///
/// * one watch, one price: paired.
/// * N watches, N prices: paired by position (both lists are in text order).
/// * anything else: the highest-confidence watch (first on ties) takes the
///   first price and the rest are dropped.
///
/// Without any price, chat mode yields nothing and listing mode yields the
/// best watch with no price.
pub fn pair(watches: Vec<WatchInfo>, prices: &[f64], mode: ExtractMode) -> Vec<(WatchInfo, Option<f64>)> {
    if watches.is_empty() {
        return Vec::new();
    }

    if prices.is_empty() {
        return match mode {
            ExtractMode::Chat => Vec::new(),
            ExtractMode::Listing => best(watches).map(|w| (w, None)).into_iter().collect(),
        };
    }

    if watches.len() == prices.len() {
        return watches
            .into_iter()
            .zip(prices.iter().copied().map(Some))
            .collect();
    }

    best(watches)
        .map(|w| (w, Some(prices[0])))
        .into_iter()
        .collect()
}

fn best(watches: Vec<WatchInfo>) -> Option<WatchInfo> {
    watches
        .into_iter()
        .reduce(|best, w| if w.confidence > best.confidence { w } else { best })
}
