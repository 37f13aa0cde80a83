use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::config::price_band;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scale {
    Units,
    /// Trailing `K`: multiply by 1000.
    Thousands,
}

#[derive(Debug)]
struct PricePattern {
    regex: Regex,
    scale: Scale,
}

/// Number with optional thousands separators and cents: 42,000 / 42000 / 42000.50
const AMOUNT: &str = r"(?P<num>\d{1,3}(?:,\d{3})+(?:\.\d{2})?|\d+(?:\.\d{2})?)";
/// Short number in front of a K suffix: 42K / 4.5k
const SHORT: &str = r"(?P<num>\d{1,4}(?:\.\d{1,2})?)";

/// Words after a K that mean carat, not thousand ("18k gold", "18K YG").
const CARAT_WORDS: &[&str] = &[
    "gold", "yellow", "white", "rose", "everose", "yg", "wg", "rg", "y", "w", "r",
];

/// Gold finenesses. A bare "18K" is carat unless a price cue precedes it.
const CARAT_VALUES: &[&str] = &["9", "10", "14", "18", "22", "24"];

/// Words that make the following bare K amount a price ("asking 18K").
const PRICE_CUES: &[&str] = &["asking", "usd", "price", "budget", "around", "for"];

static PRICE_PATTERNS: LazyLock<Vec<PricePattern>> = LazyLock::new(|| {
    let p = |expr: String, scale| PricePattern {
        regex: Regex::new(&expr).unwrap_or_else(|e| panic!("bad price pattern {expr:?}: {e}")),
        scale,
    };
    vec![
        p(format!(r"(?i)\$\s?{SHORT}\s?(?P<unit>k)\b(?P<tail>[\s-]*[a-z]+)?"), Scale::Thousands),
        p(format!(r"(?i)\$\s?{AMOUNT}"), Scale::Units),
        p(format!(r"(?i){AMOUNT}\s*usd\b"), Scale::Units),
        p(format!(r"(?i)\busd\s*\$?{AMOUNT}"), Scale::Units),
        p(format!(r"(?i){AMOUNT}\s*dollars?\b"), Scale::Units),
        p(format!(r"(?i)\b{SHORT}\s?(?P<unit>k)\b(?P<tail>[\s-]*[a-z]+)?"), Scale::Thousands),
        p(format!(r"(?i)\basking\s+(?:price\s+)?\$?{AMOUNT}\b"), Scale::Units),
        p(format!(r"(?i)\bbudget\s+(?:around\s+|of\s+)?\$?{AMOUNT}\b"), Scale::Units),
    ]
});

/// Result of scanning a message for prices.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PriceScan {
    /// In-band prices, deduplicated, in order of first appearance in the text.
    pub prices: Vec<f64>,
    /// Byte spans of every price-shaped expression, in band or not. Numbers
    /// inside these spans are never read as reference numbers.
    pub spans: Vec<(usize, usize)>,
}

impl PriceScan {
    pub fn covers(&self, span: (usize, usize)) -> bool {
        self.spans.iter().any(|&(s, e)| span.0 < e && s < span.1)
    }
}

pub fn scan_prices(text: &str) -> PriceScan {
    let mut found: Vec<(usize, f64)> = Vec::new();
    let mut spans = Vec::new();

    for pattern in PRICE_PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(text) {
            if pattern.scale == Scale::Thousands && is_carat(text, &caps) {
                continue;
            }
            let Some(value) = parse_amount(&caps, pattern.scale) else {
                continue;
            };
            let whole = caps.get(0).map(|m| (m.start(), m.end()));
            let end = caps.name("unit").map(|m| m.end());
            if let Some((start, whole_end)) = whole {
                spans.push((start, end.unwrap_or(whole_end)));
                if in_band(value) {
                    found.push((start, value));
                }
            }
        }
    }

    found.sort_by_key(|&(start, _)| start);
    let mut prices: Vec<f64> = Vec::with_capacity(found.len());
    for (_, value) in found {
        if !prices.contains(&value) {
            prices.push(value);
        }
    }

    PriceScan { prices, spans }
}

pub fn in_band(value: f64) -> bool {
    (price_band::FLOOR_USD..=price_band::CEILING_USD).contains(&value)
}

fn is_carat(text: &str, caps: &Captures<'_>) -> bool {
    let carat_tail = caps
        .name("tail")
        .map(|t| t.as_str().trim_start_matches(|c: char| c.is_whitespace() || c == '-'))
        .is_some_and(|word| CARAT_WORDS.iter().any(|w| word.eq_ignore_ascii_case(w)));
    if carat_tail {
        return true;
    }

    let Some(whole) = caps.get(0) else {
        return false;
    };
    let fineness = caps
        .name("num")
        .is_some_and(|n| CARAT_VALUES.contains(&n.as_str()));
    fineness && !whole.as_str().starts_with('$') && !has_price_cue(&text[..whole.start()])
}

/// Whether the word right before a bare amount marks it as a price.
fn has_price_cue(before: &str) -> bool {
    before
        .trim_end_matches(|c: char| c.is_whitespace() || c == ':')
        .rsplit(|c: char| !c.is_ascii_alphabetic())
        .next()
        .is_some_and(|word| PRICE_CUES.iter().any(|cue| word.eq_ignore_ascii_case(cue)))
}

fn parse_amount(caps: &Captures<'_>, scale: Scale) -> Option<f64> {
    let raw = caps.name("num")?.as_str().replace(',', "");
    let value: f64 = raw.parse().ok()?;
    let value = match scale {
        Scale::Units => value,
        Scale::Thousands => value * 1000.0,
    };
    Some((value * 100.0).round() / 100.0)
}
