//! Static currency table. Rates are indicative only; nothing here is fetched.

/// (ISO code, USD per unit)
const USD_RATES: &[(&str, f64)] = &[
    ("USD", 1.0),
    ("EUR", 1.10),
    ("GBP", 1.27),
    ("CHF", 1.12),
    ("CAD", 0.74),
    ("AUD", 0.67),
];

pub fn usd_rate(code: &str) -> Option<f64> {
    USD_RATES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code.trim()))
        .map(|&(_, rate)| rate)
}

/// Convert to whole US dollars, rounding down. Unknown codes pass through
/// at 1:1.
pub fn to_usd(amount: f64, code: &str) -> f64 {
    (amount * usd_rate(code).unwrap_or(1.0)).floor()
}
