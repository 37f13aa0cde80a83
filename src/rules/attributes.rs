//! Descriptive attribute tables. Each is ordered, first match wins.
//! Short dealer abbreviations (TT, SS, WG, PN, ...) are word-bounded so they
//! do not fire inside longer words.

use std::sync::LazyLock;

use super::Rule;

pub static SPECIAL_EDITIONS: LazyLock<Vec<Rule<&'static str>>> = LazyLock::new(|| {
    vec![
        Rule::regex(r"(?i)\btiffany\b|\bt&co\b", "Tiffany & Co"),
        Rule::regex(r"(?i)\btropical(?:ized)?\b", "Tropical"),
        Rule::regex(r"(?i)\bspider\b", "Spider"),
        Rule::regex(r"(?i)\bsigma\b", "Sigma"),
        Rule::regex(r"(?i)\bcomex\b", "COMEX"),
        Rule::regex(r"(?i)\bdomino'?s\b|\bpizza\b", "Domino's"),
        Rule::regex(r"(?i)\bmilitary\b|\bmil-?sub\b", "Military"),
        Rule::regex(r"(?i)\bpaul\s+newman\b|\bpn\b", "Paul Newman"),
        Rule::regex(r"(?i)\bhulk\b", "Hulk"),
        Rule::regex(r"(?i)\bpepsi\b", "Pepsi"),
        Rule::regex(r"(?i)\bcoke\b|\bcoca[\s-]?cola\b", "Coke"),
        Rule::regex(r"(?i)\bbatman\b", "Batman"),
        Rule::regex(r"(?i)\bkermit\b", "Kermit"),
        Rule::regex(r"(?i)\bstarbucks\b", "Starbucks"),
        Rule::regex(r"(?i)\bsmurf\b", "Smurf"),
    ]
});

pub static MATERIALS: LazyLock<Vec<Rule<&'static str>>> = LazyLock::new(|| {
    vec![
        Rule::regex(r"(?i)\byellow[\s-]+gold\b|\byg\b|\b18k[\s-]*y", "Yellow Gold"),
        Rule::regex(r"(?i)\bwhite[\s-]+gold\b|\bwg\b|\b18k[\s-]*w", "White Gold"),
        Rule::regex(r"(?i)\brose[\s-]+gold\b|\beverose\b|\brg\b|\b18k[\s-]*r", "Rose Gold"),
        Rule::regex(r"(?i)\btwo[\s-]*tone\b|\btt\b|\bbi[\s-]*metal\b", "Two-Tone"),
        Rule::regex(r"(?i)\bsteel\b|\bss\b|\bstainless\b", "Steel"),
        Rule::regex(r"(?i)\bplatinum\b|\bpt\b|\b950\b", "Platinum"),
        Rule::regex(r"(?i)\btitanium\b|\bti\b", "Titanium"),
    ]
});

pub static DIAL_COLORS: LazyLock<Vec<Rule<&'static str>>> = LazyLock::new(|| {
    vec![
        Rule::regex(r"(?i)\bblack\s+(?:dial|face)\b", "Black"),
        Rule::regex(r"(?i)\bblue\s+(?:dial|face)\b", "Blue"),
        Rule::regex(r"(?i)\bwhite\s+(?:dial|face)\b", "White"),
        Rule::regex(r"(?i)\bgreen\s+(?:dial|face)\b", "Green"),
        Rule::regex(r"(?i)\bchampagne\s+dial\b", "Champagne"),
        Rule::regex(r"(?i)\bsilver\s+dial\b", "Silver"),
        Rule::regex(r"(?i)\bsalmon\s+dial\b", "Salmon"),
        Rule::regex(r"(?i)\bmeteorite\s+dial\b", "Meteorite"),
        Rule::regex(r"(?i)\bmother\s+of\s+pearl\b|\bmop\b", "Mother of Pearl"),
    ]
});

/// Overall condition in dealer shorthand.
pub static CONDITIONS: LazyLock<Vec<Rule<&'static str>>> = LazyLock::new(|| {
    vec![
        Rule::regex(r"(?i)\bnaked\b", "naked"),
        Rule::regex(r"(?i)\bmint\b", "mint"),
        Rule::regex(r"(?i)\bexcellent\b", "excellent"),
        Rule::regex(r"(?i)\bbrand\s+new\b", "brand new"),
        Rule::regex(r"(?i)\bunworn\b", "unworn"),
        Rule::regex(r"(?i)\bntq\b", "new to quality"),
        Rule::regex(r"(?i)\bfull\s+set\b", "full set"),
        Rule::regex(r"(?i)\bcomplete\b", "complete"),
    ]
});

pub static CASE_CONDITIONS: LazyLock<Vec<Rule<&'static str>>> = LazyLock::new(|| {
    vec![
        Rule::regex(r"(?i)\bunpolished\b", "unpolished"),
        Rule::regex(r"(?i)\brazor\s+sharp\b", "razor sharp"),
        Rule::regex(r"(?i)\bno\s+holes\b", "no holes"),
    ]
});

pub static BRACELET_CONDITIONS: LazyLock<Vec<Rule<&'static str>>> = LazyLock::new(|| {
    vec![
        Rule::regex(r"(?i)\bfull\s+links\b", "full links"),
        Rule::regex(r"(?i)\bno\s+stretch\b", "no stretch"),
        Rule::regex(r"(?i)\bsolid\s+oyster\b", "solid oyster"),
        Rule::regex(r"(?i)\bfully\s+linked\b", "fully linked"),
        Rule::regex(r"(?i)\b(\d+)\s*links\b", "$1 links"),
    ]
});
