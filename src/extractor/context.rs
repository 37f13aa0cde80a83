use std::sync::LazyLock;

use regex::Regex;

use crate::config::confidence;
use crate::rules::attributes::{
    BRACELET_CONDITIONS, CASE_CONDITIONS, CONDITIONS, DIAL_COLORS, MATERIALS, SPECIAL_EDITIONS,
};
use crate::rules::first_label;
use crate::types::{AccessoryFlags, WatchInfo};

static SERIAL_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b([a-z])\s+ser(?:ial)?\b").expect("valid serial letter regex"));
static SERIAL_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bser(?:ial)?\.?\s*(?:no\.?|#)?\s*([a-z0-9]{6,8})\b").expect("valid serial number regex")
});
static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(19[4-9]\d|20[0-4]\d)\b").expect("valid year regex"));
static COMPLETE_SET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:complete|full)\s+set\b|\bcomplete\b").expect("valid complete set regex")
});
static BOX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bbox(?:ed)?\b").expect("valid box regex"));
static PAPERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:papers?|card|warranty)\b").expect("valid papers regex")
});
static NO_BOX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bno\s+box\b").expect("valid no box regex"));
static NO_PAPERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bno\s+(?:papers?|card|warranty)\b").expect("valid no papers regex")
});
static LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\+\s*label\b").expect("valid label regex"));

/// Up to `radius` characters on each side of `span`, cut on char boundaries.
pub fn window(text: &str, span: (usize, usize), radius: usize) -> &str {
    let start = if radius == 0 {
        span.0
    } else {
        text[..span.0]
            .char_indices()
            .rev()
            .nth(radius - 1)
            .map(|(i, _)| i)
            .unwrap_or(0)
    };
    let end = text[span.1..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| span.1 + i)
        .unwrap_or(text.len());
    &text[start..end]
}

/// Stage C: special edition, material and dial colour found near the
/// reference, each adding its bonus to the watch's confidence.
pub fn enrich(watch: &mut WatchInfo, context: &str) {
    if let Some(edition) = first_label(&SPECIAL_EDITIONS, context) {
        watch.special_edition = Some(edition);
        watch.confidence += confidence::SPECIAL_EDITION_BONUS;
    }
    if let Some(material) = first_label(&MATERIALS, context) {
        watch.material = Some(material);
        watch.confidence += confidence::MATERIAL_BONUS;
    }
    if let Some(dial) = first_label(&DIAL_COLORS, context) {
        watch.dial_color = Some(dial);
        watch.confidence += confidence::DIAL_BONUS;
    }
}

/// Condition and paperwork shorthand describing one listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Descriptors {
    pub condition: Option<String>,
    pub bracelet_condition: Option<String>,
    pub case_condition: Option<String>,
    pub accessories: AccessoryFlags,
    pub includes_label: bool,
    pub serial: Option<String>,
    pub year: Option<u16>,
}

/// Read dealer shorthand from the text that belongs to one listing.
/// `reference` is excluded from year detection (a 4-digit reference such as
/// 1955 is not a production year).
pub fn describe(scope: &str, reference: &str) -> Descriptors {
    let condition = first_label(&CONDITIONS, scope);
    let accessories = accessories(scope, condition.as_deref() == Some("naked"));

    let serial = SERIAL_LETTER
        .captures(scope)
        .map(|c| c[1].to_uppercase())
        .or_else(|| SERIAL_NUMBER.captures(scope).map(|c| c[1].to_uppercase()));

    let year = YEAR
        .find_iter(scope)
        .map(|m| m.as_str())
        .find(|y| !reference.eq_ignore_ascii_case(y))
        .and_then(|y| y.parse().ok());

    Descriptors {
        condition,
        bracelet_condition: first_label(&BRACELET_CONDITIONS, scope),
        case_condition: first_label(&CASE_CONDITIONS, scope),
        accessories,
        includes_label: LABEL.is_match(scope),
        serial,
        year,
    }
}

/// A set claim implies box and papers; explicit negations win over it and a
/// set missing either part is not complete.
fn accessories(scope: &str, naked: bool) -> AccessoryFlags {
    if naked {
        return AccessoryFlags::default();
    }
    let claims_set = COMPLETE_SET.is_match(scope);
    let has_box = !NO_BOX.is_match(scope) && (claims_set || BOX.is_match(scope));
    let has_papers = !NO_PAPERS.is_match(scope) && (claims_set || PAPERS.is_match(scope));
    AccessoryFlags {
        has_box,
        has_papers,
        complete_set: claims_set && has_box && has_papers,
    }
}
