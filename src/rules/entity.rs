//! Brand / model / reference recognition table.
//!
//! Each pattern exposes the reference number as the named group `ref`.
//! Ordering: model-qualified forms with the model first, then with the number
//! first, then brand-qualified forms, then bare numbers. When two patterns
//! claim the same reference span the earlier pattern keeps it.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::confidence;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Brand and/or model named next to the number.
    Qualified,
    /// A number on its own; only accepted where nothing better claimed it.
    Bare,
}

#[derive(Debug)]
pub struct EntityPattern {
    pub regex: Regex,
    pub brand: &'static str,
    pub model: Option<&'static str>,
    pub confidence: f64,
    pub kind: MatchKind,
}

/// Reference token: 4-6 digits with an optional short letter suffix (116610LN).
const REF: &str = r"(?P<ref>\d{4,6}[a-z]{0,4})\b";
const SEP: &str = r"[\s\-:#]*";

/// (model alternation, model name) for Rolex families.
const ROLEX_MODELS: &[(&str, &str)] = &[
    (r"submariner|sub", "Submariner"),
    (r"gmt(?:[\s-]*master)?(?:[\s-]*ii)?", "GMT-Master"),
    (r"day[\s-]*date|dd", "Day-Date"),
    (r"daytona", "Daytona"),
    (r"datejust|dj", "Datejust"),
    (r"explorer(?:[\s-]*ii)?", "Explorer"),
    (r"sea[\s-]*dweller", "Sea-Dweller"),
    (r"sky[\s-]*dweller", "Sky-Dweller"),
    (r"yacht[\s-]*master(?:[\s-]*ii)?|ym", "Yacht-Master"),
    (r"air[\s-]*king", "Air-King"),
    (r"milgauss", "Milgauss"),
    (r"domino'?s(?:\s+pizza)?|oyster[\s-]*perpetual", "Oyster Perpetual"),
];

fn compile(expr: &str) -> Regex {
    Regex::new(expr).unwrap_or_else(|e| panic!("bad entity pattern {expr:?}: {e}"))
}

fn qualified(expr: String, brand: &'static str, model: Option<&'static str>, confidence: f64) -> EntityPattern {
    EntityPattern {
        regex: compile(&expr),
        brand,
        model,
        confidence,
        kind: MatchKind::Qualified,
    }
}

fn bare(digits: usize, confidence: f64) -> EntityPattern {
    EntityPattern {
        regex: compile(&format!(r"(?i)\b(?P<ref>\d{{{digits}}}[a-z]{{0,4}})\b")),
        brand: "Rolex",
        model: None,
        confidence,
        kind: MatchKind::Bare,
    }
}

pub static ENTITY_PATTERNS: LazyLock<Vec<EntityPattern>> = LazyLock::new(|| {
    let mut table = Vec::new();

    for &(alt, model) in ROLEX_MODELS {
        table.push(qualified(
            format!(r"(?i)\b(?:{alt}){SEP}{REF}"),
            "Rolex",
            Some(model),
            confidence::MODEL_QUALIFIED,
        ));
    }
    for &(alt, model) in ROLEX_MODELS {
        table.push(qualified(
            format!(r"(?i)\b(?P<ref>\d{{4,6}}[a-z]{{0,4}})[\s-]+(?:{alt})\b"),
            "Rolex",
            Some(model),
            confidence::MODEL_QUALIFIED,
        ));
    }

    // Vintage listings quote the serial letter right after the reference: "16220, L ser."
    table.push(qualified(
        r"(?i)\b(?P<ref>\d{4,5}),\s*[a-z]\s*ser\b".to_string(),
        "Rolex",
        None,
        confidence::MODEL_QUALIFIED,
    ));

    table.push(qualified(
        r"(?i)\bomega\b.*?(?P<ref>\d{3}\.\d{2}\.\d{2}\.\d{2}\.\d{2}\.\d{3})".to_string(),
        "Omega",
        None,
        confidence::MODEL_QUALIFIED,
    ));
    table.push(qualified(
        r"(?i)\b(?P<ref>rm[\s-]?\d{2,3}(?:-\d{2})?)\b".to_string(),
        "Richard Mille",
        None,
        confidence::MODEL_QUALIFIED,
    ));
    table.push(qualified(
        r"(?i)\bpatek(?:\s+philippe)?\b[^\d$]{0,40}(?P<ref>\d{4}(?:/\d{1,4}[a-z]{0,2})?)\b".to_string(),
        "Patek Philippe",
        None,
        confidence::MODEL_QUALIFIED,
    ));
    table.push(qualified(
        r"(?i)\bcartier\b[^\d$]{0,40}(?P<ref>\d{4})\b".to_string(),
        "Cartier",
        None,
        0.8,
    ));

    table.push(qualified(
        format!(r"(?i)\brolex{SEP}{REF}"),
        "Rolex",
        None,
        confidence::BRAND_QUALIFIED,
    ));
    table.push(qualified(
        r"(?i)\b(?P<ref>\d{4,6}[a-z]{0,4})\s+rolex\b".to_string(),
        "Rolex",
        None,
        confidence::BRAND_QUALIFIED,
    ));

    table.push(bare(6, confidence::BARE_SIX_DIGIT));
    table.push(bare(5, confidence::BARE_FIVE_DIGIT));
    table.push(bare(4, confidence::BARE_FOUR_DIGIT));

    table
});

/// Four-digit numbers in this range read as years, not references, when
/// they stand alone.
pub fn looks_like_year(token: &str) -> bool {
    token.len() == 4
        && token
            .parse::<u16>()
            .map(|y| (1900..=2099).contains(&y))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_hit(text: &str) -> Option<(&'static str, Option<&'static str>, String)> {
        ENTITY_PATTERNS.iter().find_map(|p| {
            p.regex
                .captures(text)
                .map(|c| (p.brand, p.model, c["ref"].to_string()))
        })
    }

    #[test]
    fn model_before_number() {
        let (brand, model, reference) = first_hit("Got a nice Sub 1680 Tiffany dial").unwrap();
        assert_eq!(brand, "Rolex");
        assert_eq!(model, Some("Submariner"));
        assert_eq!(reference, "1680");
    }

    #[test]
    fn letter_suffix_is_part_of_reference() {
        let (_, model, reference) = first_hit("GMT-Master II 126710BLRO jubilee").unwrap();
        assert_eq!(model, Some("GMT-Master"));
        assert_eq!(reference, "126710BLRO");
    }

    #[test]
    fn richard_mille_reference() {
        let (brand, _, reference) = first_hit("RM11-03 full set").unwrap();
        assert_eq!(brand, "Richard Mille");
        assert_eq!(reference, "RM11-03");
    }

    #[test]
    fn years_are_recognised() {
        assert!(looks_like_year("2019"));
        assert!(!looks_like_year("1680"));
        assert!(!looks_like_year("16610"));
    }
}
