use serde::{Deserialize, Serialize};

use super::Rule;
use crate::types::VariationTag;

/// Metadata carried by a variation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variation {
    pub tag: VariationTag,
    pub label: &'static str,
    pub dial_type: &'static str,
}

const fn rule(
    keywords: &'static [&'static str],
    tag: VariationTag,
    label: &'static str,
    dial_type: &'static str,
) -> Rule<Variation> {
    Rule::keywords(keywords, Variation { tag, label, dial_type })
}

/// Canonical ordering: named historical variations, then materials, dial
/// colours, bezels and special dial configurations. A rare named variation is
/// never shadowed by a generic colour or metal keyword.
static CANONICAL: [Rule<Variation>; 20] = [
    rule(&["tiffany", "tiffany & co", "tiffany dial"], VariationTag::Tiffany, "Tiffany & Co", "Tiffany"),
    rule(&["tropical", "tropical dial", "brown dial"], VariationTag::Tropical, "Tropical Dial", "Tropical"),
    rule(&["spider", "spider dial", "cracked dial"], VariationTag::Spider, "Spider Dial", "Spider"),
    rule(&["sigma", "sigma dial"], VariationTag::Sigma, "Sigma Dial", "Sigma"),
    rule(&["comex", "comex dial"], VariationTag::Comex, "COMEX", "COMEX"),
    rule(&["domino", "domino's", "dominos"], VariationTag::Dominos, "Domino's Pizza", "Dominos"),
    rule(&["military", "mil-sub", "milsub"], VariationTag::Military, "Military Submariner", "Military"),
    rule(&["kermit", "green bezel"], VariationTag::Kermit, "Kermit (Green Bezel)", "Kermit"),
    rule(&["hulk", "green dial"], VariationTag::Hulk, "Hulk (Green Dial)", "Hulk"),
    rule(&["yellow gold", "gold", "18k gold", "yellow-gold"], VariationTag::Gold, "Yellow Gold", "Gold"),
    rule(&["two tone", "two-tone", "steel gold", "steel-gold"], VariationTag::TwoTone, "Steel & Gold", "Two-Tone"),
    rule(&["blue dial", "blue-dial", "blue face"], VariationTag::Blue, "Blue Dial", "Blue"),
    rule(
        &["white dial", "white-dial", "white face", "white submariner", "white-submariner"],
        VariationTag::White,
        "White Dial",
        "White",
    ),
    rule(&["red writing", "red-writing", "red text", "red submariner"], VariationTag::Red, "Red Writing", "Red Writing"),
    rule(&["silver dial", "silver-dial", "silver face"], VariationTag::Silver, "Silver Dial", "Silver"),
    rule(&["blue bezel", "blue-bezel"], VariationTag::BlueBezel, "Blue Bezel", "Blue Bezel"),
    rule(&["green bezel", "green-bezel"], VariationTag::GreenBezel, "Green Bezel", "Green Bezel"),
    rule(&["black bezel", "black-bezel"], VariationTag::BlackBezel, "Black Bezel", "Black Bezel"),
    rule(&["slate serti", "slate-serti", "serti"], VariationTag::Serti, "Slate Serti", "Serti"),
    rule(&["champagne dial", "champagne-dial", "champagne face"], VariationTag::Champagne, "Champagne Dial", "Champagne"),
];

static CHRONO24: [Rule<Variation>; 5] = [
    rule(&["tiffany", "tiffany & co", "tiffany dial"], VariationTag::Tiffany, "Tiffany & Co", "Tiffany"),
    rule(&["tropical", "brown dial", "aged dial"], VariationTag::Tropical, "Tropical Dial", "Tropical"),
    rule(&["18k", "yellow gold", "rose gold", "white gold", "solid gold"], VariationTag::Gold, "Yellow Gold", "Gold"),
    rule(&["blue dial", "blue face", "blue bezel"], VariationTag::Blue, "Blue Dial", "Blue"),
    rule(&["hulk", "green dial", "green bezel"], VariationTag::Hulk, "Hulk (Green Dial)", "Green"),
];

static WATCHFINDER: [Rule<Variation>; 4] = [
    rule(&["tiffany", "tiffany & co", "tiffany dial"], VariationTag::Tiffany, "Tiffany & Co", "Tiffany"),
    rule(
        &["18k", "18ct", "yellow gold", "rose gold", "white gold", "solid gold"],
        VariationTag::Gold,
        "Gold",
        "Gold",
    ),
    rule(&["blue dial", "blue face", "blue bezel"], VariationTag::Blue, "Blue Dial/Bezel", "Blue"),
    rule(&["green dial", "green bezel", "hulk", "kermit"], VariationTag::Hulk, "Green Dial/Bezel", "Green"),
];

static HODINKEE: [Rule<Variation>; 2] = [
    rule(&["tiffany", "tiffany & co"], VariationTag::Tiffany, "Tiffany & Co", "Tiffany"),
    rule(&["tropical", "brown dial"], VariationTag::Tropical, "Tropical Dial", "Tropical"),
];

/// Which ordered variation table to apply. Retail sources each carry their
/// own keyword set and ordering; chat messages and unknown sources use the
/// canonical table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariationProfile {
    #[default]
    Canonical,
    Chrono24,
    Watchfinder,
    Hodinkee,
}

impl VariationProfile {
    pub fn rules(&self) -> &'static [Rule<Variation>] {
        match self {
            VariationProfile::Canonical => &CANONICAL,
            VariationProfile::Chrono24 => &CHRONO24,
            VariationProfile::Watchfinder => &WATCHFINDER,
            VariationProfile::Hodinkee => &HODINKEE,
        }
    }

    /// Profile for a source name as stored in the catalog.
    pub fn for_source(source: &str) -> Self {
        match source.to_ascii_lowercase().as_str() {
            "chrono24" => VariationProfile::Chrono24,
            "watchfinder" => VariationProfile::Watchfinder,
            "hodinkee" | "hodinkee_shop" => VariationProfile::Hodinkee,
            _ => VariationProfile::Canonical,
        }
    }
}
