use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Variation tags
// ---------------------------------------------------------------------------

/// Price-relevant variation of an otherwise identical reference number.
/// Closed set; `Standard` when nothing in the text matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariationTag {
    Standard,
    // named historical variations
    Tiffany,
    Tropical,
    Spider,
    Sigma,
    Comex,
    Dominos,
    Military,
    Kermit,
    Hulk,
    // materials
    Gold,
    TwoTone,
    // dial colours
    Blue,
    White,
    Red,
    Silver,
    // bezels
    BlueBezel,
    GreenBezel,
    BlackBezel,
    // special dial configurations
    Serti,
    Champagne,
}

impl VariationTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariationTag::Standard => "standard",
            VariationTag::Tiffany => "tiffany",
            VariationTag::Tropical => "tropical",
            VariationTag::Spider => "spider",
            VariationTag::Sigma => "sigma",
            VariationTag::Comex => "comex",
            VariationTag::Dominos => "dominos",
            VariationTag::Military => "military",
            VariationTag::Kermit => "kermit",
            VariationTag::Hulk => "hulk",
            VariationTag::Gold => "gold",
            VariationTag::TwoTone => "twotone",
            VariationTag::Blue => "blue",
            VariationTag::White => "white",
            VariationTag::Red => "red",
            VariationTag::Silver => "silver",
            VariationTag::BlueBezel => "bluebezel",
            VariationTag::GreenBezel => "greenbezel",
            VariationTag::BlackBezel => "blackbezel",
            VariationTag::Serti => "serti",
            VariationTag::Champagne => "champagne",
        }
    }
}

impl std::fmt::Display for VariationTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Watch identity
// ---------------------------------------------------------------------------

/// Canonical identity used to decide whether two listings are comparable.
/// Built only by the classifier; the key is derived once and never edited.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchIdentity {
    reference_number: String,
    variation_tag: VariationTag,
    comparison_key: String,
    /// Display label of the matched rule, e.g. "Tiffany & Co".
    variation_label: Option<String>,
    /// Display dial/material descriptor of the matched rule.
    dial_type: Option<String>,
}

impl WatchIdentity {
    /// `reference_number` must already be normalized (lower-case alphanumeric).
    pub(crate) fn new(
        reference_number: String,
        variation_tag: VariationTag,
        variation_label: Option<String>,
        dial_type: Option<String>,
    ) -> Self {
        let comparison_key = format!("{}-{}", reference_number, variation_tag);
        Self {
            reference_number,
            variation_tag,
            comparison_key,
            variation_label,
            dial_type,
        }
    }

    pub fn reference_number(&self) -> &str {
        &self.reference_number
    }

    pub fn variation_tag(&self) -> VariationTag {
        self.variation_tag
    }

    pub fn comparison_key(&self) -> &str {
        &self.comparison_key
    }

    pub fn variation_label(&self) -> Option<&str> {
        self.variation_label.as_deref()
    }

    pub fn dial_type(&self) -> Option<&str> {
        self.dial_type.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Extraction results
// ---------------------------------------------------------------------------

/// One watch recognised in a message, before a price is attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchInfo {
    pub brand: String,
    pub model: Option<String>,
    pub reference: String,
    pub special_edition: Option<String>,
    pub material: Option<String>,
    pub dial_color: Option<String>,
    pub confidence: f64,
    /// Byte span of the reference number inside the source text.
    #[serde(skip)]
    pub ref_span: (usize, usize),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryFlags {
    pub has_box: bool,
    pub has_papers: bool,
    pub complete_set: bool,
}

/// One parsed observation extracted from a text source. Immutable once returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WatchListingCandidate {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub reference_number: Option<String>,
    /// USD. None when no price was extractable.
    pub price_usd: Option<f64>,
    pub special_edition: Option<String>,
    pub material: Option<String>,
    pub dial_color: Option<String>,
    pub condition: Option<String>,
    pub bracelet_condition: Option<String>,
    pub case_condition: Option<String>,
    pub accessories: AccessoryFlags,
    /// "+ label": shipping label charged on top of the price.
    pub includes_label: bool,
    pub serial: Option<String>,
    pub year: Option<u16>,
    pub variation_tag: Option<VariationTag>,
    pub variation_label: Option<String>,
    pub dial_type: Option<String>,
    /// Additive ranking score. Can exceed 1.0.
    pub confidence: f64,
    /// None only when `reference_number` is None.
    pub comparison_key: Option<String>,
    pub raw_source: String,
}

/// Whether null-priced candidates survive price matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractMode {
    /// Wholesale chat: a watch without a price is dropped.
    #[default]
    Chat,
    /// Scraped titles: price-less listings pass through for display.
    Listing,
}

// ---------------------------------------------------------------------------
// Catalog records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Wholesale,
    Retail,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::Wholesale => write!(f, "wholesale"),
            SourceType::Retail => write!(f, "retail"),
        }
    }
}

/// A listing ready to hand to the catalog. Keyed by `source_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRecord {
    pub source: String,
    pub source_id: String,
    pub source_type: SourceType,
    pub url: Option<String>,
    pub title: Option<String>,
    pub seller_name: Option<String>,
    pub dealer_group: Option<String>,
    pub original_currency: Option<String>,
    pub original_price: Option<f64>,
    /// Unix epoch nanoseconds of the observation (message time or scrape time).
    pub observed_at_ns: i64,
    pub candidate: WatchListingCandidate,
}

/// What an upsert did to the catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpsertOutcome {
    New,
    /// Listing seen before; fields refreshed, price unchanged.
    Unchanged,
    PriceChange { previous: f64, current: f64 },
}

// ---------------------------------------------------------------------------
// Trends
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Up => write!(f, "up"),
            TrendDirection::Down => write!(f, "down"),
            TrendDirection::Stable => write!(f, "stable"),
        }
    }
}
