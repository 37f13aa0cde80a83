//! Ordered pattern tables and the one matcher that scans them.
//!
//! Every table is a list of `Rule`s evaluated top to bottom; the first rule
//! whose pattern hits decides the outcome. There is no scoring and no
//! longest-match preference, so table order is the only tie-break.

pub mod attributes;
pub mod entity;
pub mod variation;

use regex::Regex;

/// How a rule recognises text.
#[derive(Debug)]
pub enum Pattern {
    /// Any of these lower-case phrases occurring as a substring.
    Keywords(&'static [&'static str]),
    /// A compiled expression; compile with `(?i)` for case-insensitive tables.
    Regex(Regex),
}

impl Pattern {
    /// `lowered` must already be lower-cased for keyword patterns to match.
    fn find<'t>(&self, lowered: &'t str) -> Option<Hit<'t>> {
        match self {
            Pattern::Keywords(words) => words
                .iter()
                .any(|w| lowered.contains(w))
                .then_some(Hit::Plain),
            Pattern::Regex(re) => re.captures(lowered).map(Hit::Captured),
        }
    }
}

enum Hit<'t> {
    Plain,
    Captured(regex::Captures<'t>),
}

#[derive(Debug)]
pub struct Rule<T> {
    pub pattern: Pattern,
    pub value: T,
}

impl<T> Rule<T> {
    pub const fn keywords(words: &'static [&'static str], value: T) -> Self {
        Self { pattern: Pattern::Keywords(words), value }
    }

    /// Panics on an invalid expression. Tables are built from literals, so
    /// this only fires on a programming error during static initialisation.
    pub fn regex(expr: &str, value: T) -> Self {
        let re = Regex::new(expr).unwrap_or_else(|e| panic!("bad rule pattern {expr:?}: {e}"));
        Self { pattern: Pattern::Regex(re), value }
    }
}

/// First rule (in table order) whose pattern occurs in `text`.
pub fn first_match<'r, T>(rules: &'r [Rule<T>], text: &str) -> Option<&'r T> {
    let lowered = text.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.pattern.find(&lowered).is_some())
        .map(|rule| &rule.value)
}

/// Like [`first_match`] for label tables. A label may reference capture
/// groups of a regex rule (`"$1 links"`); the expanded string is returned.
pub fn first_label(rules: &[Rule<&'static str>], text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    rules.iter().find_map(|rule| match rule.pattern.find(&lowered)? {
        Hit::Plain => Some(rule.value.to_string()),
        Hit::Captured(caps) => {
            let mut out = String::new();
            caps.expand(rule.value, &mut out);
            Some(out)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<Rule<&'static str>> {
        vec![
            Rule::keywords(&["tiffany"], "tiffany"),
            Rule::keywords(&["gold", "18k"], "gold"),
            Rule::regex(r"\b(\d+)\s*links\b", "$1 links"),
        ]
    }

    #[test]
    fn earlier_rule_wins_over_later() {
        let rules = table();
        assert_eq!(first_match(&rules, "Yellow GOLD Tiffany dial"), Some(&"tiffany"));
    }

    #[test]
    fn keywords_match_case_insensitively() {
        let rules = table();
        assert_eq!(first_match(&rules, "18K case"), Some(&"gold"));
    }

    #[test]
    fn no_match_is_none() {
        let rules = table();
        assert_eq!(first_match(&rules, "stainless steel"), None);
        assert_eq!(first_match(&rules, ""), None);
    }

    #[test]
    fn label_expands_captures() {
        let rules = table();
        assert_eq!(first_label(&rules, "comes with 3 LINKS extra").as_deref(), Some("3 links"));
    }
}
