//! Deterministic relevance classifier.
//!
//! Scores a record's subject text against an ordered rule set. Each rule is
//! a literal substring pattern with a case-sensitivity flag; the score is
//! the number of rules that matched at least once, not the number of
//! occurrences. Rules are sanitized when the set is compiled, never at
//! classify time.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::RuleLoadError;
use crate::types::GazetteRecord;

/// A literal pattern plus case-sensitivity flag.
///
/// User-editable between runs (the rule file is a JSON array of these);
/// immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceRule {
    /// Literal text to look for; regex metacharacters are escaped before
    /// matching
    pub pattern: String,

    /// Exact-case search when true, case-insensitive otherwise
    #[serde(default)]
    pub case_sensitive: bool,
}

impl RelevanceRule {
    pub fn new(pattern: impl Into<String>, case_sensitive: bool) -> Self {
        Self {
            pattern: pattern.into(),
            case_sensitive,
        }
    }
}

/// The relevance decision derived for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDecision {
    /// The record's site-assigned identifier
    pub entry_id: String,

    /// Whether the record passes the filter (`match_count > 0`)
    pub is_relevant: bool,

    /// Number of rules that matched the subject text
    pub match_count: usize,
}

struct CompiledRule {
    rule: RelevanceRule,
    matcher: Regex,
}

/// An ordered, compiled rule set.
///
/// Compilation escapes each pattern so its characters are treated
/// literally; a pattern the engine still rejects is dropped with a warning
/// rather than surfacing at classify time.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// Compile a rule sequence.
    pub fn compile(rules: impl IntoIterator<Item = RelevanceRule>) -> Self {
        let rules = rules
            .into_iter()
            .filter_map(|rule| {
                let escaped = regex::escape(&rule.pattern);
                match RegexBuilder::new(&escaped)
                    .case_insensitive(!rule.case_sensitive)
                    .build()
                {
                    Ok(matcher) => Some(CompiledRule { rule, matcher }),
                    Err(err) => {
                        warn!(pattern = %rule.pattern, error = %err, "dropping unusable rule");
                        None
                    }
                }
            })
            .collect();
        Self { rules }
    }

    /// Load and compile a JSON rule file (an array of [`RelevanceRule`]).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RuleLoadError> {
        let raw = std::fs::read_to_string(path)?;
        let rules: Vec<RelevanceRule> = serde_json::from_str(&raw)?;
        Ok(Self::compile(rules))
    }

    /// The production vehicle-regulation keyword list.
    pub fn builtin() -> Self {
        let rules = [
            ("CMVR 1989", true),
            ("Motor Vehicle Act 1988", true),
            ("Draft Rules", false),
            ("Amended", false),
            ("Final Draft", false),
            ("Truck", false),
            ("Vehicle", false),
            ("Road", false),
            ("Automobile", false),
            ("M category", true),
            ("N category", true),
            ("Wheel Rim", false),
            ("Battery", false),
            ("Waste Management", false),
            ("Steel", false),
            ("Brake system", false),
            ("Emission", false),
            ("AdBlue", true),
            ("Urea", false),
            ("Smoke", false),
            ("Pollution", false),
            ("Tires", false),
            ("Electric", false),
            ("EV", true),
            ("PM", true),
            ("Type Approval", false),
            ("Registration", false),
            ("Safety", false),
            ("Compliance", false),
            ("Fire", false),
            ("Air Conditioning", false),
            ("Light", false),
            ("Diesel", false),
            ("Fuel", false),
            ("Coal", false),
            ("Mines", false),
            ("Hydrogen", false),
            ("Alternate Fuel", false),
            ("Test", false),
        ];
        Self::compile(
            rules
                .into_iter()
                .map(|(pattern, case_sensitive)| RelevanceRule::new(pattern, case_sensitive)),
        )
    }

    /// Number of rules that match `text` at least once.
    ///
    /// Deterministic, and independent of rule order in its returned count;
    /// duplicate patterns each count independently. Empty text matches
    /// nothing.
    pub fn match_count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        let mut count = 0;
        for compiled in &self.rules {
            if let Some(found) = compiled.matcher.find(text) {
                debug!(
                    pattern = %compiled.rule.pattern,
                    matched = found.as_str(),
                    "keyword matched"
                );
                count += 1;
            }
        }
        count
    }

    /// Whether at least one rule matches.
    pub fn is_relevant(&self, text: &str) -> bool {
        self.match_count(text) > 0
    }

    /// Derive the filter decision for a record's subject text.
    pub fn decide(&self, record: &GazetteRecord) -> FilterDecision {
        let match_count = self.match_count(&record.subject);
        FilterDecision {
            entry_id: record.entry_id.clone(),
            is_relevant: match_count > 0,
            match_count,
        }
    }

    /// The rules this set was compiled from, in order.
    pub fn rules(&self) -> impl Iterator<Item = &RelevanceRule> {
        self.rules.iter().map(|c| &c.rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rules(entries: &[(&str, bool)]) -> RuleSet {
        RuleSet::compile(
            entries
                .iter()
                .map(|(p, cs)| RelevanceRule::new(*p, *cs)),
        )
    }

    #[test]
    fn test_case_insensitive_match() {
        let set = rules(&[("Truck", false)]);
        assert_eq!(set.match_count("New truck safety norms"), 1);
        assert!(set.is_relevant("New truck safety norms"));
    }

    #[test]
    fn test_case_sensitive_mismatch() {
        let set = rules(&[("CMVR 1989", true)]);
        assert_eq!(set.match_count("cmvr 1989 draft"), 0);
        assert!(!set.is_relevant("cmvr 1989 draft"));
        assert_eq!(set.match_count("Amendment to CMVR 1989"), 1);
    }

    #[test]
    fn test_empty_text_matches_nothing() {
        let set = RuleSet::builtin();
        assert_eq!(set.match_count(""), 0);
    }

    #[test]
    fn test_counts_rules_not_occurrences() {
        let set = rules(&[("safety", false)]);
        assert_eq!(set.match_count("safety safety safety"), 1);
    }

    #[test]
    fn test_duplicate_patterns_count_independently() {
        let set = rules(&[("Road", false), ("Road", false)]);
        assert_eq!(set.match_count("Road transport notice"), 2);
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let set = rules(&[("M (category)", false), (".*", false)]);
        assert_eq!(set.match_count("rules for the M (category) fleet"), 1);
        assert_eq!(set.match_count("anything at all"), 0);
    }

    #[test]
    fn test_decide() {
        let set = rules(&[("Emission", false)]);
        let record = GazetteRecord::new(1, "CG-DL-E-240626-123456", "Emission norms amendment");
        let decision = set.decide(&record);
        assert!(decision.is_relevant);
        assert_eq!(decision.match_count, 1);
        assert_eq!(decision.entry_id, "CG-DL-E-240626-123456");
    }

    #[test]
    fn test_rule_file_round_trip() {
        let json = r#"[{"pattern": "Truck"}, {"pattern": "EV", "case_sensitive": true}]"#;
        let parsed: Vec<RelevanceRule> = serde_json::from_str(json).unwrap();
        let set = RuleSet::compile(parsed);
        assert_eq!(set.len(), 2);
        assert!(set.is_relevant("truck recall"));
        assert!(!set.is_relevant("seventh avenue"));
    }

    proptest! {
        #[test]
        fn match_count_is_order_independent(
            mut entries in proptest::collection::vec(("[a-zA-Z ]{1,8}", any::<bool>()), 0..8),
            text in "[a-zA-Z ]{0,64}",
        ) {
            let forward = rules(&entries.iter().map(|(p, c)| (p.as_str(), *c)).collect::<Vec<_>>());
            entries.reverse();
            let reversed = rules(&entries.iter().map(|(p, c)| (p.as_str(), *c)).collect::<Vec<_>>());
            prop_assert_eq!(forward.match_count(&text), reversed.match_count(&text));
        }

        #[test]
        fn match_count_is_deterministic(
            entries in proptest::collection::vec(("[a-zA-Z ]{1,8}", any::<bool>()), 0..8),
            text in "[a-zA-Z ]{0,64}",
        ) {
            let set = rules(&entries.iter().map(|(p, c)| (p.as_str(), *c)).collect::<Vec<_>>());
            prop_assert_eq!(set.match_count(&text), set.match_count(&text));
        }
    }
}
