//! Category codes and the session-scoped code/name lookup.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque identifier for one worklist entry, as assigned by the search form.
///
/// Two reserved codes route to the secondary standards source instead of the
/// gazette search; see [`CategoryCode::standards_edition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryCode(pub u32);

/// Which edition of the secondary standards listing a sentinel code selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardsEdition {
    Draft,
    Published,
}

impl StandardsEdition {
    /// The sentinel category code for this edition.
    pub fn category_code(self) -> CategoryCode {
        match self {
            StandardsEdition::Draft => CategoryCode::DRAFT_STANDARDS,
            StandardsEdition::Published => CategoryCode::PUBLISHED_STANDARDS,
        }
    }

    /// Display name, also the directory the edition's files land in.
    pub fn name(self) -> &'static str {
        match self {
            StandardsEdition::Draft => "ARAI - AIS - draft",
            StandardsEdition::Published => "ARAI - AIS - published",
        }
    }
}

impl CategoryCode {
    /// Sentinel code for the draft standards listing.
    pub const DRAFT_STANDARDS: CategoryCode = CategoryCode(9999);

    /// Sentinel code for the published standards listing.
    pub const PUBLISHED_STANDARDS: CategoryCode = CategoryCode(9998);

    /// Returns the standards edition this code routes to, if it is one of
    /// the two sentinel codes.
    pub fn standards_edition(self) -> Option<StandardsEdition> {
        match self {
            CategoryCode::DRAFT_STANDARDS => Some(StandardsEdition::Draft),
            CategoryCode::PUBLISHED_STANDARDS => Some(StandardsEdition::Published),
            _ => None,
        }
    }
}

impl std::fmt::Display for CategoryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CategoryCode {
    fn from(value: u32) -> Self {
        CategoryCode(value)
    }
}

/// Bidirectional code/name lookup, built once per session from the site's
/// current option set and immutable afterwards.
///
/// Iteration follows the site's option order, so worklists and progress
/// reporting keep the order the user saw.
#[derive(Debug, Clone, Default)]
pub struct CategoryMap {
    by_code: IndexMap<CategoryCode, String>,
    by_name: HashMap<String, CategoryCode>,
}

impl CategoryMap {
    /// Create a map pre-seeded with the two secondary-source sentinels.
    pub fn new() -> Self {
        let mut map = Self {
            by_code: IndexMap::new(),
            by_name: HashMap::new(),
        };
        for edition in [StandardsEdition::Draft, StandardsEdition::Published] {
            map.insert(edition.category_code(), edition.name());
        }
        map
    }

    /// Build a seeded map from the site's parsed option set.
    pub fn from_options(options: impl IntoIterator<Item = (u32, String)>) -> Self {
        let mut map = Self::new();
        for (value, name) in options {
            map.insert(CategoryCode(value), name);
        }
        map
    }

    fn insert(&mut self, code: CategoryCode, name: impl Into<String>) {
        let name = name.into();
        self.by_name.insert(name.clone(), code);
        self.by_code.insert(code, name);
    }

    /// Display name for a code, falling back to `"Category <code>"` for
    /// codes the site never listed.
    pub fn name_of(&self, code: CategoryCode) -> String {
        self.by_code
            .get(&code)
            .cloned()
            .unwrap_or_else(|| format!("Category {}", code))
    }

    /// Code for a display name, if the site listed it.
    pub fn code_of(&self, name: &str) -> Option<CategoryCode> {
        self.by_name.get(name).copied()
    }

    /// Resolve a user-selected list of display names back to codes,
    /// preserving order. Unknown names are returned separately.
    pub fn codes_for<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> (Vec<CategoryCode>, Vec<String>) {
        let mut codes = Vec::new();
        let mut unknown = Vec::new();
        for name in names {
            match self.code_of(name) {
                Some(code) => codes.push(code),
                None => unknown.push(name.to_string()),
            }
        }
        (codes, unknown)
    }

    /// All codes in site option order (sentinels first).
    pub fn codes(&self) -> impl Iterator<Item = CategoryCode> + '_ {
        self.by_code.keys().copied()
    }

    /// Number of known categories, sentinels included.
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    /// True when only the seeded sentinels are present.
    pub fn is_empty(&self) -> bool {
        self.by_code.len() <= 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_are_seeded() {
        let map = CategoryMap::new();
        assert_eq!(map.name_of(CategoryCode::DRAFT_STANDARDS), "ARAI - AIS - draft");
        assert_eq!(
            map.code_of("ARAI - AIS - published"),
            Some(CategoryCode::PUBLISHED_STANDARDS)
        );
    }

    #[test]
    fn test_round_trip_lookup() {
        let map = CategoryMap::from_options([
            (133, "Ministry of Road Transport".to_string()),
            (9, "Ministry of Heavy Industries".to_string()),
        ]);

        assert_eq!(map.name_of(CategoryCode(133)), "Ministry of Road Transport");
        assert_eq!(map.code_of("Ministry of Heavy Industries"), Some(CategoryCode(9)));
        assert_eq!(map.name_of(CategoryCode(42)), "Category 42");
    }

    #[test]
    fn test_codes_for_preserves_order_and_reports_unknowns() {
        let map = CategoryMap::from_options([
            (133, "Roads".to_string()),
            (9, "Industry".to_string()),
        ]);

        let (codes, unknown) = map.codes_for(["Industry", "Nope", "Roads"]);
        assert_eq!(codes, vec![CategoryCode(9), CategoryCode(133)]);
        assert_eq!(unknown, vec!["Nope".to_string()]);
    }

    #[test]
    fn test_standards_routing() {
        assert_eq!(
            CategoryCode(9999).standards_edition(),
            Some(StandardsEdition::Draft)
        );
        assert_eq!(
            CategoryCode(9998).standards_edition(),
            Some(StandardsEdition::Published)
        );
        assert_eq!(CategoryCode(133).standards_edition(), None);
    }
}
