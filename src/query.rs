// 🔎 Query Engine
// Pure filter + sort over the merged collection; re-run on every keystroke

use crate::card::{Card, Category};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

// ============================================================================
// QUERY OPTIONS
// ============================================================================

/// Which category toggles are switched on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySelection {
    pub mew: bool,
    pub cameo: bool,
    pub intl: bool,
}

impl CategorySelection {
    pub fn all() -> Self {
        CategorySelection { mew: true, cameo: true, intl: true }
    }

    pub fn none() -> Self {
        CategorySelection { mew: false, cameo: false, intl: false }
    }

    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Mew => self.mew,
            Category::Cameo => self.cameo,
            Category::Intl => self.intl,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.mew && !self.cameo && !self.intl
    }

    /// OR across enabled toggles
    pub fn matches(&self, card: &Card) -> bool {
        Category::ALL
            .iter()
            .any(|c| self.is_enabled(*c) && card.in_category(*c))
    }
}

impl Default for CategorySelection {
    fn default() -> Self {
        Self::all()
    }
}

/// Sort orders offered by the gallery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    ReleaseAsc,
    ReleaseDesc,
    YearAsc,
    #[default]
    YearDesc,
    Name,
    Rarity,
}

impl SortKey {
    pub fn code(&self) -> &str {
        match self {
            SortKey::ReleaseAsc => "release-asc",
            SortKey::ReleaseDesc => "release-desc",
            SortKey::YearAsc => "year-asc",
            SortKey::YearDesc => "year-desc",
            SortKey::Name => "name",
            SortKey::Rarity => "rarity",
        }
    }

    /// Parse a sort code, falling back to [`SortKey::YearDesc`]
    pub fn parse_or_default(raw: &str) -> SortKey {
        raw.parse::<SortKey>().unwrap_or_default()
    }
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "release-asc" => Ok(SortKey::ReleaseAsc),
            "release-desc" => Ok(SortKey::ReleaseDesc),
            "year-asc" => Ok(SortKey::YearAsc),
            "year-desc" => Ok(SortKey::YearDesc),
            "name" => Ok(SortKey::Name),
            "rarity" => Ok(SortKey::Rarity),
            other => Err(anyhow::anyhow!("Unknown sort key: {}", other)),
        }
    }
}

/// Everything the gallery controls feed into a query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub categories: CategorySelection,
    #[serde(default)]
    pub sort: SortKey,
}

// ============================================================================
// QUERY
// ============================================================================

/// Filter and sort cards for display
///
/// # Rules:
/// - No category enabled → empty result, whatever the text says
/// - Blank text matches everything; otherwise a case-insensitive substring
///   of any searchable field
/// - Sorting is stable: ties keep merge order
pub fn apply<'a>(cards: &'a [Card], options: &QueryOptions) -> Vec<&'a Card> {
    if options.categories.is_empty() {
        return Vec::new();
    }

    let needle = options.query.trim().to_lowercase();

    let mut result: Vec<&Card> = cards
        .iter()
        .filter(|card| options.categories.matches(card))
        .filter(|card| needle.is_empty() || matches_text(card, &needle))
        .collect();

    result.sort_by(|a, b| compare(a, b, options.sort));
    result
}

/// Case-insensitive search over names, number, set, rarity, notes and origin
///
/// `needle` must already be lowercase.
pub fn matches_text(card: &Card, needle: &str) -> bool {
    let fields = [
        Some(card.name_en.as_str()),
        card.name_jp.as_deref(),
        card.number.as_deref(),
        card.set.as_deref(),
        card.rarity.as_deref(),
        card.notes_en.as_deref(),
        card.notes_jp.as_deref(),
        card.origin_en.as_deref(),
        card.origin_jp.as_deref(),
    ];

    fields
        .iter()
        .flatten()
        .any(|value| value.to_lowercase().contains(needle))
}

fn compare(a: &Card, b: &Card, sort: SortKey) -> Ordering {
    match sort {
        SortKey::ReleaseAsc => compare_release(a, b, false),
        SortKey::ReleaseDesc => compare_release(a, b, true),
        SortKey::YearAsc => a.year.cmp(&b.year),
        SortKey::YearDesc => b.year.cmp(&a.year),
        SortKey::Name => collate(&a.name_en, &b.name_en),
        SortKey::Rarity => collate(
            a.rarity.as_deref().unwrap_or(""),
            b.rarity.as_deref().unwrap_or(""),
        ),
    }
}

/// Unknown release dates go last in both directions
fn compare_release(a: &Card, b: &Card, descending: bool) -> Ordering {
    match (a.released_at, b.released_at) {
        (Some(x), Some(y)) if descending => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Case-folded comparison with a raw tie-break
pub fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

// ============================================================================
// DETAIL & COUNTS
// ============================================================================

/// Detail view lookup
pub fn find_by_id<'a>(cards: &'a [Card], id: &str) -> Option<&'a Card> {
    cards.iter().find(|card| card.id == id)
}

/// Card count per category, for toggle badges
pub fn category_counts(cards: &[Card]) -> Vec<(Category, usize)> {
    Category::ALL
        .iter()
        .map(|c| (*c, cards.iter().filter(|card| card.in_category(*c)).count()))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
