// 🔀 Multi-Source Merger
// Sheets are concatenated, never de-duplicated. The same card in two tabs is two entries.

use crate::card::{Card, Category};
use std::collections::HashSet;

/// Slug for one id component: lowercase alphanumerics joined by `-`
///
/// Non-ASCII letters (e.g. Japanese names) are kept as-is.
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_dash = false;

    for ch in raw.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Deterministic id for the `index`-th card of a `category` sheet
pub fn card_id(category: Category, card: &Card, index: usize) -> String {
    let parts = [
        category.code().to_string(),
        slugify(&card.name_en),
        slugify(card.set.as_deref().unwrap_or("")),
        slugify(card.number.as_deref().unwrap_or("")),
        card.year.to_string(),
        index.to_string(),
    ];

    parts
        .iter()
        .filter(|p| !p.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join("-")
}

/// Merge per-sheet cards into one collection
///
/// # Rules:
/// - Sheets are concatenated in the order given, row order kept
/// - Every card gets a fresh id (any id column value is discarded)
/// - The flag for the sheet's category is forced to `true`, whatever the
///   flag column said; sheet membership wins
/// - No de-duplication across sheets
///
/// Ids are unique in the result even when a category is supplied twice.
pub fn merge_sources<I>(sources: I) -> Vec<Card>
where
    I: IntoIterator<Item = (Category, Vec<Card>)>,
{
    let mut merged = Vec::new();
    let mut seen = HashSet::new();

    for (category, cards) in sources {
        for (index, mut card) in cards.into_iter().enumerate() {
            let base = card_id(category, &card, index);

            let mut id = base.clone();
            let mut suffix = 2;
            while seen.contains(&id) {
                id = format!("{}-{}", base, suffix);
                suffix += 1;
            }
            seen.insert(id.clone());

            card.id = id;
            card.set_flag(category, true);
            merged.push(card);
        }
    }

    merged
}

// ============================================================================
// TESTS
// ============================================================================
