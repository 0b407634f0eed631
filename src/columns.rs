// 🏛️ Column Resolver
// Header text is maintained by hand, so every field has a primary name and a list of aliases

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

// ============================================================================
// FIELDS
// ============================================================================

/// Canonical card fields a sheet column can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Id,
    NameEn,
    NameJp,
    NotesEn,
    NotesJp,
    OriginEn,
    OriginJp,
    Number,
    Set,
    Year,
    Release,
    Rarity,
    Types,
    Language,
    ImageFront,
    ImageBack,
    Illustrator,
    Era,
    IsMew,
    IsCameo,
    IsIntl,
    Edition,
    Psa8,
    Psa9,
    Psa10,
    BgsBl,
    Grade,
}

/// Header names accepted for one field, tried in order
#[derive(Debug, Clone, Copy)]
pub struct FieldAliases {
    pub field: Field,
    /// Preferred header text (lowercase)
    pub primary: &'static str,
    /// Fallbacks (lowercase), first match wins
    pub aliases: &'static [&'static str],
}

impl FieldAliases {
    /// Primary name followed by aliases
    pub fn candidates(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.primary).chain(self.aliases.iter().copied())
    }
}

const fn entry(
    field: Field,
    primary: &'static str,
    aliases: &'static [&'static str],
) -> FieldAliases {
    FieldAliases { field, primary, aliases }
}

/// Declarative header table, consulted once per sheet
pub const FIELD_TABLE: &[FieldAliases] = &[
    entry(Field::Id, "id", &[]),
    // ====================================================================
    // DISPLAY
    // ====================================================================
    entry(Field::NameEn, "name en", &["name", "name_en", "english name"]),
    entry(Field::NameJp, "name jp", &["name_jp", "japanese name"]),
    // ====================================================================
    // NARRATIVE
    // ====================================================================
    entry(Field::NotesEn, "notes en", &["notes", "notes_en"]),
    entry(Field::NotesJp, "notes jp", &["notes_jp"]),
    entry(Field::OriginEn, "origin en", &["origin", "origin_en"]),
    entry(Field::OriginJp, "origin jp", &["origin_jp"]),
    entry(Field::Illustrator, "illustrator", &["artist"]),
    entry(Field::Era, "era", &[]),
    // ====================================================================
    // CLASSIFICATION
    // ====================================================================
    entry(Field::Number, "number", &["no", "card number", "#"]),
    entry(Field::Set, "set", &["set name", "expansion"]),
    entry(Field::Year, "year", &[]),
    entry(Field::Release, "release", &["release date", "released"]),
    entry(Field::Rarity, "rarity", &[]),
    entry(Field::Types, "types", &["type"]),
    entry(Field::Language, "language", &["lang"]),
    entry(Field::Edition, "edition", &[]),
    // ====================================================================
    // MEDIA
    // ====================================================================
    entry(Field::ImageFront, "image front", &["image", "front", "image url"]),
    entry(Field::ImageBack, "image back", &["back"]),
    // ====================================================================
    // CATEGORY FLAGS
    // ====================================================================
    entry(Field::IsMew, "ismew", &["mew"]),
    entry(Field::IsCameo, "iscameo", &["cameo"]),
    entry(Field::IsIntl, "isintl", &["intl", "international"]),
    // ====================================================================
    // GRADING & POPULATION
    // ====================================================================
    entry(Field::Psa8, "psa8", &["psa 8"]),
    entry(Field::Psa9, "psa9", &["psa 9"]),
    entry(Field::Psa10, "psa10", &["psa 10"]),
    entry(Field::BgsBl, "bgsbl", &["bgs bl", "bgs black label"]),
    entry(Field::Grade, "grade", &["grade code", "grading"]),
];

// ============================================================================
// COLUMN MAP
// ============================================================================

/// Resolved field → column position for one sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    indices: HashMap<Field, usize>,
}

impl ColumnMap {
    /// Resolve a header row against [`FIELD_TABLE`]
    ///
    /// Matching is case-insensitive on the whole header text. Unmatched
    /// fields stay absent; that is never an error.
    pub fn resolve(header: &[String]) -> Self {
        let normalized: Vec<String> = header
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let mut indices = HashMap::new();

        for entry in FIELD_TABLE {
            let found = entry
                .candidates()
                .find_map(|name| normalized.iter().position(|h| h == name));

            if let Some(index) = found {
                indices.insert(entry.field, index);
            }
        }

        let map = ColumnMap { indices };
        let missing = map.missing_fields();
        if !missing.is_empty() {
            debug!("Sheet header has no column for {:?}", missing);
        }

        map
    }

    /// Column position of a field, if the header had one
    pub fn index(&self, field: Field) -> Option<usize> {
        self.indices.get(&field).copied()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.indices.contains_key(&field)
    }

    /// Raw cell text for a field; `""` when unresolved or past the row end
    pub fn cell<'a>(&self, row: &'a [String], field: Field) -> &'a str {
        self.index(field)
            .and_then(|i| row.get(i))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    /// Cell text for a field, `None` when the cell is empty or missing
    pub fn value<'a>(&self, row: &'a [String], field: Field) -> Option<&'a str> {
        let cell = self.cell(row, field).trim();
        if cell.is_empty() {
            None
        } else {
            Some(cell)
        }
    }

    /// Fields in table order that found no column
    pub fn missing_fields(&self) -> Vec<Field> {
        FIELD_TABLE
            .iter()
            .map(|entry| entry.field)
            .filter(|field| !self.contains(*field))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_case_insensitive_primary() {
        let map = ColumnMap::resolve(&header(&["Name EN", "NAME JP", "Set"]));

        assert_eq!(map.index(Field::NameEn), Some(0));
        assert_eq!(map.index(Field::NameJp), Some(1));
        assert_eq!(map.index(Field::Set), Some(2));
    }

    #[test]
    fn test_alias_fallback() {
        let map = ColumnMap::resolve(&header(&["Name", "Image", "Artist"]));

        assert_eq!(map.index(Field::NameEn), Some(0));
        assert_eq!(map.index(Field::ImageFront), Some(1));
        assert_eq!(map.index(Field::Illustrator), Some(2));
    }

    #[test]
    fn test_primary_wins_over_alias() {
        // "name" comes first in the header but "name en" is the primary
        let map = ColumnMap::resolve(&header(&["name", "name en"]));

        assert_eq!(map.index(Field::NameEn), Some(1));
    }

    #[test]
    fn test_alias_order_respected() {
        let map = ColumnMap::resolve(&header(&["image url", "front"]));

        // "front" is listed before "image url"
        assert_eq!(map.index(Field::ImageFront), Some(1));
    }

    #[test]
    fn test_full_header_text_only() {
        // Substrings are not matches
        let map = ColumnMap::resolve(&header(&["card name en", "years"]));

        assert!(!map.contains(Field::NameEn));
        assert!(!map.contains(Field::Year));
    }

    #[test]
    fn test_unresolved_cells_are_empty() {
        let map = ColumnMap::resolve(&header(&["name en", "set"]));
        let row = header(&["Mew"]);

        assert_eq!(map.cell(&row, Field::NameEn), "Mew");
        // Resolved but past the end of a short row
        assert_eq!(map.cell(&row, Field::Set), "");
        assert_eq!(map.value(&row, Field::Set), None);
        // Never resolved
        assert_eq!(map.cell(&row, Field::Rarity), "");
    }

    #[test]
    fn test_missing_fields_listed() {
        let map = ColumnMap::resolve(&header(&["name en"]));

        let missing = map.missing_fields();
        assert!(!missing.contains(&Field::NameEn));
        assert!(missing.contains(&Field::Grade));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_table_has_unique_fields() {
        let mut seen = std::collections::HashSet::new();
        for entry in FIELD_TABLE {
            assert!(seen.insert(entry.field), "duplicate entry for {:?}", entry.field);
            assert_eq!(entry.primary, entry.primary.to_lowercase());
        }
        assert_eq!(seen.len(), 27);
    }
}
