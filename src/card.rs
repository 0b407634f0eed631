// 🃏 Record Builder
// One sheet row + resolved columns → normalized Card (or skip)

use crate::columns::{ColumnMap, Field};
use crate::parser::{parse_rows, split_header};
use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Image value used when a row has no artwork
pub const PLACEHOLDER_IMAGE: &str = "placeholder";

// ============================================================================
// CATEGORY
// ============================================================================

/// Category - Which sheet (tab) a card came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Mew,
    Cameo,
    Intl,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Mew, Category::Cameo, Category::Intl];

    /// Human-readable name for display
    pub fn name(&self) -> &str {
        match self {
            Category::Mew => "Mew",
            Category::Cameo => "Cameo",
            Category::Intl => "International",
        }
    }

    /// Short code used as the id prefix
    pub fn code(&self) -> &str {
        match self {
            Category::Mew => "mew",
            Category::Cameo => "cameo",
            Category::Intl => "intl",
        }
    }
}

// ============================================================================
// VALUE TYPES
// ============================================================================

/// Print edition, a closed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edition {
    #[serde(rename = "1st Edition")]
    FirstEdition,
    #[serde(rename = "Shadowless")]
    Shadowless,
    #[serde(rename = "Unlimited")]
    Unlimited,
}

impl Edition {
    /// Lenient parse of the edition column; unknown spellings are `None`
    pub fn parse(raw: &str) -> Option<Edition> {
        match raw.trim().to_lowercase().as_str() {
            "1st" | "1st edition" | "first edition" | "1ed" => Some(Edition::FirstEdition),
            "shadowless" => Some(Edition::Shadowless),
            "unlimited" => Some(Edition::Unlimited),
            _ => None,
        }
    }
}

/// Normalized grade code: `RAW` or `PSA1`..`PSA10`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Grade {
    Raw,
    Psa(u8),
}

impl Grade {
    /// Normalize free-text grade input
    ///
    /// # Examples:
    /// ```
    /// use card_gallery::card::Grade;
    ///
    /// assert_eq!(Grade::parse("psa 9"), Some(Grade::Psa(9)));
    /// assert_eq!(Grade::parse(" raw "), Some(Grade::Raw));
    /// assert_eq!(Grade::parse("PSA11"), None);
    /// ```
    pub fn parse(raw: &str) -> Option<Grade> {
        let upper = raw.trim().to_uppercase();

        if upper == "RAW" {
            return Some(Grade::Raw);
        }

        let rest = upper.strip_prefix("PSA")?;
        let digits = rest.strip_prefix(' ').unwrap_or(rest);

        if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let value: u8 = digits.parse().ok()?;
        if (1..=10).contains(&value) {
            Some(Grade::Psa(value))
        } else {
            None
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::Raw => write!(f, "RAW"),
            Grade::Psa(n) => write!(f, "PSA{}", n),
        }
    }
}

impl From<Grade> for String {
    fn from(grade: Grade) -> Self {
        grade.to_string()
    }
}

impl TryFrom<String> for Grade {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Grade::parse(&value).ok_or_else(|| anyhow!("Invalid grade code: {}", value))
    }
}

/// Graded population counts
///
/// Only built when at least one value is known, so an absent population
/// means "no data" and a present one with zeros means "confirmed zero".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Population {
    pub psa8: u32,
    pub psa9: u32,
    pub psa10: u32,
    #[serde(rename = "bgsBL")]
    pub bgs_bl: Option<u32>,
}

impl Population {
    pub fn from_counts(psa8: u32, psa9: u32, psa10: u32, bgs_bl: Option<u32>) -> Option<Self> {
        if psa8 == 0 && psa9 == 0 && psa10 == 0 && bgs_bl.is_none() {
            return None;
        }
        Some(Population { psa8, psa9, psa10, bgs_bl })
    }
}

// ============================================================================
// CARD
// ============================================================================

/// Card - One normalized trading card entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Raw sheet id until merge, then the merged slug
    pub id: String,

    #[serde(rename = "nameEN")]
    pub name_en: String,
    #[serde(rename = "nameJP", skip_serializing_if = "Option::is_none")]
    pub name_jp: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set: Option<String>,
    /// 0 when the sheet value is missing or not a number
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edition: Option<Edition>,

    pub image: String,
    #[serde(rename = "imageBack", skip_serializing_if = "Option::is_none")]
    pub image_back: Option<String>,

    #[serde(rename = "notesEN", skip_serializing_if = "Option::is_none")]
    pub notes_en: Option<String>,
    #[serde(rename = "notesJP", skip_serializing_if = "Option::is_none")]
    pub notes_jp: Option<String>,
    #[serde(rename = "originEN", skip_serializing_if = "Option::is_none")]
    pub origin_en: Option<String>,
    #[serde(rename = "originJP", skip_serializing_if = "Option::is_none")]
    pub origin_jp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub illustrator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub era: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<Population>,

    // None = the sheet did not say, distinct from an explicit false
    #[serde(rename = "isMew", skip_serializing_if = "Option::is_none")]
    pub is_mew: Option<bool>,
    #[serde(rename = "isCameo", skip_serializing_if = "Option::is_none")]
    pub is_cameo: Option<bool>,
    #[serde(rename = "isIntl", skip_serializing_if = "Option::is_none")]
    pub is_intl: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<Grade>,

    /// Derived from `release`, else January 1 of `year`; None = unknown
    #[serde(rename = "releasedAt", skip_serializing_if = "Option::is_none")]
    pub released_at: Option<DateTime<Utc>>,
}

impl Card {
    /// Create a card with only a display name; everything else unknown
    pub fn new(name_en: impl Into<String>) -> Self {
        Card {
            id: String::new(),
            name_en: name_en.into(),
            name_jp: None,
            number: None,
            set: None,
            year: 0,
            release: None,
            rarity: None,
            types: Vec::new(),
            language: None,
            edition: None,
            image: PLACEHOLDER_IMAGE.to_string(),
            image_back: None,
            notes_en: None,
            notes_jp: None,
            origin_en: None,
            origin_jp: None,
            illustrator: None,
            era: None,
            population: None,
            is_mew: None,
            is_cameo: None,
            is_intl: None,
            grade: None,
            released_at: None,
        }
    }

    /// Flag value for a category as the sheet stated it
    pub fn flag(&self, category: Category) -> Option<bool> {
        match category {
            Category::Mew => self.is_mew,
            Category::Cameo => self.is_cameo,
            Category::Intl => self.is_intl,
        }
    }

    pub fn set_flag(&mut self, category: Category, value: bool) {
        let slot = match category {
            Category::Mew => &mut self.is_mew,
            Category::Cameo => &mut self.is_cameo,
            Category::Intl => &mut self.is_intl,
        };
        *slot = Some(value);
    }

    /// True only for an explicit `true` flag
    pub fn in_category(&self, category: Category) -> bool {
        self.flag(category) == Some(true)
    }

    pub fn has_placeholder_image(&self) -> bool {
        self.image == PLACEHOLDER_IMAGE
    }

    // ========================================================================
    // BUILDING
    // ========================================================================

    /// Build a card from one data row
    ///
    /// Returns `None` when neither name column yields a display name; such
    /// rows are dropped entirely.
    pub fn from_row(columns: &ColumnMap, row: &[String]) -> Option<Card> {
        let text = |field: Field| columns.value(row, field).map(|s| s.to_string());

        let name_jp = text(Field::NameJp);
        let name_en = text(Field::NameEn).or_else(|| name_jp.clone())?;

        let year = parse_leading_int(columns.cell(row, Field::Year))
            .and_then(|y| i32::try_from(y).ok())
            .unwrap_or(0);
        let release = text(Field::Release);
        let released_at = release_timestamp(release.as_deref(), year);

        let population = Population::from_counts(
            parse_count(columns.cell(row, Field::Psa8)),
            parse_count(columns.cell(row, Field::Psa9)),
            parse_count(columns.cell(row, Field::Psa10)),
            parse_leading_int(columns.cell(row, Field::BgsBl))
                .and_then(|n| u32::try_from(n).ok()),
        );

        Some(Card {
            id: columns.cell(row, Field::Id).to_string(),
            name_en,
            name_jp,
            number: text(Field::Number),
            set: text(Field::Set),
            year,
            release,
            rarity: text(Field::Rarity),
            types: split_types(columns.cell(row, Field::Types)),
            language: text(Field::Language),
            edition: columns.value(row, Field::Edition).and_then(Edition::parse),
            image: text(Field::ImageFront).unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            image_back: text(Field::ImageBack),
            notes_en: text(Field::NotesEn),
            notes_jp: text(Field::NotesJp),
            origin_en: text(Field::OriginEn),
            origin_jp: text(Field::OriginJp),
            illustrator: text(Field::Illustrator),
            era: text(Field::Era),
            population,
            is_mew: parse_flag(columns.cell(row, Field::IsMew)),
            is_cameo: parse_flag(columns.cell(row, Field::IsCameo)),
            is_intl: parse_flag(columns.cell(row, Field::IsIntl)),
            grade: Grade::parse(columns.cell(row, Field::Grade)),
            released_at,
        })
    }
}

/// Parse one sheet's text into cards
///
/// Header is resolved once, then every data row is built. Sheets with no
/// data row yield nothing.
pub fn parse_sheet(text: &str) -> Vec<Card> {
    let rows = parse_rows(text);

    let Some((header, data)) = split_header(&rows) else {
        debug!("Sheet has no data rows ({} rows parsed)", rows.len());
        return Vec::new();
    };

    let columns = ColumnMap::resolve(header);
    let cards: Vec<Card> = data
        .iter()
        .filter_map(|row| Card::from_row(&columns, row))
        .collect();

    let skipped = data.len() - cards.len();
    if skipped > 0 {
        debug!("Skipped {} rows without a display name", skipped);
    }

    cards
}

// ============================================================================
// COERCION HELPERS
// ============================================================================

/// Leading integer of a cell (`"1999 (JP)"` → 1999), `None` if there is none
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());

    if end == 0 {
        return None;
    }

    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn parse_count(raw: &str) -> u32 {
    parse_leading_int(raw)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}

/// `true`/`1` and `false`/`0` (any case); everything else is unspecified
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Pipe-delimited types, trimmed, empties dropped
pub fn split_types(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Release instant: parsed `release` text, else Jan 1 of a positive year
pub fn release_timestamp(release: Option<&str>, year: i32) -> Option<DateTime<Utc>> {
    release
        .and_then(parse_release_date)
        .or_else(|| start_of_year(year))
}

fn start_of_year(year: i32) -> Option<DateTime<Utc>> {
    if year <= 0 {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year, 1, 1)?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Month-and-year forms ("July 2000"), parsed with a day of 1 appended
const MONTH_YEAR_FORMATS: &[&str] = &["%B %Y %d", "%b %Y %d"];

/// Generic date parsing for free-text release values (UTC midnight)
pub fn parse_release_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let date = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            let first_of_month = format!("{} 1", s);
            MONTH_YEAR_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(&first_of_month, fmt).ok())
        })
        .or_else(|| NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").ok())
        .or_else(|| {
            if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
                s.parse().ok().and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
            } else {
                None
            }
        })?;

    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

// ============================================================================
// TESTS
// ============================================================================
