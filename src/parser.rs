// 🧾 Delimited-Text Parser
// Sheet exports → rows of trimmed cells. Never fails, whatever the sheet looks like.

use csv::{ReaderBuilder, Terminator, Trim};
use tracing::warn;

/// UTF-8 byte-order marker some spreadsheet exports prepend
const BOM: char = '\u{feff}';

/// One parsed row: trimmed, unescaped cell values in column order
pub type Row = Vec<String>;

// ============================================================================
// PARSING
// ============================================================================

/// Parse comma-separated text into rows of trimmed cells
///
/// # Behavior:
/// - Leading BOM is stripped before anything else
/// - `"` quotes a field, `""` inside a quoted field is a literal quote
/// - Spaces or tabs before an opening quote are dropped, so `a, "x, y"` is
///   still two fields
/// - `\n`, `\r\n` and bare `\r` all end a row
/// - Rows whose cells are all empty are dropped (blank lines, `,,,`)
/// - An unterminated quote swallows the rest of the input as quoted content
///
/// Rows may have different widths; callers must bounds-check.
///
/// # Example:
/// ```
/// use card_gallery::parser::parse_rows;
///
/// let rows = parse_rows("name,set\r\n\"Mew, Promo\",Base\n");
/// assert_eq!(rows[1], vec!["Mew, Promo".to_string(), "Base".to_string()]);
/// ```
pub fn parse_rows(text: &str) -> Vec<Row> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let text = strip_space_before_quotes(text);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .terminator(Terminator::CRLF)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();

    for (line_num, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping unreadable row {}: {}", line_num + 1, e);
                continue;
            }
        };

        let row: Row = record.iter().map(|cell| cell.to_string()).collect();

        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        rows.push(row);
    }

    rows
}

/// Where the scanner is relative to the current field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    FieldStart,
    Unquoted,
    Quoted,
    /// A `"` inside a quoted field: either an escape or the closing quote
    QuoteSeen,
}

/// Drop blanks between a field boundary and an opening quote
///
/// The csv reader only honours a quote as the first byte of a field. Quoted
/// content and blanks in unquoted fields pass through untouched; `Trim::All`
/// takes care of those after parsing.
fn strip_space_before_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blanks = String::new();
    let mut state = Scan::FieldStart;

    for ch in text.chars() {
        state = match (state, ch) {
            (Scan::FieldStart, ' ' | '\t') => {
                blanks.push(ch);
                continue;
            }
            (Scan::FieldStart, '"') => {
                blanks.clear();
                Scan::Quoted
            }
            (Scan::Quoted, '"') => Scan::QuoteSeen,
            (Scan::Quoted, _) => Scan::Quoted,
            (Scan::QuoteSeen, '"') => Scan::Quoted,
            (_, ',' | '\n' | '\r') => Scan::FieldStart,
            _ => Scan::Unquoted,
        };

        out.push_str(&blanks);
        blanks.clear();
        out.push(ch);
    }

    out.push_str(&blanks);
    out
}

/// Split parsed rows into (header, data rows)
///
/// Returns `None` when there is no data row under the header: such a sheet
/// contributes no cards.
pub fn split_header(rows: &[Row]) -> Option<(&Row, &[Row])> {
    match rows {
        [header, data @ ..] if !data.is_empty() => Some((header, data)),
        _ => None,
    }
}

// ============================================================================
// TESTS
// ============================================================================
