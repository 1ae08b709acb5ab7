// 🏗️ Offset Parser - candidate lines → RawRecord
//
// Two steps:
//   1. Line filter: loose pre-filter on the literal marker "Offset: Value"
//   2. Record parser: strict fixed grammar per line, None when it doesn't fit
//
// Una línea que no matchea NO es un error: simplemente no aporta filas.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Literal marker every offset line carries (case-sensitive)
pub const OFFSET_MARKER: &str = "Offset: Value";

// ============================================================================
// GRAMMAR
// ============================================================================

// Fecha, hora + AM/PM, entity, characteristic, texto intermedio (no codicioso),
// "Offset: Value" con espacios tolerantes, y (old -> new).
// Entity/characteristic stay ASCII even under (?i).
static OFFSET_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)",
        r"(\d{1,2}/\d{1,2}/\d{4})\s+",
        r"(\d{1,2}:\d{2}:\d{2})\s*([AP]M)\s+",
        r"((?-i:[A-Za-z0-9_-]+))\s+",
        r"((?-i:[A-Za-z0-9_-]+))\s*",
        r".*?",
        r"Offset\s*:\s*Value\s*",
        r"\(\s*(-?\d+\.?\d*)\s*->\s*(-?\d+\.?\d*)\s*\)",
    ))
    .expect("offset line grammar is a valid regex")
});

static DECIMAL_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\p{Nd}$").expect("decimal digit class is a valid regex"));

// ============================================================================
// CORE TYPES
// ============================================================================

/// RawRecord - one offset change recovered from one line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// D/M/YYYY as written in the report
    pub date: String,
    /// "H:MM:SS AM|PM"
    pub time: String,
    pub entity: String,
    pub characteristic: String,
    pub old_value: f64,
    pub new_value: f64,
    /// Trailing user token, empty when the line has none
    pub user: String,
}

// ============================================================================
// LINE FILTER
// ============================================================================

/// Keep only lines containing the offset marker, in original order.
pub fn filter_candidate_lines(text: &str) -> Vec<&str> {
    text.split(is_line_break)
        .filter(|line| line.contains(OFFSET_MARKER))
        .collect()
}

/// Every line boundary, not just '\n': CR, VT, FF, the ASCII separators
/// 0x1C-0x1E, NEL, LINE and PARAGRAPH SEPARATOR.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}'
            | '\u{2028}' | '\u{2029}'
    )
}

// ============================================================================
// RECORD PARSER
// ============================================================================

/// Parse one line. `None` when the grammar doesn't match or a numeric
/// literal can't be read as f64.
pub fn parse_line(line: &str) -> Option<RawRecord> {
    let line = line.trim();
    let caps = OFFSET_LINE.captures(line)?;

    let old_value = parse_number(&caps[6])?;
    let new_value = parse_number(&caps[7])?;

    Some(RawRecord {
        date: caps[1].to_string(),
        time: format!("{} {}", &caps[2], &caps[3]),
        entity: caps[4].to_string(),
        characteristic: caps[5].to_string(),
        old_value,
        new_value,
        user: extract_user(line),
    })
}

/// Numeric literal → f64. Any Unicode decimal digit counts as its ASCII
/// value, so "١٢" reads as 12.
fn parse_number(literal: &str) -> Option<f64> {
    if literal.is_ascii() {
        return literal.parse().ok();
    }
    let ascii: String = literal
        .chars()
        .map(|c| decimal_value(c).and_then(|d| char::from_digit(d, 10)).unwrap_or(c))
        .collect();
    ascii.parse().ok()
}

/// Value of a Unicode decimal digit. Decimal digits are assigned in runs of
/// ten starting at zero, so the value is the offset from the run start.
fn decimal_value(c: char) -> Option<u32> {
    if c.is_ascii_digit() {
        return c.to_digit(10);
    }
    if !is_decimal_digit(c) {
        return None;
    }
    let mut start = c as u32;
    while let Some(prev) = start.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        start -= 1;
    }
    Some((c as u32 - start) % 10)
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DECIMAL_DIGIT.is_match(c.encode_utf8(&mut buf))
}

/// Last whitespace-delimited token after the last ')' on the line.
///
/// "... Offset: Value (a -> b) CESAR" → "CESAR". Deliberately naive: any
/// trailing words are taken at face value.
pub fn extract_user(line: &str) -> String {
    line.rsplit_once(')')
        .and_then(|(_, tail)| tail.split_whitespace().last())
        .unwrap_or("")
        .to_string()
}

/// Trim candidate lines, drop blanks, parse what fits.
pub fn parse_lines<'a, I>(lines: I) -> Vec<RawRecord>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let record = parse_line(line);
            if record.is_none() {
                debug!(line, "skipping line that does not match the offset grammar");
            }
            record
        })
        .collect()
}

/// Line filter + record parser over a whole text blob.
pub fn parse_text(text: &str) -> Vec<RawRecord> {
    parse_lines(filter_candidate_lines(text))
}
