//! Cell: the typed value stored in one column of a result row.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

/// Literal forms that result extractors use for SQL NULL.
pub const NULL_TOKENS: [&str; 3] = ["NULL", "<NULL>", "\\N"];

/// Integral numbers below this magnitude render without a fractional part.
const INTEGRAL_DISPLAY_LIMIT: f64 = 1e15;

/// A single result value.
///
/// Cells are classified once at ingestion. Comparison code never re-probes
/// the textual form to decide whether something is a number.
#[derive(Debug, Clone)]
pub enum Cell {
    /// SQL NULL.
    Null,
    /// Integer or floating value.
    Number(f64),
    /// Anything that is neither NULL nor a numeric literal.
    Text(String),
}

impl Cell {
    /// Create a number cell. `-0.0` is stored as `0.0`.
    pub fn number(value: f64) -> Self {
        Cell::Number(canonical_zero(value))
    }

    /// Create a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Classify a raw token as produced by a result extractor.
    ///
    /// NULL markers become [`Cell::Null`], integer and floating literals
    /// become [`Cell::Number`], everything else is [`Cell::Text`].
    ///
    /// Numbers are held as `f64`. Integers beyond 2^53 lose their low digits,
    /// so `9007199254740993` and `9007199254740992` classify to the same cell
    /// and a difference between them is not reported.
    pub fn classify(token: &str) -> Self {
        if NULL_TOKENS.contains(&token) {
            return Cell::Null;
        }
        if is_numeric_literal(token) {
            if let Ok(value) = token.parse::<f64>() {
                return Cell::number(value);
            }
        }
        Cell::Text(token.to_string())
    }

    /// Returns true if this is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Returns true if this is a number.
    pub fn is_number(&self) -> bool {
        matches!(self, Cell::Number(_))
    }

    /// Returns true if this is text.
    pub fn is_text(&self) -> bool {
        matches!(self, Cell::Text(_))
    }

    /// Get the numeric value, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the text value, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Textual form used by lexical comparison and reports.
    pub fn textual(&self) -> Cow<'_, str> {
        match self {
            Cell::Null => Cow::Borrowed("NULL"),
            Cell::Number(v) => Cow::Owned(format_number(*v)),
            Cell::Text(s) => Cow::Borrowed(s),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Cell::Null => 0,
            Cell::Number(_) => 1,
            Cell::Text(_) => 2,
        }
    }
}

/// Compare two numbers under a total order where `-0.0 == 0.0`.
pub(crate) fn cmp_numbers(a: f64, b: f64) -> Ordering {
    canonical_zero(a).total_cmp(&canonical_zero(b))
}

fn canonical_zero(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < INTEGRAL_DISPLAY_LIMIT {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

/// Optional sign, digits with optional fraction, optional exponent.
fn is_numeric_literal(token: &str) -> bool {
    let bytes = token.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;

    let mut frac_digits = 0;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        frac_digits = i - frac_start;
    }

    if int_digits + frac_digits == 0 {
        return false;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}

// Structural equality: NULL = NULL, numeric equality, exact string equality.
impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cell {}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Structural order `Null < Number < Text`, used for keyed maps and
/// deterministic report ordering. Normalization uses its own comparator.
impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Cell::Number(a), Cell::Number(b)) => cmp_numbers(*a, *b),
            (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{:?}", s),
            other => f.write_str(&other.textual()),
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::number(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Number(v as f64)
    }
}

impl From<i32> for Cell {
    fn from(v: i32) -> Self {
        Cell::Number(f64::from(v))
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Cell::Null, Into::into)
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Null => serializer.serialize_none(),
            Cell::Number(v) => {
                if v.is_finite() && v.fract() == 0.0 && v.abs() < INTEGRAL_DISPLAY_LIMIT {
                    serializer.serialize_i64(*v as i64)
                } else {
                    serializer.serialize_f64(*v)
                }
            }
            Cell::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CellVisitor)
    }
}

struct CellVisitor;

impl<'de> Visitor<'de> for CellVisitor {
    type Value = Cell;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("null, a number, or a string")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Cell, E> {
        Ok(Cell::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Cell, E> {
        Ok(Cell::Null)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Cell, E> {
        Ok(Cell::Number(if v { 1.0 } else { 0.0 }))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Cell, E> {
        Ok(Cell::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Cell, E> {
        Ok(Cell::Number(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Cell, E> {
        Ok(Cell::number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Cell, E> {
        Ok(Cell::classify(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_null_tokens() {
        for token in NULL_TOKENS {
            assert!(Cell::classify(token).is_null(), "{} should be NULL", token);
        }
        // Lowercase is data, not a marker.
        assert_eq!(Cell::classify("null"), Cell::text("null"));
    }

    #[test]
    fn test_classify_numbers() {
        assert_eq!(Cell::classify("42"), Cell::Number(42.0));
        assert_eq!(Cell::classify("-7"), Cell::Number(-7.0));
        assert_eq!(Cell::classify("3.25"), Cell::Number(3.25));
        assert_eq!(Cell::classify(".5"), Cell::Number(0.5));
        assert_eq!(Cell::classify("1e3"), Cell::Number(1000.0));
        assert_eq!(Cell::classify("+2.5E-1"), Cell::Number(0.25));
    }

    #[test]
    fn test_large_integers_share_f64() {
        assert_eq!(
            Cell::classify("9007199254740993"),
            Cell::classify("9007199254740992")
        );
        assert_ne!(
            Cell::classify("9007199254740991"),
            Cell::classify("9007199254740992")
        );
    }

    #[test]
    fn test_classify_text() {
        assert!(Cell::classify("eng").is_text());
        assert!(Cell::classify("NaN").is_text());
        assert!(Cell::classify("inf").is_text());
        assert!(Cell::classify(" 12").is_text());
        assert!(Cell::classify("1e").is_text());
        assert!(Cell::classify(".").is_text());
        assert!(Cell::classify("").is_text());
    }

    #[test]
    fn test_negative_zero_equals_zero() {
        assert_eq!(Cell::Number(-0.0), Cell::Number(0.0));
        assert_eq!(Cell::Number(-0.0).textual(), "0");
        assert!(Cell::from(-0.0).as_number().unwrap().is_sign_positive());
        assert!(Cell::classify("-0.0").as_number().unwrap().is_sign_positive());
    }

    #[test]
    fn test_structural_order() {
        let mut cells = vec![
            Cell::text("a"),
            Cell::Number(2.0),
            Cell::Null,
            Cell::Number(-1.0),
        ];
        cells.sort();
        assert_eq!(
            cells,
            vec![
                Cell::Null,
                Cell::Number(-1.0),
                Cell::Number(2.0),
                Cell::text("a")
            ]
        );
    }

    #[test]
    fn test_null_never_equals_value() {
        assert_ne!(Cell::Null, Cell::text(""));
        assert_ne!(Cell::Null, Cell::Number(0.0));
        assert_eq!(Cell::Null, Cell::Null);
    }

    #[test]
    fn test_textual_form() {
        assert_eq!(Cell::Number(10.0).textual(), "10");
        assert_eq!(Cell::Number(2.5).textual(), "2.5");
        assert_eq!(Cell::Null.textual(), "NULL");
        assert_eq!(Cell::Number(1e20).textual(), "100000000000000000000");
    }

    #[test]
    fn test_json_round_trip_shapes() {
        let cells: Vec<Cell> = serde_json::from_str(r#"[null, 10, 2.5, "eng", "NULL", "7"]"#)
            .unwrap();
        assert_eq!(
            cells,
            vec![
                Cell::Null,
                Cell::Number(10.0),
                Cell::Number(2.5),
                Cell::text("eng"),
                Cell::Null,
                Cell::Number(7.0),
            ]
        );
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, r#"[null,10,2.5,"eng",null,7]"#);
    }
}
