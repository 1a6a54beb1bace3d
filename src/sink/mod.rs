//! Publication surface: where shaped row sets end up.
//!
//! Every cell crossing this boundary is text, a number, or empty. There is
//! no null encoding; callers substitute missing values before writing.

pub mod csv_dir;
pub mod memory;
#[cfg(feature = "sheets")]
pub mod sheets;

pub use csv_dir::CsvSink;
pub use memory::MemorySink;
#[cfg(feature = "sheets")]
pub use sheets::SheetsSink;

use serde::{Serialize, Serializer};

use crate::error::{KpiError, Result};
use crate::routes::ClearScope;

#[derive(Debug, Clone, PartialEq)]
pub enum SheetValue {
    Text(String),
    Number(f64),
    Empty,
}

impl SheetValue {
    pub fn as_text(&self) -> String {
        match self {
            SheetValue::Text(s) => s.clone(),
            SheetValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            SheetValue::Number(n) => n.to_string(),
            SheetValue::Empty => String::new(),
        }
    }
}

impl Serialize for SheetValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            SheetValue::Text(s) => serializer.serialize_str(s),
            SheetValue::Number(n) => serializer.serialize_f64(*n),
            SheetValue::Empty => serializer.serialize_str(""),
        }
    }
}

/// A1-notation range such as `Sheet1!A1:AS1` or `'No Orders'!A1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
    pub sheet: String,
    pub cells: Option<String>,
}

impl A1Range {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let (sheet, cells) = match raw.rsplit_once('!') {
            Some((sheet, cells)) => (sheet, Some(cells)),
            None => (raw, None),
        };
        let sheet = sheet.trim_matches('\'');
        if sheet.is_empty() || cells.is_some_and(|c| c.is_empty()) {
            return Err(KpiError::InvalidRange(raw.to_string()));
        }
        Ok(Self {
            sheet: sheet.to_string(),
            cells: cells.map(str::to_string),
        })
    }
}

impl std::fmt::Display for A1Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let quoted = self.sheet.contains(' ');
        match (&self.cells, quoted) {
            (Some(c), true) => write!(f, "'{}'!{c}", self.sheet),
            (Some(c), false) => write!(f, "{}!{c}", self.sheet),
            (None, true) => write!(f, "'{}'", self.sheet),
            (None, false) => write!(f, "{}", self.sheet),
        }
    }
}

/// Sink Provider: a destination that accepts rectangular row sets.
///
/// Replace is expressed as `clear` followed by `write`; the two calls are
/// separate and a failure between them leaves the destination empty.
pub trait Sink {
    /// Add rows after the existing content of the range's table.
    fn append(&mut self, spreadsheet: &str, range: &A1Range, rows: &[Vec<SheetValue>]) -> Result<()>;

    /// Remove existing values.
    fn clear(&mut self, spreadsheet: &str, range: &A1Range, scope: ClearScope) -> Result<()>;

    /// Write rows starting at the origin cell of the range.
    fn write(&mut self, spreadsheet: &str, range: &A1Range, rows: &[Vec<SheetValue>]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        let r = A1Range::parse("Sheet1!A1:AS1").unwrap();
        assert_eq!(r.sheet, "Sheet1");
        assert_eq!(r.cells.as_deref(), Some("A1:AS1"));
        let r = A1Range::parse("'No Orders'!A1:P1").unwrap();
        assert_eq!(r.sheet, "No Orders");
        assert_eq!(r.to_string(), "'No Orders'!A1:P1");
        let r = A1Range::parse("With Orders!A1:Q1").unwrap();
        assert_eq!(r.sheet, "With Orders");
        assert_eq!(A1Range::parse("Sheet1").unwrap().cells, None);
    }

    #[test]
    fn test_parse_range_rejects_empty_parts() {
        assert!(A1Range::parse("").is_err());
        assert!(A1Range::parse("!A1").is_err());
        assert!(A1Range::parse("Sheet1!").is_err());
    }

    #[test]
    fn test_sheet_values_serialize_without_null() {
        let row = vec![
            SheetValue::Text("a".into()),
            SheetValue::Number(2.5),
            SheetValue::Empty,
        ];
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"["a",2.5,""]"#);
    }
}
