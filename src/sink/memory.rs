use std::collections::BTreeMap;

use crate::error::Result;
use crate::routes::ClearScope;
use crate::sink::{A1Range, SheetValue, Sink};

#[derive(Debug, Clone, PartialEq)]
pub enum SinkOp {
    Append { spreadsheet: String, sheet: String, rows: usize },
    Clear { spreadsheet: String, sheet: String },
    Write { spreadsheet: String, sheet: String, rows: usize },
}

/// In-process destination. Sheets are keyed by (spreadsheet, sheet name) and
/// every call is recorded in `ops`.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub sheets: BTreeMap<(String, String), Vec<Vec<SheetValue>>>,
    pub ops: Vec<SinkOp>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self, spreadsheet: &str, sheet: &str) -> &[Vec<SheetValue>] {
        self.sheets
            .get(&(spreadsheet.to_string(), sheet.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn sheet_mut(&mut self, spreadsheet: &str, range: &A1Range) -> &mut Vec<Vec<SheetValue>> {
        self.sheets
            .entry((spreadsheet.to_string(), range.sheet.clone()))
            .or_default()
    }
}

impl Sink for MemorySink {
    fn append(&mut self, spreadsheet: &str, range: &A1Range, rows: &[Vec<SheetValue>]) -> Result<()> {
        self.sheet_mut(spreadsheet, range).extend(rows.iter().cloned());
        self.ops.push(SinkOp::Append {
            spreadsheet: spreadsheet.to_string(),
            sheet: range.sheet.clone(),
            rows: rows.len(),
        });
        Ok(())
    }

    fn clear(&mut self, spreadsheet: &str, range: &A1Range, _scope: ClearScope) -> Result<()> {
        self.sheet_mut(spreadsheet, range).clear();
        self.ops.push(SinkOp::Clear {
            spreadsheet: spreadsheet.to_string(),
            sheet: range.sheet.clone(),
        });
        Ok(())
    }

    fn write(&mut self, spreadsheet: &str, range: &A1Range, rows: &[Vec<SheetValue>]) -> Result<()> {
        let sheet = self.sheet_mut(spreadsheet, range);
        for (i, row) in rows.iter().enumerate() {
            match sheet.get_mut(i) {
                Some(existing) => *existing = row.clone(),
                None => sheet.push(row.clone()),
            }
        }
        self.ops.push(SinkOp::Write {
            spreadsheet: spreadsheet.to_string(),
            sheet: range.sheet.clone(),
            rows: rows.len(),
        });
        Ok(())
    }
}
