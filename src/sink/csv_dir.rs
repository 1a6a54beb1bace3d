use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::routes::ClearScope;
use crate::sink::{A1Range, SheetValue, Sink};

/// Local stand-in for a spreadsheet service: one CSV file per sheet at
/// `<root>/<spreadsheet>/<sheet>.csv`.
pub struct CsvSink {
    root: PathBuf,
}

impl CsvSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn sheet_path(&self, spreadsheet: &str, sheet: &str) -> PathBuf {
        self.root
            .join(sanitize(spreadsheet))
            .join(format!("{}.csv", sanitize(sheet)))
    }

    fn prepare(&self, spreadsheet: &str, range: &A1Range) -> Result<PathBuf> {
        let path = self.sheet_path(spreadsheet, &range.sheet);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect()
}

fn write_rows(path: &Path, rows: &[Vec<String>], append: bool) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(file);
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut rows = Vec::new();
    for record in rdr.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn as_text(rows: &[Vec<SheetValue>]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| r.iter().map(SheetValue::as_text).collect())
        .collect()
}

impl Sink for CsvSink {
    fn append(&mut self, spreadsheet: &str, range: &A1Range, rows: &[Vec<SheetValue>]) -> Result<()> {
        let path = self.prepare(spreadsheet, range)?;
        debug!(path = %path.display(), rows = rows.len(), "csv append");
        write_rows(&path, &as_text(rows), true)
    }

    fn clear(&mut self, spreadsheet: &str, range: &A1Range, _scope: ClearScope) -> Result<()> {
        let path = self.prepare(spreadsheet, range)?;
        debug!(path = %path.display(), "csv clear");
        write_rows(&path, &[], false)
    }

    fn write(&mut self, spreadsheet: &str, range: &A1Range, rows: &[Vec<SheetValue>]) -> Result<()> {
        let path = self.prepare(spreadsheet, range)?;
        let mut existing = read_rows(&path)?;
        for (i, row) in as_text(rows).into_iter().enumerate() {
            match existing.get_mut(i) {
                Some(slot) => *slot = row,
                None => existing.push(row),
            }
        }
        debug!(path = %path.display(), rows = rows.len(), "csv write");
        write_rows(&path, &existing, false)
    }
}
