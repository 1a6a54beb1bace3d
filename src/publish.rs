use tracing::{info, warn};

use crate::error::Result;
use crate::models::{Cell, Table};
use crate::routes::{Target, WriteMode};
use crate::sink::{A1Range, SheetValue, Sink};

fn sheet_value(cell: &Cell, text_only: bool) -> SheetValue {
    if cell.is_missing() {
        return SheetValue::Empty;
    }
    match cell {
        Cell::Number(n) if !text_only => SheetValue::Number(*n),
        other => SheetValue::Text(other.display()),
    }
}

/// Convert a table into boundary rows, optionally led by its header row.
/// Missing markers become empty text.
pub fn to_rows(table: &Table, header: bool, text_only: bool) -> Vec<Vec<SheetValue>> {
    let mut rows = Vec::with_capacity(table.len() + usize::from(header));
    if header {
        rows.push(
            table
                .columns
                .iter()
                .map(|c| SheetValue::Text(c.clone()))
                .collect(),
        );
    }
    for row in &table.rows {
        rows.push(row.iter().map(|c| sheet_value(c, text_only)).collect());
    }
    rows
}

/// Write one output table to its target. Returns the number of data rows sent.
///
/// Append sends data rows only. Replace clears the destination and then
/// writes header plus rows from the origin cell; the two calls are not atomic.
pub fn publish(sink: &mut dyn Sink, spreadsheet: &str, target: &Target, table: &Table) -> Result<usize> {
    let range = A1Range::parse(target.range)?;
    match target.mode {
        WriteMode::Append => {
            if table.is_empty() {
                info!(destination = target.destination, range = %range, "nothing to append");
                return Ok(0);
            }
            let rows = to_rows(table, false, target.text_only);
            sink.append(spreadsheet, &range, &rows)?;
        }
        WriteMode::Replace(scope) => {
            let rows = to_rows(table, true, target.text_only);
            sink.clear(spreadsheet, &range, scope)?;
            if let Err(e) = sink.write(spreadsheet, &range, &rows) {
                warn!(
                    destination = target.destination,
                    range = %range,
                    "destination was cleared but the new snapshot failed to write"
                );
                return Err(e);
            }
        }
    }
    info!(
        destination = target.destination,
        range = %range,
        mode = target.mode.label(),
        rows = table.len(),
        "published"
    );
    Ok(table.len())
}
