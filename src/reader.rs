use std::io::Cursor;
use std::path::Path;

use chrono::Duration;

use crate::dates::excel_serial_to_date;
use crate::error::{KpiError, Result};
use crate::models::{Cell, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Xlsx,
    Csv,
}

impl Format {
    /// Pick the parser from the file extension; anything not `.csv` is read as a workbook.
    pub fn from_name(name: &str) -> Self {
        match Path::new(name).extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Format::Csv,
            _ => Format::Xlsx,
        }
    }
}

/// Parse a downloaded extract. `skip_rows` leading rows are dropped and the
/// next row becomes the header.
pub fn read_table(bytes: &[u8], format: Format, skip_rows: usize) -> Result<Table> {
    let grid = match format {
        Format::Xlsx => read_xlsx(bytes, skip_rows)?,
        Format::Csv => read_csv(bytes, skip_rows)?,
    };
    Ok(into_table(grid))
}

fn into_table(mut grid: Vec<Vec<Cell>>) -> Table {
    while grid.last().is_some_and(|r| r.iter().all(Cell::is_missing)) {
        grid.pop();
    }
    if grid.is_empty() {
        return Table::default();
    }
    let header = grid.remove(0);
    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, c)| match c.display().trim() {
            "" => format!("Unnamed: {i}"),
            name => name.to_string(),
        })
        .collect();
    let width = columns.len();
    let rows = grid
        .into_iter()
        .map(|mut r| {
            r.resize(width.max(r.len()), Cell::Empty);
            r
        })
        .collect();
    Table { columns, rows }
}

// ---------------------------------------------------------------------------
// XLSX
// ---------------------------------------------------------------------------

fn excel_cell(data: &calamine::Data) -> Cell {
    use calamine::Data;
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) if s.trim().is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => serial_cell(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

fn serial_cell(serial: f64) -> Cell {
    let Some(date) = excel_serial_to_date(serial) else {
        return Cell::Number(serial);
    };
    let secs = (serial.fract() * 86_400.0).round() as i64;
    if secs == 0 {
        return Cell::Date(date);
    }
    match date.and_hms_opt(0, 0, 0) {
        Some(midnight) => Cell::DateTime(midnight + Duration::seconds(secs)),
        None => Cell::Date(date),
    }
}

fn read_xlsx(bytes: &[u8], skip_rows: usize) -> Result<Vec<Vec<Cell>>> {
    use calamine::{Reader, Xlsx};

    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| KpiError::Workbook(format!("Failed to open XLSX: {e}")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| KpiError::Workbook("Workbook has no sheets".to_string()))?
        .map_err(|e| KpiError::Workbook(format!("Failed to read first sheet: {e}")))?;

    // The range starts at the first non-empty row, so leading blank rows
    // count towards the skip.
    let first_row = range.start().map_or(0, |(r, _)| r as usize);
    let skip = skip_rows.saturating_sub(first_row);

    Ok(range
        .rows()
        .skip(skip)
        .map(|row| row.iter().map(excel_cell).collect())
        .collect())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn csv_cell(raw: &str) -> Cell {
    let s = raw.trim();
    if s.is_empty() {
        return Cell::Empty;
    }
    // A number only when it prints back as typed, so codes like `00123`
    // or `1e3` keep their text.
    match s.parse::<f64>() {
        Ok(n) if n.is_finite() && Cell::Number(n).display() == s => Cell::Number(n),
        _ => Cell::Text(raw.to_string()),
    }
}

fn read_csv(bytes: &[u8], skip_rows: usize) -> Result<Vec<Vec<Cell>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut grid = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        if i < skip_rows {
            continue;
        }
        grid.push(record.iter().map(csv_cell).collect());
    }
    Ok(grid)
}

#[cfg(test)]
pub(crate) mod test_workbooks {
    use rust_xlsxwriter::{Format, Workbook};

    /// A one-sheet extract: optional title row, header, a dated row and a
    /// time-stamped row. Without a title the first row is left blank.
    pub(crate) fn open_orders(title: Option<&str>) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let date = Format::new().set_num_format("mm/dd/yyyy");
        let stamp = Format::new().set_num_format("mm/dd/yyyy hh:mm");
        let sheet = workbook.add_worksheet();
        if let Some(title) = title {
            sheet.write_string(0, 0, title).unwrap();
        }
        sheet.write_string(1, 0, "ORD_NUM").unwrap();
        sheet.write_string(1, 1, "ORD_DATE").unwrap();
        sheet.write_string(1, 2, "QTY").unwrap();
        sheet.write_string(2, 0, "00123").unwrap();
        sheet.write_number_with_format(2, 1, 44403.0, &date).unwrap();
        sheet.write_number(2, 2, 3.0).unwrap();
        sheet.write_string(3, 0, "A2").unwrap();
        sheet.write_number_with_format(3, 1, 44403.5, &stamp).unwrap();
        workbook.save_to_buffer().unwrap()
    }

    /// Call log export: header on the very first row.
    pub(crate) fn call_log() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let date = Format::new().set_num_format("mm/dd/yyyy");
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "CALL_ID").unwrap();
        sheet.write_string(0, 1, "OPENED").unwrap();
        sheet.write_number(1, 0, 17.0).unwrap();
        sheet.write_number_with_format(1, 1, 44403.0, &date).unwrap();
        workbook.save_to_buffer().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn july_26() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 7, 26).unwrap()
    }

    #[test]
    fn test_format_from_name() {
        assert_eq!(Format::from_name("06_RPLN_OPEN.xlsx"), Format::Xlsx);
        assert_eq!(Format::from_name("06_RPLN_OPEN.CSV"), Format::Csv);
        assert_eq!(Format::from_name("no_extension"), Format::Xlsx);
    }

    #[test]
    fn test_csv_skips_metadata_row() {
        let content = "\
Report generated 07/30/2021,,
ORD_NO,ORD_DATE,QTY
A1,07/26/2021,3
A2,,
";
        let t = read_table(content.as_bytes(), Format::Csv, 1).unwrap();
        assert_eq!(t.columns, vec!["ORD_NO", "ORD_DATE", "QTY"]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.rows[0][2], Cell::Number(3.0));
        assert_eq!(t.rows[1][1], Cell::Empty);
    }

    #[test]
    fn test_csv_keeps_codes_as_typed() {
        let content = "UNIT,ZIP,QTY,RATE,COUNT\n00123,02134,1e3,1.50,42\n";
        let t = read_table(content.as_bytes(), Format::Csv, 0).unwrap();
        assert_eq!(
            t.rows[0],
            vec![
                Cell::text("00123"),
                Cell::text("02134"),
                Cell::text("1e3"),
                Cell::text("1.50"),
                Cell::Number(42.0),
            ]
        );
        assert_eq!(t.rows[0][3].as_number(), Some(1.5));
    }

    #[test]
    fn test_xlsx_skips_title_and_maps_cells() {
        let bytes = test_workbooks::open_orders(Some("Report generated 07/30/2021"));
        let t = read_table(&bytes, Format::Xlsx, 1).unwrap();
        assert_eq!(t.columns, vec!["ORD_NUM", "ORD_DATE", "QTY"]);
        assert_eq!(t.len(), 2);
        assert_eq!(
            t.rows[0],
            vec![Cell::text("00123"), Cell::Date(july_26()), Cell::Number(3.0)]
        );
        assert_eq!(
            t.rows[1][1],
            Cell::DateTime(july_26().and_hms_opt(12, 0, 0).unwrap())
        );
        assert_eq!(t.rows[1][2], Cell::Empty);
    }

    #[test]
    fn test_xlsx_blank_title_row_still_counts_towards_skip() {
        let bytes = test_workbooks::open_orders(None);
        let t = read_table(&bytes, Format::Xlsx, 1).unwrap();
        assert_eq!(t.columns, vec!["ORD_NUM", "ORD_DATE", "QTY"]);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_xlsx_header_on_first_row() {
        let t = read_table(&test_workbooks::call_log(), Format::Xlsx, 0).unwrap();
        assert_eq!(t.columns, vec!["CALL_ID", "OPENED"]);
        assert_eq!(t.rows, vec![vec![Cell::Number(17.0), Cell::Date(july_26())]]);

        // with the usual single skip the header would be consumed
        let skipped = read_table(&test_workbooks::call_log(), Format::Xlsx, 1).unwrap();
        assert_eq!(skipped.columns, vec!["17", "07/26/2021"]);
        assert!(skipped.is_empty());
    }

    #[test]
    fn test_csv_without_skip_uses_first_row_as_header() {
        let content = "CALL_ID,OPENED\n17,07/01/2021\n";
        let t = read_table(content.as_bytes(), Format::Csv, 0).unwrap();
        assert_eq!(t.columns, vec!["CALL_ID", "OPENED"]);
        assert_eq!(t.rows[0][1], Cell::text("07/01/2021"));
    }

    #[test]
    fn test_ragged_rows_are_padded_and_blank_headers_named() {
        let content = "A,,C\n1\n1,2,3,4\n,,\n";
        let t = read_table(content.as_bytes(), Format::Csv, 0).unwrap();
        assert_eq!(t.columns, vec!["A", "Unnamed: 1", "C"]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.rows[0].len(), 3);
        assert_eq!(t.rows[1].len(), 4);
    }

    #[test]
    fn test_empty_input_is_empty_table() {
        let t = read_table(b"", Format::Csv, 1).unwrap();
        assert!(t.is_empty());
        assert!(t.columns.is_empty());
    }

    #[test]
    fn test_garbage_workbook_is_an_error() {
        let err = read_table(b"definitely not a zip", Format::Xlsx, 1).unwrap_err();
        assert!(matches!(err, KpiError::Workbook(_)));
    }

    #[test]
    fn test_serial_cell_keeps_time_of_day() {
        assert_eq!(
            serial_cell(44403.0),
            Cell::Date(july_26())
        );
        assert!(matches!(serial_cell(44403.5), Cell::DateTime(_)));
    }
}
