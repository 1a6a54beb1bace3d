use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::dates::format_date;

static EMPTY: Cell = Cell::Empty;

/// One cell of a report extract as received from the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// Empty cells and whitespace-only text both count as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if !n.is_nan() => Some(*n),
            Cell::Text(s) => s.trim().replace(',', "").parse().ok(),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Text comparison used by upstream filters. Non-text cells never match.
    pub fn eq_code(&self, code: &str) -> bool {
        matches!(self, Cell::Text(s) if s.trim() == code)
    }

    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) if n.is_nan() => String::new(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
            Cell::Date(d) => format_date(Some(*d)),
            Cell::DateTime(dt) => dt.format("%m/%d/%Y %H:%M:%S").to_string(),
        }
    }
}

impl From<Option<i64>> for Cell {
    fn from(v: Option<i64>) -> Self {
        v.map_or(Cell::Empty, |n| Cell::Number(n as f64))
    }
}

/// A rectangular row set with named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.trim() == name)
    }

    /// Cell lookup that tolerates absent columns and ragged rows.
    pub fn cell<'a>(&'a self, row: &'a [Cell], name: &str) -> &'a Cell {
        self.column_index(name)
            .and_then(|i| row.get(i))
            .unwrap_or(&EMPTY)
    }

    /// Values of one column; an absent column reads as all-empty.
    pub fn column(&self, name: &str) -> Vec<Cell> {
        match self.column_index(name) {
            Some(i) => self
                .rows
                .iter()
                .map(|r| r.get(i).cloned().unwrap_or(Cell::Empty))
                .collect(),
            None => vec![Cell::Empty; self.rows.len()],
        }
    }

    /// Overwrite an existing column in place, or append it at the end.
    pub fn set_column(&mut self, name: &str, values: Vec<Cell>) {
        debug_assert_eq!(values.len(), self.rows.len());
        let width = self.columns.len();
        let idx = match self.column_index(name) {
            Some(i) => i,
            None => {
                self.columns.push(name.to_string());
                width
            }
        };
        for (row, value) in self.rows.iter_mut().zip(values) {
            if row.len() <= idx {
                row.resize(idx + 1, Cell::Empty);
            }
            row[idx] = value;
        }
    }

    pub fn filter(&self, keep: impl Fn(&Table, &[Cell]) -> bool) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| keep(self, r.as_slice()))
                .cloned()
                .collect(),
        }
    }

    /// Split rows into (matching, rest). Every row lands in exactly one side.
    pub fn partition(&self, pred: impl Fn(&Table, &[Cell]) -> bool) -> (Table, Table) {
        let (yes, no): (Vec<_>, Vec<_>) = self.rows.iter().cloned().partition(|r| pred(self, r.as_slice()));
        (
            Table {
                columns: self.columns.clone(),
                rows: yes,
            },
            Table {
                columns: self.columns.clone(),
                rows: no,
            },
        )
    }

    /// Column subset in the given order. Missing columns come back empty.
    pub fn select(&self, names: &[&str]) -> Table {
        let idx: Vec<Option<usize>> = names.iter().map(|n| self.column_index(n)).collect();
        Table {
            columns: names.iter().map(|n| n.to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| {
                    idx.iter()
                        .map(|i| i.and_then(|i| r.get(i).cloned()).unwrap_or(Cell::Empty))
                        .collect()
                })
                .collect(),
        }
    }
}

/// Temporal anchors shared by every transform in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunContext {
    pub today: NaiveDate,
    pub week: NaiveDate,
}

impl RunContext {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            week: today - Duration::days(7),
        }
    }

    pub fn week_label(&self) -> String {
        format_date(Some(self.week))
    }
}

/// Count-by-category pivot for one run, keyed by the week label.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendAggregate {
    pub week: String,
    pub counts: BTreeMap<String, u64>,
}

impl TrendAggregate {
    pub fn new(week: String) -> Self {
        Self {
            week,
            counts: BTreeMap::new(),
        }
    }

    /// Pre-seed labels so they appear as zero-count columns.
    pub fn with_labels(mut self, labels: &[&str]) -> Self {
        for l in labels {
            self.counts.entry(l.to_string()).or_insert(0);
        }
        self
    }

    pub fn add(&mut self, label: &str) {
        *self.counts.entry(label.to_string()).or_insert(0) += 1;
    }

    pub fn into_table(self) -> Table {
        let mut columns = vec!["Week_Number".to_string()];
        let mut row = vec![Cell::Text(self.week)];
        for (label, count) in self.counts {
            columns.push(label);
            row.push(Cell::Number(count as f64));
        }
        Table {
            columns,
            rows: vec![row],
        }
    }
}

/// Named row set produced by a transform (e.g. `detail`, `trend`).
#[derive(Debug, Clone)]
pub struct Output {
    pub slot: &'static str,
    pub table: Table,
}

impl Output {
    pub fn new(slot: &'static str, table: Table) -> Self {
        Self { slot, table }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table {
            columns: vec!["A".into(), "B".into()],
            rows: vec![
                vec![Cell::text("x"), Cell::Number(1.0)],
                vec![Cell::text("y"), Cell::Number(2.0)],
            ],
        }
    }

    #[test]
    fn test_set_column_appends_then_overwrites() {
        let mut t = sample();
        t.set_column("C", vec![Cell::text("c1"), Cell::text("c2")]);
        assert_eq!(t.columns, vec!["A", "B", "C"]);
        t.set_column("A", vec![Cell::Empty, Cell::Empty]);
        assert_eq!(t.columns.len(), 3);
        assert_eq!(t.rows[0][0], Cell::Empty);
        assert_eq!(t.rows[1][2], Cell::text("c2"));
    }

    #[test]
    fn test_select_fills_missing_columns() {
        let t = sample().select(&["B", "Z"]);
        assert_eq!(t.columns, vec!["B", "Z"]);
        assert_eq!(t.rows[0], vec![Cell::Number(1.0), Cell::Empty]);
    }

    #[test]
    fn test_partition_is_exhaustive() {
        let (x, rest) = sample().partition(|t, r| t.cell(r, "A").eq_code("x"));
        assert_eq!(x.len(), 1);
        assert_eq!(rest.len(), 1);
    }

    #[test]
    fn test_run_context_week_is_seven_days_back() {
        let ctx = RunContext::new(NaiveDate::from_ymd_opt(2021, 8, 6).unwrap());
        assert_eq!(ctx.week_label(), "07/30/2021");
    }

    #[test]
    fn test_trend_aggregate_table_shape() {
        let mut agg = TrendAggregate::new("07/30/2021".into()).with_labels(&["b", "a"]);
        agg.add("a");
        agg.add("a");
        let t = agg.into_table();
        assert_eq!(t.columns, vec!["Week_Number", "a", "b"]);
        assert_eq!(t.rows[0][1], Cell::Number(2.0));
        assert_eq!(t.rows[0][2], Cell::Number(0.0));
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Number(42.0).display(), "42");
        assert_eq!(Cell::Number(1.5).display(), "1.5");
        assert_eq!(Cell::Empty.display(), "");
        assert!(Cell::text("  ").is_missing());
    }
}
