use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::runner::{self, Outcome, RunOptions, RunSummary};
use crate::settings::{load_settings, shellexpand_path, SinkKind};
use crate::sink::{MemorySink, SheetValue};
use crate::source::DirSource;

pub fn run(
    today: Option<&str>,
    source_dir: Option<String>,
    sink: Option<SinkKind>,
    dry_run: bool,
    keep_going: bool,
) -> Result<()> {
    let mut settings = load_settings()?;
    if let Some(dir) = source_dir {
        settings.source_dir = shellexpand_path(&dir);
    }
    let ctx = super::run_context(today)?;
    let source = DirSource::new(&settings.source_dir);
    let options = RunOptions { keep_going };

    let summary = if dry_run {
        let mut memory = MemorySink::new();
        let summary = runner::run(&source, &mut memory, &settings, &ctx, options)?;
        print_summary(&summary, true);
        print_preview(&memory);
        summary
    } else {
        let mut sink = super::open_sink(sink.unwrap_or(settings.sink), &settings)?;
        let summary = runner::run(&source, sink.as_mut(), &settings, &ctx, options)?;
        print_summary(&summary, false);
        summary
    };
    if summary.failed() > 0 {
        println!("{}", format!("{} file(s) failed", summary.failed()).red().bold());
    }
    Ok(())
}

const PREVIEW_ROWS: usize = 5;

/// Leading rows of every sheet a dry run would have touched.
fn print_preview(sink: &MemorySink) {
    for ((spreadsheet, sheet), rows) in &sink.sheets {
        let mut table = Table::new();
        for row in rows.iter().take(PREVIEW_ROWS) {
            table.add_row(row.iter().map(SheetValue::as_text).collect::<Vec<_>>());
        }
        println!("\n{spreadsheet} / {sheet} ({} rows)\n{table}", rows.len());
        if rows.len() > PREVIEW_ROWS {
            println!("... {} more", rows.len() - PREVIEW_ROWS);
        }
    }
}

fn print_summary(summary: &RunSummary, dry_run: bool) {
    let mut table = Table::new();
    table.set_header(vec!["File", "Status", "Destination", "Range", "Mode", "Rows"]);
    for report in &summary.files {
        match &report.outcome {
            Outcome::Published(targets) => {
                let status = if dry_run { "dry run".cyan() } else { "ok".green() };
                for (i, t) in targets.iter().enumerate() {
                    let file = if i == 0 { report.file.as_str() } else { "" };
                    table.add_row(vec![
                        Cell::new(file),
                        Cell::new(status.clone()),
                        Cell::new(t.destination),
                        Cell::new(t.range),
                        Cell::new(t.mode),
                        Cell::new(t.rows),
                    ]);
                }
            }
            Outcome::Skipped => {
                table.add_row(vec![
                    Cell::new(&report.file),
                    Cell::new("skipped".yellow()),
                    Cell::new("no route"),
                ]);
            }
            Outcome::Failed(reason) => {
                table.add_row(vec![
                    Cell::new(&report.file),
                    Cell::new("failed".red()),
                    Cell::new(reason),
                ]);
            }
        }
    }
    println!(
        "{} published, {} skipped, {} failed\n{table}",
        summary.published(),
        summary.skipped(),
        summary.failed()
    );
}
