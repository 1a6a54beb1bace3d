use std::path::{Path, PathBuf};

use comfy_table::{Cell, Table};

use crate::error::{KpiError, Result};
use crate::publish::to_rows;
use crate::reader::{read_table, Format};
use crate::routes::route_for;
use crate::transforms::{get_by_key, TransformKind, ALL_TRANSFORMS};

/// Transform and header offset for a file: the registered route, or an
/// explicit transform key with the usual single metadata row.
fn resolve(name: &str, key: Option<&str>) -> Result<(TransformKind, usize, String)> {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| name.to_string());
    if let Some(key) = key {
        let kind = get_by_key(key).ok_or_else(|| {
            let known: Vec<&str> = ALL_TRANSFORMS.iter().map(|t| t.key()).collect();
            KpiError::Other(format!("Unknown transform '{key}' (known: {})", known.join(", ")))
        })?;
        let skip = route_for(name).map_or(1, |r| r.skip_rows);
        return Ok((kind, skip, stem));
    }
    let route = route_for(name).ok_or_else(|| {
        KpiError::Other(format!("No route registered for {name}; pass --as <transform>"))
    })?;
    Ok((route.transform, route.skip_rows, stem))
}

pub fn run(file: &str, key: Option<&str>, today: Option<&str>, out_dir: Option<String>) -> Result<()> {
    let path = PathBuf::from(file);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file.to_string());
    let (transform, skip_rows, stem) = resolve(&name, key)?;
    let ctx = super::run_context(today)?;

    let bytes = std::fs::read(&path)?;
    let data = read_table(&bytes, Format::from_name(&name), skip_rows)?;
    let outputs = transform.apply(&data, &ctx);

    let mut table = Table::new();
    table.set_header(vec!["Slot", "Rows", "Columns", "Written to"]);
    for output in &outputs {
        let written = match &out_dir {
            Some(dir) => {
                let dest = Path::new(dir).join(format!("{stem}.{}.csv", output.slot));
                write_csv(&dest, &output.table)?;
                dest.display().to_string()
            }
            None => String::new(),
        };
        table.add_row(vec![
            Cell::new(output.slot),
            Cell::new(output.table.len()),
            Cell::new(output.table.columns.len()),
            Cell::new(written),
        ]);
    }
    println!(
        "{} via {} (week {})\n{table}",
        name,
        transform.key(),
        ctx.week_label()
    );
    Ok(())
}

fn write_csv(dest: &Path, table: &crate::models::Table) -> Result<()> {
    if let Some(dir) = dest.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_path(dest)?;
    for row in to_rows(table, true, false) {
        wtr.write_record(row.iter().map(|v| v.as_text()))?;
    }
    wtr.flush()?;
    Ok(())
}
