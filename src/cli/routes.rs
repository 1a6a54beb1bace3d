use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::routes::ROUTES;

pub fn list() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["File", "Transform", "Skip", "Slot", "Destination", "Range", "Mode"]);
    for route in ROUTES {
        for (i, target) in route.targets.iter().enumerate() {
            let (file, transform, skip) = if i == 0 {
                (route.file, route.transform.key(), route.skip_rows.to_string())
            } else {
                ("", "", String::new())
            };
            let mode = if target.text_only {
                format!("{} (text)", target.mode.label())
            } else {
                target.mode.label().to_string()
            };
            table.add_row(vec![
                Cell::new(file),
                Cell::new(transform),
                Cell::new(skip),
                Cell::new(target.slot),
                Cell::new(target.destination),
                Cell::new(target.range),
                Cell::new(mode),
            ]);
        }
    }
    println!("Routes ({})\n{table}", ROUTES.len());
    Ok(())
}
