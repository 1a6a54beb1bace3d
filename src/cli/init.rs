use std::path::PathBuf;

use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path, shellexpand_path, SinkKind};

pub fn run(source_dir: Option<String>, output_dir: Option<String>, sink: Option<SinkKind>) -> Result<()> {
    let mut settings = load_settings()?;

    if let Some(dir) = source_dir {
        settings.source_dir = shellexpand_path(&dir);
    }
    if let Some(dir) = output_dir {
        settings.output_dir = shellexpand_path(&dir);
    }
    if let Some(kind) = sink {
        settings.sink = kind;
    }

    save_settings(&settings)?;

    let source = PathBuf::from(&settings.source_dir);
    std::fs::create_dir_all(&source)?;
    if settings.sink == SinkKind::Csv {
        std::fs::create_dir_all(&settings.output_dir)?;
    }

    println!("Settings written to {}", settings_path().display());
    println!("Drop report extracts into {}", source.display());
    Ok(())
}
