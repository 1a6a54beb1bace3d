use std::path::PathBuf;

use colored::Colorize;

use crate::error::Result;
use crate::routes::route_for;
use crate::settings::{load_settings, settings_path, SinkKind};
use crate::source::{DirSource, Source};

pub fn run() -> Result<()> {
    let path = settings_path();
    let settings = load_settings()?;
    let source_dir = PathBuf::from(&settings.source_dir);

    println!(
        "Settings:   {}{}",
        path.display(),
        if path.exists() { "" } else { " (defaults)" }
    );
    println!("Source:     {}", source_dir.display());
    match settings.sink {
        SinkKind::Csv => println!("Sink:       csv -> {}", settings.output_dir),
        SinkKind::Sheets => {
            let token = if std::env::var_os(&settings.token_env).is_some() {
                "set".green()
            } else {
                "not set".red()
            };
            println!("Sink:       sheets (${} {token})", settings.token_env);
        }
    }
    println!("Mapped:     {} spreadsheet id(s)", settings.spreadsheets.len());

    if source_dir.is_dir() {
        let files = DirSource::new(&source_dir).list()?;
        let routed = files.iter().filter(|f| route_for(f).is_some()).count();
        println!();
        println!("Files:      {}", files.len());
        println!("Routed:     {}", routed.to_string().green());
        if files.len() > routed {
            println!("Unknown:    {}", (files.len() - routed).to_string().yellow());
        }
    } else {
        println!();
        println!("Source directory not found. Run `kpi-relay init` to set up.");
    }

    Ok(())
}
