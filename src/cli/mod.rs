pub mod init;
pub mod routes;
pub mod run;
pub mod status;
pub mod transform;

use chrono::Local;
use clap::{Parser, Subcommand};

use crate::dates::parse_iso;
use crate::error::{KpiError, Result};
use crate::models::RunContext;
use crate::settings::{Settings, SinkKind};
use crate::sink::{CsvSink, Sink};

/// Anchors for one invocation: `--today` when given, else the local date.
pub(crate) fn run_context(today: Option<&str>) -> Result<RunContext> {
    let today = match today {
        Some(raw) => parse_iso(raw).ok_or_else(|| KpiError::InvalidDate(raw.to_string()))?,
        None => Local::now().date_naive(),
    };
    Ok(RunContext::new(today))
}

pub(crate) fn open_sink(kind: SinkKind, settings: &Settings) -> Result<Box<dyn Sink>> {
    match kind {
        SinkKind::Csv => Ok(Box::new(CsvSink::new(&settings.output_dir))),
        #[cfg(feature = "sheets")]
        SinkKind::Sheets => Ok(Box::new(crate::sink::SheetsSink::from_env(&settings.token_env)?)),
        #[cfg(not(feature = "sheets"))]
        SinkKind::Sheets => Err(KpiError::Settings(
            "built without the `sheets` feature".to_string(),
        )),
    }
}

#[derive(Parser)]
#[command(
    name = "kpi-relay",
    version,
    about = "Weekly KPI relay: shape warehouse report extracts and publish them to spreadsheets."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write settings and create the inbox and output directories.
    Init {
        /// Directory report extracts are dropped into
        #[arg(long = "source-dir")]
        source_dir: Option<String>,
        /// Root directory for the csv sink
        #[arg(long = "output-dir")]
        output_dir: Option<String>,
        /// Where results are published
        #[arg(long, value_enum)]
        sink: Option<SinkKind>,
    },
    /// Process every report in the source directory and publish the results.
    Run {
        /// Run date (YYYY-MM-DD); defaults to the local date
        #[arg(long)]
        today: Option<String>,
        /// Override the configured source directory
        #[arg(long = "source-dir")]
        source_dir: Option<String>,
        /// Override the configured sink
        #[arg(long, value_enum)]
        sink: Option<SinkKind>,
        /// Shape everything but publish nowhere; print the rows each sheet would receive
        #[arg(long = "dry-run")]
        dry_run: bool,
        /// Record failing files and continue with the rest
        #[arg(long = "keep-going")]
        keep_going: bool,
    },
    /// Show the routing table.
    Routes,
    /// Run one local file through its transform.
    Transform {
        /// Path to an XLSX or CSV extract
        file: String,
        /// Transform key to use instead of the routed one (see `routes`)
        #[arg(long = "as")]
        transform: Option<String>,
        /// Run date (YYYY-MM-DD); defaults to the local date
        #[arg(long)]
        today: Option<String>,
        /// Write each output slot as <stem>.<slot>.csv into this directory
        #[arg(long = "out-dir")]
        out_dir: Option<String>,
    },
    /// Show settings and resolved paths.
    Status,
}
