use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{KpiError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// CSV files under `output_dir`, one per destination sheet.
    Csv,
    /// Google Sheets REST API.
    Sheets,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub source_dir: String,
    #[serde(default = "default_sink")]
    pub sink: SinkKind,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_token_env")]
    pub token_env: String,
    /// Destination key -> spreadsheet id.
    #[serde(default)]
    pub spreadsheets: BTreeMap<String, String>,
}

fn default_sink() -> SinkKind {
    SinkKind::Csv
}

fn default_token_env() -> String {
    "KPI_RELAY_SHEETS_TOKEN".to_string()
}

fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("kpi-relay")
}

fn default_output_dir() -> String {
    data_dir().join("sheets").to_string_lossy().to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_dir: data_dir().join("inbox").to_string_lossy().to_string(),
            sink: default_sink(),
            output_dir: default_output_dir(),
            token_env: default_token_env(),
            spreadsheets: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Spreadsheet id for a destination key. Unmapped keys are used verbatim.
    pub fn spreadsheet_id<'a>(&'a self, destination: &'a str) -> &'a str {
        self.spreadsheets
            .get(destination)
            .map(String::as_str)
            .unwrap_or(destination)
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("kpi-relay")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Load settings from `path`, falling back to defaults when the file is absent.
/// A file that exists but does not parse is an error rather than silently ignored.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| KpiError::Settings(format!("{}: {e}", path.display())))
}

pub fn load_settings() -> Result<Settings> {
    load_settings_from(&settings_path())
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| KpiError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(&settings_path(), settings)
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
