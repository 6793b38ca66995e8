use core_types::Granularity;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub snapshot: SnapshotSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub reports: ReportSettings,
}

/// Where the data-access snapshot is read from.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotSettings {
    /// Path to the JSON snapshot of orders, line items, products and sellers.
    pub path: PathBuf,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("snapshot.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset (e.g. "info", "analytics=debug").
    #[serde(default = "default_level")]
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Emit JSON lines instead of the human-readable format.
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            directory: None,
            json: false,
        }
    }
}

/// How reports are rendered by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportSettings {
    /// Granularity used when the caller does not pass one.
    #[serde(default)]
    pub default_granularity: Granularity,
    #[serde(default)]
    pub output: OutputFormat,
}
