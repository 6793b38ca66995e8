use crate::settings::{Config, OutputFormat};
use clap::Args;
use std::path::PathBuf;

/// Command-line flags that take precedence over `config.toml` and the environment.
#[derive(Debug, Clone, Args)]
pub struct ConfigOverrides {
    /// Path to the configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// Path to the JSON data snapshot.
    #[arg(long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Output format for the report.
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Log filter directive (e.g. "debug").
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.snapshot {
            config.snapshot.path = path.clone();
        }
        if let Some(format) = self.format {
            config.reports.output = format;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}
