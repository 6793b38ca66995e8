use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
#[cfg(feature = "clap")]
pub mod cli;
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
#[cfg(feature = "clap")]
pub use cli::ConfigOverrides;
pub use logging::init_tracing;
pub use settings::{Config, LoggingSettings, OutputFormat, ReportSettings, SnapshotSettings};

/// Prefix for environment overrides, e.g. `TALLY__SNAPSHOT__PATH=/data/snapshot.json`.
pub const ENV_PREFIX: &str = "TALLY";

/// Loads the application configuration.
///
/// Reads the optional TOML file at `path`, then layers `TALLY__*` environment
/// variables on top (a `.env` file is loaded first if present). Every section
/// has defaults, so a missing file yields a usable configuration.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();

    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.snapshot.path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "snapshot.path must not be empty".to_string(),
        ));
    }
    if config.logging.level.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "logging.level must not be empty".to_string(),
        ));
    }
    Ok(())
}
