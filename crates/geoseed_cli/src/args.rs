use clap::{Parser, Subcommand};
use geoseed_core::ConfigOverrides;
use std::path::PathBuf;

/// CLI arguments for geoseed.
///
/// Flags override the matching `GEOSEED_*` environment variables.
#[derive(Debug, Parser)]
#[command(
    name = "geoseed",
    version,
    about = "Install per-country geographic datasets into a SQLite database"
)]
pub struct CliArgs {
    /// Directory holding `<Identifier>.json` datasets
    #[arg(short = 'd', long = "datasets", global = true)]
    pub datasets: Option<PathBuf>,

    /// SQLite database file (created when missing)
    #[arg(long = "database", global = true)]
    pub database: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rotating log files (default: stderr)
    #[arg(long = "log-dir", global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl CliArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            dataset_dir: self.datasets.clone(),
            database_path: self.database.clone(),
            log_level: self.log_level.clone(),
            log_dir: self.log_dir.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List countries with an available dataset
    List,

    /// Show whether a country is installed
    Status {
        /// Country display name, e.g. "Costa Rica"
        country: String,
    },

    /// Install a country's regions and cities
    Install {
        /// Country display name, e.g. "Antigua and Barbuda"
        country: String,
    },
}
