//! Runtime configuration.
//!
//! # Responsibility
//! - Resolve dataset directory, database path and logging options from
//!   environment variables with build-time defaults.
//!
//! # Invariants
//! - Values set explicitly always win over environment values.
//! - Blank environment values are treated as unset.

use crate::dataset::bundled_dataset_dir;
use crate::logging::default_log_level;
use std::path::PathBuf;

pub const ENV_DATASET_DIR: &str = "GEOSEED_DATASET_DIR";
pub const ENV_DATABASE: &str = "GEOSEED_DATABASE";
pub const ENV_LOG_LEVEL: &str = "GEOSEED_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "GEOSEED_LOG_DIR";

/// Database file used when nothing else is configured.
pub const DEFAULT_DATABASE_FILE: &str = "geoseed.sqlite3";

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoseedConfig {
    pub dataset_dir: PathBuf,
    pub database_path: PathBuf,
    pub log_level: String,
    /// `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for GeoseedConfig {
    fn default() -> Self {
        Self {
            dataset_dir: bundled_dataset_dir(),
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl GeoseedConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();
        Self {
            dataset_dir: read(ENV_DATASET_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.dataset_dir),
            database_path: read(ENV_DATABASE)
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            log_level: read(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        }
    }

    /// Applies explicitly supplied values on top of this configuration.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(dataset_dir) = overrides.dataset_dir {
            self.dataset_dir = dataset_dir;
        }
        if let Some(database_path) = overrides.database_path {
            self.database_path = database_path;
        }
        if let Some(log_level) = overrides.log_level {
            self.log_level = log_level;
        }
        if overrides.log_dir.is_some() {
            self.log_dir = overrides.log_dir;
        }
        self
    }
}

/// Explicit values, e.g. from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub dataset_dir: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::{
        ConfigOverrides, GeoseedConfig, DEFAULT_DATABASE_FILE, ENV_DATABASE, ENV_LOG_DIR,
        ENV_LOG_LEVEL,
    };
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = GeoseedConfig::from_lookup(lookup(&[]));
        assert_eq!(config, GeoseedConfig::default());
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_FILE));
        assert!(config.dataset_dir.ends_with("datasets"));
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn environment_values_are_trimmed_and_blank_values_ignored() {
        let config = GeoseedConfig::from_lookup(lookup(&[
            (ENV_DATABASE, " /var/lib/geo.sqlite3 "),
            (ENV_LOG_LEVEL, "   "),
            (ENV_LOG_DIR, "/var/log/geoseed"),
        ]));
        assert_eq!(config.database_path, PathBuf::from("/var/lib/geo.sqlite3"));
        assert_eq!(config.log_level, GeoseedConfig::default().log_level);
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/geoseed")));
    }

    #[test]
    fn overrides_win_over_environment() {
        let config = GeoseedConfig::from_lookup(lookup(&[(ENV_DATABASE, "env.sqlite3")]))
            .with_overrides(ConfigOverrides {
                database_path: Some(PathBuf::from("flag.sqlite3")),
                log_level: Some("warn".to_string()),
                ..ConfigOverrides::default()
            });
        assert_eq!(config.database_path, PathBuf::from("flag.sqlite3"));
        assert_eq!(config.log_level, "warn");
    }
}
