//! Configuration
//!
//! Config is loaded with a layered resolution:
//! 1. An explicit path (`--config`), which must exist
//! 2. The override in the data dir (~/.local/share/tally/config.toml)
//! 3. Embedded defaults (compiled into binary)
//!
//! Keys missing from a file keep their default values.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::recurring::{DEFAULT_MIN_OCCURRENCES, DEFAULT_UPCOMING_DAYS};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/tally.toml");

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database file; `None` means the default location
    pub database_path: Option<PathBuf>,
    pub min_occurrences: usize,
    pub upcoming_days: i64,
    /// Bank category label -> internal category name
    pub bank_categories: HashMap<String, String>,
    /// File the config was read from (`None` for embedded defaults)
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            min_occurrences: DEFAULT_MIN_OCCURRENCES,
            upcoming_days: DEFAULT_UPCOMING_DAYS,
            bank_categories: HashMap::new(),
            source: None,
        }
    }
}

impl Config {
    /// Load configuration (explicit path, then data dir override, then defaults)
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Some(path) = default_config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        debug!("Using embedded default config");
        parse_config(DEFAULT_CONFIG)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let mut config = parse_config(&content)?;
        config.source = Some(path.to_path_buf());
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Database path, falling back to the data dir
    pub fn db_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .or_else(default_db_path)
            .unwrap_or_else(|| PathBuf::from("tally.db"))
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("config.toml"))
}

/// Default database location
pub fn default_db_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("tally.db"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    database: Option<RawDatabase>,
    recurring: Option<RawRecurring>,
    bank_categories: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct RawDatabase {
    path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawRecurring {
    min_occurrences: Option<usize>,
    upcoming_days: Option<i64>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<Config> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = Config::default();

    if let Some(database) = raw.database {
        config.database_path = database.path;
    }

    if let Some(recurring) = raw.recurring {
        if let Some(min) = recurring.min_occurrences {
            config.min_occurrences = min;
        }
        if let Some(days) = recurring.upcoming_days {
            config.upcoming_days = days;
        }
    }

    if let Some(mapping) = raw.bank_categories {
        config.bank_categories = mapping;
    }

    Ok(config)
}
