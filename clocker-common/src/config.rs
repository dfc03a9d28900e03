//! Bootstrap configuration
//!
//! The server reads a small TOML file at startup: listen address, root
//! folder, holiday state, logging and the labor rules for the statistics.
//! Every setting has a built-in default, so a missing file only produces a
//! warning.
//!
//! Root folder resolution priority:
//! 1. Command-line argument
//! 2. `CLOCKER_ROOT_FOLDER` environment variable
//! 3. `root_folder` in the TOML file
//! 4. Platform data directory (`<data dir>/clocker`)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::holidays::FederalState;
use crate::statistics::StatisticsConfig;
use crate::{Error, Result};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "CLOCKER_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "clocker.db";

/// Built-in defaults used when neither CLI, environment nor TOML set a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub holiday_state: FederalState,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = dirs::data_dir()
            .map(|dir| dir.join("clocker"))
            .unwrap_or_else(|| PathBuf::from("clocker"));

        Self {
            root_folder,
            host: "127.0.0.1".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            holiday_state: FederalState::BW,
        }
    }
}

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_folder: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Federal state code used to seed public holidays
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holiday_state: Option<String>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub statistics: StatisticsConfig,
}

impl TomlConfig {
    /// Configured holiday state, falling back to the built-in default
    pub fn holiday_state(&self) -> Result<FederalState> {
        match &self.holiday_state {
            Some(code) => code
                .parse()
                .map_err(|_| Error::Config(format!("Unknown holiday_state '{}'", code))),
            None => Ok(CompiledDefaults::for_current_platform().holiday_state),
        }
    }
}

/// `[logging]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Default location of the configuration file (`<config dir>/clocker/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("clocker").join("config.toml"))
}

/// Load the TOML configuration.
///
/// A missing file yields the defaults with a warning; a malformed file is an
/// error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file {} not found, using built-in defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Resolves the root folder from the configured sources
#[derive(Debug, Clone, Default)]
pub struct RootFolderResolver {
    cli_override: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root folder given on the command line (highest priority)
    pub fn with_cli_override(mut self, root: Option<PathBuf>) -> Self {
        self.cli_override = root;
        self
    }

    /// Root folder from the TOML file
    pub fn with_toml_config(mut self, config: &TomlConfig) -> Self {
        self.toml_root = config.root_folder.clone();
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(root) = &self.cli_override {
            debug!("Root folder from command line: {}", root.display());
            return root.clone();
        }

        if let Ok(root) = std::env::var(ROOT_FOLDER_ENV) {
            if !root.is_empty() {
                debug!("Root folder from {}: {}", ROOT_FOLDER_ENV, root);
                return PathBuf::from(root);
            }
        }

        if let Some(root) = &self.toml_root {
            debug!("Root folder from config file: {}", root.display());
            return root.clone();
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Prepares the resolved root folder
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder (and parents) if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}
