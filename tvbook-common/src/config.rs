//! Configuration loading and data folder resolution
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is not an error; the service starts on defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable naming the data folder
pub const ENV_DATA_FOLDER: &str = "TVBOOK_DATA_FOLDER";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5780;

/// Default bind host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Database file name inside the data folder
pub const DATABASE_FILE: &str = "tvbook.db";

/// Default EventBus capacity
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the database (and anything else the service writes)
    #[serde(default)]
    pub data_folder: Option<PathBuf>,

    /// Explicit database path; overrides `<data_folder>/tvbook.db`
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Load demo requests into an empty database at startup
    #[serde(default)]
    pub seed_demo: Option<bool>,

    #[serde(default)]
    pub event_capacity: Option<usize>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
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

/// Built-in fallbacks for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub data_folder: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub event_capacity: usize,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            data_folder: default_data_folder(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_level: default_log_level(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// OS-dependent default data folder
fn default_data_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/tvbook (or /var/lib/tvbook for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("tvbook"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/tvbook"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("tvbook"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/tvbook"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("tvbook"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\tvbook"))
    } else {
        PathBuf::from("./tvbook_data")
    }
}

/// Config file locations searched when none is given explicitly
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("tvbook").join("config.toml"));
    }
    if cfg!(unix) {
        paths.push(PathBuf::from("/etc/tvbook/config.toml"));
    }
    paths
}

/// Parse a TOML config file
pub fn parse_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
}

/// Load the TOML config
///
/// An explicitly named file must exist and parse. Otherwise the first default
/// location that exists is used, and no file at all yields `None`.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<Option<TomlConfig>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        info!("Loading config from {}", path.display());
        return parse_toml_config(path).map(Some);
    }

    for path in default_config_paths() {
        if path.exists() {
            info!("Loading config from {}", path.display());
            return parse_toml_config(&path).map(Some);
        }
    }

    warn!("No config file found, using defaults");
    Ok(None)
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub data_folder: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub seed_demo: bool,
    pub log_level: Option<String>,
}

/// Resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub data_folder: PathBuf,
    pub database_path: PathBuf,
    pub seed_demo: bool,
    pub log_level: String,
    pub event_capacity: usize,
}

/// Resolve the data folder: CLI > environment > TOML > compiled default
pub fn resolve_data_folder(cli: Option<&Path>, toml: Option<&TomlConfig>) -> PathBuf {
    if let Some(path) = cli {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(ENV_DATA_FOLDER) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    if let Some(path) = toml.and_then(|t| t.data_folder.clone()) {
        return path;
    }
    CompiledDefaults::for_current_platform().data_folder
}

impl ServiceConfig {
    /// Merge command line, environment, config file and defaults
    pub fn resolve(cli: &CliOverrides, toml: Option<&TomlConfig>) -> Self {
        let defaults = CompiledDefaults::for_current_platform();
        let data_folder = resolve_data_folder(cli.data_folder.as_deref(), toml);
        let database_path = cli
            .database_path
            .clone()
            .or_else(|| toml.and_then(|t| t.database_path.clone()))
            .unwrap_or_else(|| data_folder.join(DATABASE_FILE));

        Self {
            host: cli
                .host
                .clone()
                .or_else(|| toml.and_then(|t| t.host.clone()))
                .unwrap_or(defaults.host),
            port: cli
                .port
                .or_else(|| toml.and_then(|t| t.port))
                .unwrap_or(defaults.port),
            data_folder,
            database_path,
            seed_demo: cli.seed_demo || toml.and_then(|t| t.seed_demo).unwrap_or(false),
            log_level: cli
                .log_level
                .clone()
                .or_else(|| toml.map(|t| t.logging.level.clone()))
                .unwrap_or(defaults.log_level),
            event_capacity: toml
                .and_then(|t| t.event_capacity)
                .filter(|c| *c > 0)
                .unwrap_or(defaults.event_capacity),
        }
    }

    /// `host:port` to bind the HTTP listener to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Create the data folder and the database's parent folder if missing
    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_folder)?;
        if let Some(parent) = self.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
