//! Configuration loading and data folder resolution
//!
//! Resolution order for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is never fatal; a malformed one is.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the data folder
pub const DATA_FOLDER_ENV: &str = "IDREC_DATA_FOLDER";

/// Database file name inside the data folder
pub const DATABASE_FILE_NAME: &str = "idrec.db";

/// Compiled defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub data_folder: PathBuf,
    pub bind_address: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            data_folder: default_data_folder(),
            bind_address: "127.0.0.1:8000".to_string(),
        }
    }
}

/// OS-dependent default data folder
fn default_data_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/idrec
        dirs::data_local_dir()
            .map(|d| d.join("idrec"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/idrec"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/idrec
        dirs::data_dir()
            .map(|d| d.join("idrec"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/idrec"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\idrec
        dirs::data_local_dir()
            .map(|d| d.join("idrec"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\idrec"))
    } else {
        PathBuf::from("./idrec_data")
    }
}

/// Default TOML path for a module: `<config dir>/idrec/<module>.toml`
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("idrec").join(format!("{}.toml", module_name)))
}

/// Logging section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (e.g. "info", "idrec_ai=debug")
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Which document converter backs `/upload`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConverterKind {
    /// docling-serve HTTP API
    #[default]
    DoclingServe,
    /// External program reading a temporary file
    Command,
    /// UTF-8 text documents taken as-is
    PlainText,
}

/// Document converter section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub kind: ConverterKind,
    /// Base URL of docling-serve
    pub url: String,
    /// Program for the command converter; receives the file path last
    pub command: Option<String>,
    /// Arguments placed before the file path
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            kind: ConverterKind::default(),
            url: "http://127.0.0.1:5001".to_string(),
            command: None,
            args: Vec::new(),
            timeout_secs: 120,
        }
    }
}

/// Field extractor (language model) section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Base URL of the Ollama server
    pub url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:11434".to_string(),
            model: "llama3.2:3b".to_string(),
            timeout_secs: 120,
        }
    }
}

/// TOML configuration file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub data_folder: Option<PathBuf>,
    pub bind_address: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub converter: ConverterConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

impl TomlConfig {
    /// Parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load the file if it exists, otherwise fall back to defaults
    ///
    /// Logs nothing; callers report [`ConfigSource::of`] once logging is up.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }
}

/// Where the TOML settings came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Settings read from this file
    File(PathBuf),
    /// File not present; compiled defaults in effect
    Missing(PathBuf),
    /// No config path on this platform; compiled defaults in effect
    NoConfigDir,
}

impl ConfigSource {
    pub fn of(path: Option<&Path>) -> Self {
        match path {
            Some(path) if path.exists() => ConfigSource::File(path.to_path_buf()),
            Some(path) => ConfigSource::Missing(path.to_path_buf()),
            None => ConfigSource::NoConfigDir,
        }
    }

    /// Log the source at info (file) or warn (defaults) level
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded configuration from {}", path.display()),
            ConfigSource::Missing(path) => warn!(
                "Config file {} not found, using compiled defaults",
                path.display()
            ),
            ConfigSource::NoConfigDir => {
                warn!("No config directory on this platform, using compiled defaults")
            }
        }
    }
}

/// Resolves the data folder holding the database
pub struct DataFolderResolver {
    module_name: String,
}

impl DataFolderResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
        }
    }

    /// CLI argument → `IDREC_DATA_FOLDER` → TOML `data_folder` → compiled default
    pub fn resolve(&self, cli_arg: Option<&Path>, toml: &TomlConfig) -> PathBuf {
        if let Some(path) = cli_arg {
            return path.to_path_buf();
        }

        if let Ok(path) = std::env::var(DATA_FOLDER_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &toml.data_folder {
            return path.clone();
        }

        let default = CompiledDefaults::for_current_platform().data_folder;
        info!(
            module = %self.module_name,
            "Using default data folder {}",
            default.display()
        );
        default
    }
}

/// Creates the data folder and locates the database inside it
pub struct DataFolderInitializer {
    data_folder: PathBuf,
}

impl DataFolderInitializer {
    pub fn new(data_folder: PathBuf) -> Self {
        Self { data_folder }
    }

    /// Create the folder if missing (idempotent)
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.data_folder.exists() {
            std::fs::create_dir_all(&self.data_folder)?;
            info!("Created data folder: {}", self.data_folder.display());
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_folder.join(DATABASE_FILE_NAME)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}
