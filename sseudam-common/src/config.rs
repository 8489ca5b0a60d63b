//! Configuration loading and root folder resolution
//!
//! Bootstrap settings come from a TOML file. Every key has a built-in
//! default, so a missing or partial file never prevents startup.
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::grade::{GradeTable, GradeTier};
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "SSEUDAM_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "sseudam.db";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the database (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP bind address
    #[serde(default = "default_bind_host")]
    pub bind_host: String,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Grade tiers as `[[grades]]` entries; empty uses the built-in table
    #[serde(default)]
    pub grades: Vec<GradeTier>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Scoring rules applied to detected objects
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Material category reported with each stored record
    #[serde(default = "default_target_category")]
    pub target_category: String,

    /// Detection classes that count as correctly sorted
    #[serde(default = "default_accepted_classes")]
    pub accepted_classes: Vec<String>,

    /// Minimum confidence for an accepted object to count as correct
    #[serde(default = "default_min_correct_confidence")]
    pub min_correct_confidence: f64,
}

/// Outbound delivery settings (live channel and hardware display)
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    /// Display endpoint; empty disables hardware delivery
    #[serde(default = "default_display_url")]
    pub display_url: String,

    /// HTTP timeout for one display request
    #[serde(default = "default_display_timeout_ms")]
    pub display_timeout_ms: u64,

    /// Upper bound on one delivery attempt, per channel
    #[serde(default = "default_delivery_timeout_ms")]
    pub delivery_timeout_ms: u64,

    /// Live channel buffer size
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_port() -> u16 {
    5731
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_target_category() -> String {
    "PET".to_string()
}

fn default_accepted_classes() -> Vec<String> {
    vec!["PET_transparent".to_string()]
}

fn default_min_correct_confidence() -> f64 {
    0.7
}

fn default_display_url() -> String {
    "http://127.0.0.1:5000/display".to_string()
}

fn default_display_timeout_ms() -> u64 {
    2000
}

fn default_delivery_timeout_ms() -> u64 {
    3000
}

fn default_event_capacity() -> usize {
    100
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            port: default_port(),
            bind_host: default_bind_host(),
            logging: LoggingConfig::default(),
            scoring: ScoringConfig::default(),
            delivery: DeliveryConfig::default(),
            grades: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            target_category: default_target_category(),
            accepted_classes: default_accepted_classes(),
            min_correct_confidence: default_min_correct_confidence(),
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            display_url: default_display_url(),
            display_timeout_ms: default_display_timeout_ms(),
            delivery_timeout_ms: default_delivery_timeout_ms(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit path, or from the platform
    /// default location when `path` is `None`
    ///
    /// A missing file yields defaults with a warning. A file that exists
    /// but does not parse is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_file() {
                Some(p) => p,
                None => {
                    info!("No config file found, using built-in defaults");
                    return Ok(Self::default());
                }
            },
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => {
                info!("Loading config from {}", path.display());
                Self::from_toml_str(&content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Config file {} not found, using built-in defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    fn validate(&self) -> Result<()> {
        let c = self.scoring.min_correct_confidence;
        if !(0.0..=1.0).contains(&c) {
            return Err(Error::Config(format!(
                "scoring.min_correct_confidence must be within [0, 1] (got {})",
                c
            )));
        }
        if self.delivery.event_capacity == 0 {
            return Err(Error::Config(
                "delivery.event_capacity must be greater than 0".to_string(),
            ));
        }
        self.grade_table()?;
        Ok(())
    }

    /// Grade table from `[[grades]]`, or the built-in tiers
    pub fn grade_table(&self) -> Result<GradeTable> {
        GradeTable::from_tiers(&self.grades)
    }
}

/// Resolve the root folder
///
/// # Arguments
/// * `cli_arg` - Value of `--root-folder`, if given
/// * `env_var_name` - Environment variable to consult second
/// * `config` - Parsed TOML configuration
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config: &TomlConfig,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Database file location for a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// First existing config file in the platform search order
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("sseudam").join("sseudam-ar.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/sseudam/sseudam-ar.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("sseudam"))
        .unwrap_or_else(|| PathBuf::from("./sseudam_data"))
}
