use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    #[serde(default)]
    pub list: ListConfig,

    #[serde(default)]
    pub folders: FolderConfig,

    #[serde(default)]
    pub backend: BackendConfig,
}

/// Geometry of windowed document lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ListConfig {
    /// Height assumed for rows that have not been measured yet
    #[serde(default = "default_row_height")]
    pub estimated_row_height: f64,

    /// Height of the scroll container
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,

    /// Rows rendered beyond each edge of the viewport
    #[serde(default = "default_overscan")]
    pub overscan: usize,

    /// How close (in rows) the window may get to the end of the loaded rows
    /// before more are requested
    #[serde(default = "default_near_end_offset")]
    pub near_end_offset: usize,
}

fn default_row_height() -> f64 {
    56.0
}

fn default_viewport_height() -> f64 {
    800.0
}

fn default_overscan() -> usize {
    10
}

fn default_near_end_offset() -> usize {
    5
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            estimated_row_height: default_row_height(),
            viewport_height: default_viewport_height(),
            overscan: default_overscan(),
            near_end_offset: default_near_end_offset(),
        }
    }
}

/// Folder loading configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FolderConfig {
    /// Maximum number of records fetched per folder query
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,

    /// Whether folder queries descend into subfolders
    #[serde(default = "default_false")]
    pub recursive: bool,

    /// Folder to start from (None for the top level)
    #[serde(default)]
    pub root_id: Option<String>,
}

fn default_page_limit() -> usize {
    100
}

fn default_false() -> bool {
    false
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self {
            page_limit: default_page_limit(),
            recursive: false,
            root_id: None,
        }
    }
}

/// Metadata backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BackendConfig {
    /// Base URL of the listing endpoint (None: no HTTP backend)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Environment variable holding the bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_token_env() -> String {
    "DOCSHELF_TOKEN".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: default_timeout_ms(),
            token_env: default_token_env(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let config: Config =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path.as_ref(), contents).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let row_height = self.list.estimated_row_height;
        if !row_height.is_finite() || row_height <= 0.0 {
            return Err(ConfigError::ValidationError(
                "estimated_row_height must be a positive number".to_string(),
            ));
        }

        let viewport_height = self.list.viewport_height;
        if !viewport_height.is_finite() || viewport_height < 0.0 {
            return Err(ConfigError::ValidationError(
                "viewport_height must be a non-negative number".to_string(),
            ));
        }

        if self.folders.page_limit == 0 {
            return Err(ConfigError::ValidationError(
                "page_limit must be greater than 0".to_string(),
            ));
        }

        if let Some(url) = &self.backend.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::ValidationError(format!(
                    "base_url must be an http(s) URL, got {url:?}"
                )));
            }
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "IO error: {msg}"),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            ConfigError::SerializeError(msg) => write!(f, "Serialize error: {msg}"),
            ConfigError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
