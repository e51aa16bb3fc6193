//! Application configuration for sitecache.
//!
//! User config lives at `~/.sitecache/sitecache.toml`.
//! CLI flags override config file values, which override defaults.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, SiteError};
use crate::types::CategoryEnums;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "sitecache.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".sitecache";

// ---------------------------------------------------------------------------
// Config structs (matching sitecache.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log batch reports at info level.
    #[serde(default)]
    pub debug: bool,

    /// Slug of the page served at the site root.
    #[serde(default = "default_home_slug")]
    pub home_slug: String,

    /// Content API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Category metadata per content type (`[[category_enums.meetings]]`).
    #[serde(default)]
    pub category_enums: CategoryEnums,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            debug: false,
            home_slug: default_home_slug(),
            api: ApiConfig::default(),
            category_enums: CategoryEnums::new(),
        }
    }
}

fn default_home_slug() -> String {
    "home".into()
}

/// `[api]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the content API; queries go to `{base_url}/graphql`.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Public URL of the site itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_url: Option<String>,

    /// Path prefix the site is served under (prepended to routes).
    #[serde(default)]
    pub public_path: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            client_url: None,
            public_path: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> Url {
    Url::parse("http://localhost:1337").expect("static URL is valid")
}
fn default_timeout_secs() -> u64 {
    10
}

impl AppConfig {
    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.api.base_url.scheme(), "http" | "https") {
            return Err(SiteError::config(format!(
                "api.base_url must be http or https, got '{}'",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(SiteError::config("api.timeout_secs must be greater than 0"));
        }

        for (content_type, entries) in &self.category_enums {
            let mut seen = HashSet::new();
            for entry in entries {
                if let Some(value) = &entry.enum_value {
                    if !seen.insert(value.as_str()) {
                        return Err(SiteError::validation(format!(
                            "duplicate enum '{value}' in category_enums.{content_type}"
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.sitecache/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| SiteError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.sitecache/sitecache.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load and validate the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SiteError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| SiteError::config(format!("failed to parse {}: {e}", path.display())))?;
    config.validate()?;

    tracing::debug!(
        ?path,
        content_types = config.category_enums.len(),
        "config loaded"
    );
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SiteError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content = toml::to_string_pretty(&config).map_err(|e| SiteError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SiteError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
