use anyhow::{Context, Result};
use bandbook_core::model::Language;
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_AI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";

/// Configuration for bandbook.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (BAND_* prefix)
/// 3. Config file (~/.config/bandbook/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite database.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/db
    /// - ENV: BAND_DATABASE_PATH
    /// - Config: database_path = "/path/to/db"
    /// - Default: ~/.local/share/bandbook/bandbook.db
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,

    /// API key for the text-generation service used by `suggest`.
    ///
    /// Can be set via:
    /// - ENV: BAND_AI_API_KEY
    /// - Config: ai_api_key = "..."
    #[serde(default)]
    pub ai_api_key: Option<String>,

    /// Base URL of an OpenAI-compatible chat completions API.
    #[serde(default = "default_ai_base_url")]
    pub ai_base_url: String,

    #[serde(default = "default_ai_model")]
    pub ai_model: String,

    /// Per-request timeout for the text-generation service.
    #[serde(default = "default_ai_timeout_secs")]
    pub ai_timeout_secs: u64,

    /// Language reported by the setlist language-mix figure.
    #[serde(default = "default_target_language")]
    pub target_language: Language,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            ai_api_key: None,
            ai_base_url: default_ai_base_url(),
            ai_model: default_ai_model(),
            ai_timeout_secs: default_ai_timeout_secs(),
            target_language: default_target_language(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/bandbook/config.toml
    /// Reads environment variables with BAND_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("band");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration with custom database path.
    ///
    /// This is used when the --db CLI flag is provided.
    pub fn load_with_db_path(db_path: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.database_path = db_path;
        Ok(config)
    }

    /// Names of the keys `config get` and `config set` accept.
    pub const KEYS: &'static [&'static str] = &[
        "database_path",
        "ai_api_key",
        "ai_base_url",
        "ai_model",
        "ai_timeout_secs",
        "target_language",
    ];

    /// Render one setting for display. Secrets are masked.
    pub fn display_value(&self, key: &str) -> Option<String> {
        Some(match key {
            "database_path" => self.database_path.display().to_string(),
            "ai_api_key" => match &self.ai_api_key {
                Some(k) if k.chars().count() > 4 => {
                    format!("{}…", k.chars().take(4).collect::<String>())
                }
                Some(_) => "<set>".to_string(),
                None => "<not set>".to_string(),
            },
            "ai_base_url" => self.ai_base_url.clone(),
            "ai_model" => self.ai_model.clone(),
            "ai_timeout_secs" => self.ai_timeout_secs.to_string(),
            "target_language" => self.target_language.to_string(),
            _ => return None,
        })
    }
}

/// Get the default database path.
///
/// Returns: ~/.local/share/bandbook/bandbook.db (or platform equivalent)
fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bandbook")
        .join("bandbook.db")
}

fn default_ai_base_url() -> String {
    DEFAULT_AI_BASE_URL.to_string()
}

fn default_ai_model() -> String {
    DEFAULT_AI_MODEL.to_string()
}

const fn default_ai_timeout_secs() -> u64 {
    60
}

const fn default_target_language() -> Language {
    Language::Danish
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/bandbook/config.toml
/// - macOS: ~/Library/Application Support/bandbook/config.toml
/// - Windows: %APPDATA%\bandbook\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bandbook")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Bandbook Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (BAND_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# API key for the text-generation service used by `bandbook suggest`
#
# Can also be set via:
# - Environment: BAND_AI_API_KEY=your-key-here
#ai_api_key = "your-api-key-here"

# Any OpenAI-compatible chat completions endpoint works
#ai_base_url = "https://api.openai.com/v1"
#ai_model = "gpt-4o-mini"
#ai_timeout_secs = 60

# Language the setlist language-mix figure is reported for: danish or english
#target_language = "danish"

# Path to the SQLite database
#
# Can also be set via:
# - CLI: bandbook --db /custom/path.db song list
# - Environment: BAND_DATABASE_PATH=/custom/path.db
#
# Default: Platform-specific data directory
#database_path = "/path/to/custom/bandbook.db"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.database_path.as_os_str().is_empty());
        assert!(config.ai_api_key.is_none());
        assert_eq!(config.ai_base_url, DEFAULT_AI_BASE_URL);
        assert_eq!(config.target_language, Language::Danish);
    }

    #[test]
    fn test_config_load() {
        // Should not fail even if config file doesn't exist
        let result = Config::load();
        assert!(result.is_ok());
    }

    #[test]
    fn test_config_with_custom_db_path() {
        let custom_path = PathBuf::from("/tmp/test.db");
        let config = Config::load_with_db_path(custom_path.clone());
        assert!(config.is_ok());
        assert_eq!(config.unwrap().database_path, custom_path);
    }

    #[test]
    fn test_example_config_parses_as_toml() {
        let parsed: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(parsed.ai_model, DEFAULT_AI_MODEL);
    }

    #[test]
    fn test_display_value_masks_api_key() {
        let config = Config {
            ai_api_key: Some("sk-secret-value".to_string()),
            ..Config::default()
        };
        assert_eq!(config.display_value("ai_api_key").unwrap(), "sk-s…");
        assert_eq!(config.display_value("ai_timeout_secs").unwrap(), "60");
        assert!(config.display_value("nonsense").is_none());
    }

    #[test]
    fn test_every_key_is_displayable() {
        let config = Config::default();
        for key in Config::KEYS {
            assert!(config.display_value(key).is_some(), "{key}");
        }
    }
}
