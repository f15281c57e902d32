use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Environment variables checked for the API key, in order
pub const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(skip)]
    pub config_path: PathBuf,

    /// Key taken from the environment with the variable it came from;
    /// never written to the file
    #[serde(skip)]
    pub env_key: Option<(&'static str, String)>,
}

/// Where the effective API key comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Env(&'static str),
    File,
    Unset,
}

impl std::fmt::Display for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Env(name) => write!(f, "from ${}", name),
            KeySource::File => f.write_str("from config file"),
            KeySource::Unset => f.write_str("not set"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: String,
    #[serde(default = "default_true")]
    pub auto_download: bool,
    #[serde(default = "default_display")]
    pub display: DisplayMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Terminal,
    None,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Terminal => "terminal",
            DisplayMode::None => "none",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "terminal" => Some(DisplayMode::Terminal),
            "none" => Some(DisplayMode::None),
            _ => None,
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["terminal", "none"]
    }
}

// Default value functions
fn default_model() -> String {
    "gemini-2.5-flash-image-preview".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_output_directory() -> String {
    "./vintage-output".to_string()
}

fn default_true() -> bool {
    true
}

fn default_display() -> DisplayMode {
    DisplayMode::Terminal
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            auto_download: true,
            display: DisplayMode::Terminal,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            output: OutputConfig::default(),
            config_path: PathBuf::new(),
            env_key: None,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "vintage", "vintage-cli")
            .context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from file or create default
    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            Self::from_toml(&content)?
        } else {
            let mut config = Config::default();
            config.config_path = config_path.clone();
            // Create config directory and save default config
            config.save()?;
            config
        };
        config.config_path = config_path;

        // Environment variable takes precedence
        config.apply_env_key(|name| std::env::var(name).ok());

        Ok(config)
    }

    /// Parse config file contents
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would leave the client unusable
    pub fn validate(&self) -> Result<()> {
        if self.api.timeout_secs == 0 {
            anyhow::bail!("Invalid config: api.timeout_secs must be at least 1 second");
        }
        if self.api.model.trim().is_empty() {
            anyhow::bail!("Invalid config: api.model must not be empty");
        }
        Ok(())
    }

    /// Override the API key from the first non-empty variable in [`API_KEY_VARS`]
    pub fn apply_env_key<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(found) = API_KEY_VARS.iter().find_map(|&name| {
            lookup(name)
                .filter(|key| !key.trim().is_empty())
                .map(|key| (name, key))
        }) {
            self.env_key = Some(found);
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        fs::write(&self.config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get API key (environment first, then config file)
    pub fn api_key(&self) -> Option<&str> {
        match self.key_source() {
            KeySource::Env(_) => self.env_key.as_ref().map(|(_, key)| key.as_str()),
            KeySource::File => self.api.key.as_deref(),
            KeySource::Unset => None,
        }
    }

    /// Which of the environment or the config file supplies the API key
    pub fn key_source(&self) -> KeySource {
        if let Some((name, _)) = self.env_key {
            KeySource::Env(name)
        } else if self.api.key.as_deref().is_some_and(|k| !k.is_empty()) {
            KeySource::File
        } else {
            KeySource::Unset
        }
    }

    /// Set a config value by key path (e.g., "api.key", "output.directory")
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api.key" => self.api.key = Some(value.to_string()),
            "api.model" => {
                if value.trim().is_empty() {
                    anyhow::bail!("Model must not be empty. Known models: {}", Self::models().join(", "));
                }
                self.api.model = value.to_string();
            }
            "api.base_url" => self.api.base_url = value.to_string(),
            "api.timeout_secs" => {
                let secs: u64 = value.parse()
                    .context("Invalid number of seconds")?;
                if secs == 0 {
                    anyhow::bail!("Timeout must be at least 1 second");
                }
                self.api.timeout_secs = secs;
            }
            "output.directory" => self.output.directory = value.to_string(),
            "output.auto_download" => {
                self.output.auto_download = value.parse()
                    .context("Invalid boolean value")?;
            }
            "output.display" => {
                self.output.display = DisplayMode::parse(value).with_context(|| {
                    format!("Invalid display mode. Valid values: {}", DisplayMode::variants().join(", "))
                })?;
            }
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        Ok(())
    }

    /// Get a config value by key path
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "api.key" => self.api_key().map(|_| "****".to_string()), // Mask API key
            "api.model" => Some(self.api.model.clone()),
            "api.base_url" => Some(self.api.base_url.clone()),
            "api.timeout_secs" => Some(self.api.timeout_secs.to_string()),
            "output.directory" => Some(self.output.directory.clone()),
            "output.auto_download" => Some(self.output.auto_download.to_string()),
            "output.display" => Some(self.output.display.as_str().to_string()),
            _ => None,
        }
    }

    /// Get all config keys
    pub fn keys() -> &'static [&'static str] {
        &[
            "api.key",
            "api.model",
            "api.base_url",
            "api.timeout_secs",
            "output.directory",
            "output.auto_download",
            "output.display",
        ]
    }

    /// Known image-editing models
    pub fn models() -> &'static [&'static str] {
        &[
            "gemini-2.5-flash-image-preview",
            "gemini-2.5-flash-image",
            "gemini-3-pro-image-preview",
        ]
    }
}
