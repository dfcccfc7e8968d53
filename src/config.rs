use anyhow::Result;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure that can be loaded from CLI, config file, or environment
///
/// Example configuration file content
/// # Bird Media Proxy Configuration
///
/// # Server configuration
/// listen_on_port = 3000
///
/// # Upstream configuration
/// bird_api_base = "https://api.bird.com"
/// resolve_timeout_secs = 30
/// download_timeout_secs = 60
///
/// # The access key is usually provided via the BIRD_ACCESS_KEY
/// # environment variable instead of the file.
/// bird_access_key = "live_..."
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(version, about, long_about = None)]
#[serde(default)]
pub struct Config {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "PORT")]
    #[serde(default = "default_port")]
    pub listen_on_port: u16,

    /// Bird.com access key used for upstream authorization
    #[arg(long, env = "BIRD_ACCESS_KEY")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bird_access_key: Option<String>,

    /// Base URL of the Bird.com API
    #[arg(long, default_value = "https://api.bird.com")]
    #[serde(default = "default_api_base")]
    pub bird_api_base: String,

    /// Timeout for media resolution calls, in seconds
    #[arg(long, default_value_t = 30)]
    #[serde(default = "default_resolve_timeout")]
    pub resolve_timeout_secs: u64,

    /// Timeout for media downloads, in seconds
    #[arg(long, default_value_t = 60)]
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,

    /// Configuration file path (overrides all other arguments)
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_on_port: default_port(),
            bird_access_key: None,
            bird_api_base: default_api_base(),
            resolve_timeout_secs: default_resolve_timeout(),
            download_timeout_secs: default_download_timeout(),
            config: None,
        }
    }
}

impl Config {
    /// Load configuration from CLI args, optionally merging with a config file
    pub fn load() -> Result<Self> {
        // First parse CLI args
        let mut config = Config::parse();

        // If a config file is specified, load it and merge
        if let Some(config_path) = &config.config {
            let file_config = Self::from_file(Path::new(config_path))?;
            config = config.merge_with_file(file_config);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Merge with file config, CLI args take precedence
    fn merge_with_file(mut self, file_config: Config) -> Self {
        // If CLI value is default, use file value
        if self.listen_on_port == default_port() {
            self.listen_on_port = file_config.listen_on_port;
        }
        if self.bird_api_base == default_api_base() {
            self.bird_api_base = file_config.bird_api_base;
        }
        if self.resolve_timeout_secs == default_resolve_timeout() {
            self.resolve_timeout_secs = file_config.resolve_timeout_secs;
        }
        if self.download_timeout_secs == default_download_timeout() {
            self.download_timeout_secs = file_config.download_timeout_secs;
        }

        // For Option fields, CLI/env takes precedence if Some
        if self.bird_access_key.is_none() {
            self.bird_access_key = file_config.bird_access_key;
        }

        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.bird_api_base.starts_with("http://") && !self.bird_api_base.starts_with("https://")
        {
            return Err(anyhow::anyhow!(
                "Bird API base URL must start with http:// or https://"
            ));
        }
        if self.bird_api_base.ends_with('/') {
            return Err(anyhow::anyhow!(
                "Bird API base URL must not end with a trailing slash"
            ));
        }

        if self.resolve_timeout_secs == 0 || self.download_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Timeouts must be non-zero"));
        }

        // A missing access key is not a startup error: the server starts and
        // resolution requests fail with a configuration error instead.
        if let Some(key) = &self.bird_access_key
            && key.is_empty()
        {
            return Err(anyhow::anyhow!("Bird access key cannot be empty"));
        }

        Ok(())
    }
}

// Default value functions
fn default_port() -> u16 {
    3000
}

fn default_api_base() -> String {
    "https://api.bird.com".to_string()
}

fn default_resolve_timeout() -> u64 {
    30
}

fn default_download_timeout() -> u64 {
    60
}
