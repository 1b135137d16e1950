use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::security::ValidationConfig;

/// System-wide config, read before the user's file
pub const SYSTEM_CONFIG_PATH: &str = "/etc/shellwarden/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    DirectoryNotFound,

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    pub llm: LLMConfig,
    pub security: SecurityConfig,
    pub backup: BackupConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LLMConfig {
    pub provider: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub max_tokens: u32,
    pub api_key_env: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SecurityConfig {
    pub require_confirmation: bool,
    pub block_dangerous_commands: bool,
    pub log_commands: bool,
    pub max_command_length: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct BackupConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let home = std::env::var("HOME")
            .map_err(|_| ConfigError::DirectoryNotFound)?;
        Ok(PathBuf::from(home).join(".config").join("shellwarden"))
    }

    /// Get the user config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load defaults, then the system file, then the user file
    pub fn load() -> Result<Self, ConfigError> {
        let user = Self::config_path()?;
        Self::load_layered(&[Path::new(SYSTEM_CONFIG_PATH), user.as_path()])
    }

    /// Deep-merge each existing file over the defaults, later files winning
    ///
    /// Files that do not exist are skipped. Keys absent from a file keep
    /// whatever the earlier layers set.
    pub fn load_layered(paths: &[&Path]) -> Result<Self, ConfigError> {
        let mut merged = toml::Value::try_from(Self::default_config())?;

        for path in paths {
            if !path.exists() {
                continue;
            }
            let contents = fs::read_to_string(path)?;
            let layer: toml::Value = toml::from_str(&contents)?;
            deep_merge(&mut merged, layer);
        }

        let config: Config = merged.try_into()?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to the user config file
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to `path`, readable only by the owner
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Validate before saving
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        // Set permissions to 600 (owner read/write only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Create default configuration
    pub fn default_config() -> Self {
        Config {
            llm: LLMConfig {
                provider: "openai".to_string(),
                model: "gpt-4o-mini".to_string(),
                timeout_seconds: 30,
                max_tokens: 200,
                api_key_env: "OPENAI_API_KEY".to_string(),
            },
            security: SecurityConfig {
                require_confirmation: true,
                block_dangerous_commands: true,
                log_commands: true,
                max_command_length: 1000,
            },
            backup: BackupConfig::default(),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "model must not be empty".to_string()
            ));
        }

        if self.llm.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "timeout_seconds must be greater than 0".to_string()
            ));
        }

        if self.llm.max_tokens == 0 {
            return Err(ConfigError::InvalidValue(
                "max_tokens must be greater than 0".to_string()
            ));
        }

        if self.security.max_command_length == 0 {
            return Err(ConfigError::InvalidValue(
                "max_command_length must be greater than 0".to_string()
            ));
        }

        Ok(())
    }

    /// The settings the command validator runs with
    pub fn validation_config(&self) -> ValidationConfig {
        ValidationConfig {
            require_confirmation: self.security.require_confirmation,
            block_dangerous_commands: self.security.block_dangerous_commands,
            max_command_length: Some(self.security.max_command_length),
        }
    }

    /// Get API key from the configured environment variable
    pub fn get_api_key(&self) -> Option<String> {
        std::env::var(&self.llm.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
    }

    /// Check if API key is available
    pub fn has_api_key(&self) -> bool {
        self.get_api_key().is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

/// Recursively merge `overlay` into `base`; non-table values replace
fn deep_merge(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
