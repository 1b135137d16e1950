pub mod settings;

pub use settings::{BackupConfig, Config, ConfigError, LLMConfig, SecurityConfig};
