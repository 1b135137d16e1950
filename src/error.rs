use std::io;
use thiserror::Error;

// Import module-level errors for AppError
use crate::backup::BackupError;
use crate::config::settings::ConfigError;
use crate::llm::client::GenerationError;
use crate::security::validator::ValidationError;

/// Top-level application error that wraps all module-specific errors
///
/// A command the validator refuses is not an error; it comes back as a
/// `Verdict` with `valid == false`. `Security` is only for misuse of the
/// validator itself.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Command generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Security validation error: {0}")]
    Security(#[from] ValidationError),

    #[error("Backup error: {0}")]
    Backup(#[from] BackupError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for application-level operations
pub type AppResult<T> = std::result::Result<T, AppError>;
