pub mod assistant;
pub mod audit;
pub mod backup;
pub mod config;
pub mod error;
pub mod error_translation;
pub mod llm;
pub mod security;

// Re-export commonly used types for convenience
pub use error::{AppError, AppResult};
pub use security::{classify_edit_target, CommandValidator, ConfigEditTarget, RiskLevel, ValidationConfig, Verdict};
