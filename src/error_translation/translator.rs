use crate::error::AppError;
use crate::llm::GenerationError;
use crate::security::{RiskLevel, Verdict};

#[derive(Debug, Clone)]
pub struct UserFriendlyError {
    pub simple_message: String,
    pub suggestion: Option<String>,
    pub raw_error: String,
}

pub struct ErrorTranslator;

impl ErrorTranslator {
    /// Translate an AppError into a user-friendly error message
    pub fn translate_app_error(error: &AppError) -> UserFriendlyError {
        match error {
            AppError::Config(config_err) => UserFriendlyError {
                simple_message: "Configuration error occurred.".to_string(),
                suggestion: Some("Check your config file at ~/.config/shellwarden/config.toml".to_string()),
                raw_error: config_err.to_string(),
            },
            AppError::Generation(gen_err) => Self::translate_generation(gen_err),
            AppError::Security(sec_err) => UserFriendlyError {
                simple_message: "The security validator could not run.".to_string(),
                suggestion: Some("Check the [security] section of your config".to_string()),
                raw_error: sec_err.to_string(),
            },
            AppError::Backup(backup_err) => UserFriendlyError {
                simple_message: "Could not back up or restore the file.".to_string(),
                suggestion: Some("Check permissions on the backup directory".to_string()),
                raw_error: backup_err.to_string(),
            },
            AppError::Io(io_err) => UserFriendlyError {
                simple_message: "I/O error occurred.".to_string(),
                suggestion: Some("Check file permissions and disk space".to_string()),
                raw_error: io_err.to_string(),
            },
        }
    }

    /// Translate a command generation failure
    pub fn translate_generation(error: &GenerationError) -> UserFriendlyError {
        let raw_error = error.to_string();

        let (simple_message, suggestion) = match error {
            GenerationError::RateLimitExceeded(secs) => (
                "The model provider is rate limiting requests.".to_string(),
                Some(format!("Wait {}s and try again", secs)),
            ),
            GenerationError::Timeout => (
                "The model took too long to answer.".to_string(),
                Some("Raise llm.timeout_seconds or try again".to_string()),
            ),
            GenerationError::EmptyResponse => (
                "No command was generated for that request.".to_string(),
                Some("Try rephrasing the request more concretely".to_string()),
            ),
            GenerationError::ApiError(msg) => Self::match_api_error(msg),
            GenerationError::InvalidResponse(_) | GenerationError::JsonError(_) => (
                "The model returned a response that could not be read.".to_string(),
                None,
            ),
        };

        UserFriendlyError {
            simple_message,
            suggestion,
            raw_error,
        }
    }

    /// Explain why the validator refused a command
    ///
    /// Returns `None` for commands that were allowed.
    pub fn explain_verdict(verdict: &Verdict) -> Option<UserFriendlyError> {
        if verdict.valid {
            return None;
        }

        let (simple_message, suggestion) = match verdict.risk_level {
            RiskLevel::Critical => (
                "This command could destroy the system and is always blocked.".to_string(),
                None,
            ),
            RiskLevel::High => (
                "This command is on the dangerous-command list.".to_string(),
                Some("Set security.block_dangerous_commands = false to allow it".to_string()),
            ),
            RiskLevel::Low | RiskLevel::Medium => match verdict.reason.as_str() {
                "Command too long" => (
                    "The command is longer than the configured limit.".to_string(),
                    Some("Raise security.max_command_length or split the task".to_string()),
                ),
                "Empty command" => ("No command to run.".to_string(), None),
                _ => (
                    "The command could not be parsed.".to_string(),
                    Some("Check for unbalanced quotes".to_string()),
                ),
            },
        };

        Some(UserFriendlyError {
            simple_message,
            suggestion,
            raw_error: verdict.reason.clone(),
        })
    }

    fn match_api_error(message: &str) -> (String, Option<String>) {
        let lower = message.to_lowercase();

        // Authentication failed
        if lower.contains("401") || lower.contains("unauthorized") || lower.contains("invalid api key") {
            return (
                "The API key was rejected.".to_string(),
                Some("Check the environment variable named by llm.api_key_env".to_string()),
            );
        }

        // Unknown model
        if lower.contains("model") && (lower.contains("not found") || lower.contains("does not exist")) {
            return (
                "The configured model is not available.".to_string(),
                Some("Check llm.model in your config".to_string()),
            );
        }

        // Network trouble
        if lower.contains("connection") || lower.contains("dns") {
            return (
                "Could not reach the model provider.".to_string(),
                Some("Check your network connection".to_string()),
            );
        }

        // Default: return the error as-is with no suggestion
        (message.to_string(), None)
    }
}
