use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

use crate::security::config_edit::{classify_edit_target, ConfigEditTarget};
use crate::security::patterns::{find_critical, find_warning};
use crate::security::tokenizer::tokenize;
use crate::security::{CONFIRMATION_COMMANDS, DANGEROUS_COMMANDS};

/// Used when the caller leaves `max_command_length` unset
pub const DEFAULT_MAX_COMMAND_LENGTH: usize = 2000;

static DANGEROUS_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| DANGEROUS_COMMANDS.iter().copied().collect());

static CONFIRMATION_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| CONFIRMATION_COMMANDS.iter().copied().collect());

/// Faults in how the validator was called
///
/// A blocked command is never an error; it is a `Verdict` with `valid == false`.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("No validation config supplied")]
    MissingConfig,

    #[error("Invalid validation config: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
            RiskLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub require_confirmation: bool,
    pub block_dangerous_commands: bool,
    pub max_command_length: Option<usize>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            require_confirmation: true,
            block_dangerous_commands: true,
            max_command_length: None,
        }
    }
}

impl ValidationConfig {
    fn effective_max_length(&self) -> usize {
        self.max_command_length.unwrap_or(DEFAULT_MAX_COMMAND_LENGTH)
    }
}

/// Outcome of validating one command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub valid: bool,
    pub reason: String,
    pub risk_level: RiskLevel,
    pub needs_confirmation: bool,
    pub confirmation_reason: String,
    pub base_command: Option<String>,
    pub warning_pattern: Option<String>,
    pub config_editing: ConfigEditTarget,
    pub backup_recommended: bool,
}

impl Verdict {
    fn rejected(reason: impl Into<String>, risk_level: RiskLevel, base_command: Option<String>) -> Self {
        Self {
            valid: false,
            reason: reason.into(),
            risk_level,
            needs_confirmation: false,
            confirmation_reason: String::new(),
            base_command,
            warning_pattern: None,
            config_editing: ConfigEditTarget::default(),
            backup_recommended: false,
        }
    }

    pub fn is_blocked(&self) -> bool {
        !self.valid
    }
}

/// Classifies shell commands before they are run
///
/// Holds nothing but its config; the classification tables are shared
/// statics, so a validator can be cloned or shared across threads freely.
#[derive(Debug, Clone, Default)]
pub struct CommandValidator {
    config: ValidationConfig,
}

impl CommandValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a shell command
    pub fn validate(&self, command: &str) -> Verdict {
        validate(command, &self.config)
    }
}

/// Validate with a config that may be absent
///
/// Returns an error only when the validator itself cannot run; every command,
/// however malformed, still yields a `Verdict`.
pub fn validate_with(command: &str, config: Option<&ValidationConfig>) -> Result<Verdict, ValidationError> {
    let config = config.ok_or(ValidationError::MissingConfig)?;

    if config.max_command_length == Some(0) {
        return Err(ValidationError::InvalidConfig(
            "max_command_length must be greater than 0".to_string(),
        ));
    }

    Ok(validate(command, config))
}

/// Validate a shell command against `config`
pub fn validate(command: &str, config: &ValidationConfig) -> Verdict {
    let command = command.trim();

    if command.is_empty() {
        return Verdict::rejected("Empty command", RiskLevel::Low, None);
    }

    if command.chars().count() > config.effective_max_length() {
        return Verdict::rejected("Command too long", RiskLevel::Low, None);
    }

    let tokens = match tokenize(command) {
        Ok(tokens) => tokens,
        Err(e) => {
            return Verdict::rejected(format!("Invalid syntax: {}", e), RiskLevel::Low, None);
        }
    };

    let Some(first) = tokens.first() else {
        return Verdict::rejected("Unable to parse command", RiskLevel::Low, None);
    };
    let base_command = first.to_lowercase();

    // Hard blocks, independent of config
    if let Some(pattern) = find_critical(command) {
        tracing::error!(pattern = pattern.source, command, "blocked critical pattern");
        return Verdict::rejected(
            "Critical security pattern detected - command blocked",
            RiskLevel::Critical,
            Some(base_command),
        );
    }

    if config.block_dangerous_commands && is_dangerous(&base_command) {
        tracing::warn!(base_command = %base_command, "blocked dangerous command");
        return Verdict::rejected(
            format!("Dangerous command blocked: {}", base_command),
            RiskLevel::High,
            Some(base_command),
        );
    }

    let warning = find_warning(command);
    let config_editing = classify_edit_target(command, &tokens);

    let mut reasons = Vec::new();

    if CONFIRMATION_SET.contains(base_command.as_str()) {
        reasons.push(format!("'{}' modifies system state", base_command));
    }

    if warning.is_some() {
        reasons.push("potentially risky operation detected".to_string());
    }

    if config_editing.is_config {
        reasons.push(format!(
            "editing configuration file: {}",
            config_editing.file_path.as_deref().unwrap_or_default()
        ));
    }

    if config_editing.is_critical {
        reasons.push("CRITICAL SYSTEM FILE - extra caution required".to_string());
    }

    let risk_level = if config_editing.is_critical {
        RiskLevel::High
    } else if warning.is_some() || config_editing.is_config {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    let backup_recommended = config_editing.is_config || config_editing.is_critical;

    tracing::debug!(
        base_command = %base_command,
        risk = %risk_level,
        file = ?config_editing.file_path,
        "command classified"
    );

    Verdict {
        valid: true,
        reason: "Command validated".to_string(),
        risk_level,
        needs_confirmation: !reasons.is_empty() && config.require_confirmation,
        confirmation_reason: reasons.join("; "),
        base_command: Some(base_command),
        warning_pattern: warning.map(|p| p.source.to_string()),
        config_editing,
        backup_recommended,
    }
}

/// Tools shipped as `<family>.<fstype>` helpers, e.g. `mkfs.ext4`
const DOTTED_FAMILIES: &[&str] = &["mkfs", "fsck"];

/// Membership in the dangerous set, counting `mkfs.ext4` as `mkfs`
fn is_dangerous(base_command: &str) -> bool {
    if DANGEROUS_SET.contains(base_command) {
        return true;
    }
    base_command
        .split_once('.')
        .is_some_and(|(family, _)| DOTTED_FAMILIES.contains(&family))
}
