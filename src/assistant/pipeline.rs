use std::path::Path;

use crate::audit::AuditLogger;
use crate::backup::{BackupManager, BackupRecord};
use crate::config::Config;
use crate::error::AppResult;
use crate::llm::{CommandGenerator, GenerationError};
use crate::security::{needs_shell, CommandValidator, Verdict};

/// A validated command waiting for the execution engine
#[derive(Debug, Clone)]
pub struct PreparedCommand {
    pub command: String,
    pub explanation: Option<String>,
    pub verdict: Verdict,
    /// Snapshot taken because the command edits a config file
    pub backup: Option<BackupRecord>,
    /// Whether the command must run through `sh -c`
    pub needs_shell: bool,
}

/// What the caller should do with a request
#[derive(Debug, Clone)]
pub enum Decision {
    /// The validator refused the command; it must not run
    Blocked { command: String, verdict: Verdict },
    /// Ask the user, showing `verdict.confirmation_reason`
    NeedsConfirmation(PreparedCommand),
    /// Safe to hand to the execution engine as is
    Ready(PreparedCommand),
}

/// Request → command → verdict → backup, stopping short of execution
pub struct Assistant {
    generator: Box<dyn CommandGenerator>,
    validator: CommandValidator,
    backups: Option<BackupManager>,
    audit: Option<AuditLogger>,
}

impl Assistant {
    pub fn new(generator: Box<dyn CommandGenerator>, validator: CommandValidator) -> Self {
        Self {
            generator,
            validator,
            backups: None,
            audit: None,
        }
    }

    /// Wire up validator, backups and audit log from `config`
    pub fn from_config(config: &Config, generator: Box<dyn CommandGenerator>) -> AppResult<Self> {
        let mut assistant = Self::new(generator, CommandValidator::new(config.validation_config()))
            .with_backups(BackupManager::from_config(&config.backup)?);

        if config.security.log_commands {
            assistant = assistant.with_audit(AuditLogger::new()?);
        }

        Ok(assistant)
    }

    pub fn with_backups(mut self, backups: BackupManager) -> Self {
        self.backups = Some(backups);
        self
    }

    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn validator(&self) -> &CommandValidator {
        &self.validator
    }

    /// Generate and vet a command for `request`
    ///
    /// Config files the command edits are backed up here, before the caller
    /// can act on the decision. A failed backup is logged and the command is
    /// still returned, with `backup` left empty.
    pub async fn prepare(&self, request: &str, explain: bool) -> AppResult<Decision> {
        tracing::info!(request, "generating command");

        let generated = match self.generator.generate(request, explain).await {
            Ok(generated) if generated.command.trim().is_empty() => {
                self.audit(|log| log.log_generation_failure(request, "empty command"));
                return Err(GenerationError::EmptyResponse.into());
            }
            Ok(generated) => generated,
            Err(e) => {
                self.audit(|log| log.log_generation_failure(request, &e.to_string()));
                return Err(e.into());
            }
        };

        let command = generated.command.trim().to_string();
        let verdict = self.validator.validate(&command);
        self.audit(|log| log.log_verdict(&command, &verdict));

        if !verdict.valid {
            tracing::warn!(command = %command, reason = %verdict.reason, "command blocked");
            return Ok(Decision::Blocked { command, verdict });
        }

        let backup = if verdict.backup_recommended {
            self.snapshot(verdict.config_editing.file_path.as_deref())
        } else {
            None
        };

        let prepared = PreparedCommand {
            needs_shell: needs_shell(&command),
            command,
            explanation: generated.explanation,
            verdict,
            backup,
        };

        if prepared.verdict.needs_confirmation {
            Ok(Decision::NeedsConfirmation(prepared))
        } else {
            Ok(Decision::Ready(prepared))
        }
    }

    /// Log how a prepared command finished
    pub fn record_outcome(&self, prepared: &PreparedCommand, exit_code: i32) {
        let backup = prepared.backup.as_ref().map(|b| b.backup_path.as_path());
        self.audit(|log| log.log_outcome(&prepared.command, exit_code, backup));
    }

    /// Log that the user declined a prepared command
    pub fn record_cancelled(&self, prepared: &PreparedCommand) {
        self.audit(|log| log.log_cancelled(&prepared.command));
    }

    fn snapshot(&self, file_path: Option<&str>) -> Option<BackupRecord> {
        let backups = self.backups.as_ref()?;
        let file_path = file_path?;

        match backups.create_backup(file_path) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(path = file_path, error = %e, "could not back up file");
                None
            }
        }
    }

    /// Audit writes never abort the pipeline
    fn audit<F>(&self, write: F)
    where
        F: FnOnce(&AuditLogger) -> std::io::Result<()>,
    {
        if let Some(log) = &self.audit {
            if let Err(e) = write(log) {
                tracing::warn!(path = %log.log_path().display(), error = %e, "audit write failed");
            }
        }
    }
}

impl PreparedCommand {
    pub fn backup_path(&self) -> Option<&Path> {
        self.backup.as_ref().map(|b| b.backup_path.as_path())
    }
}
