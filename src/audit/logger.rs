use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use chrono::Utc;

use crate::security::Verdict;

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024; // 10MB

pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    /// Create a new AuditLogger with the default log path
    pub fn new() -> std::io::Result<Self> {
        let log_path = Self::default_log_path()?;
        Self::with_path(log_path)
    }

    /// Create an AuditLogger with a custom log path
    pub fn with_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let log_path = path.as_ref().to_path_buf();

        // Ensure directory exists
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self { log_path })
    }

    /// Get the default log path: ~/.local/share/shellwarden/security.log
    fn default_log_path() -> std::io::Result<PathBuf> {
        let home = std::env::var("HOME")
            .map_err(|_| std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "HOME environment variable not set"
            ))?;

        Ok(PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("shellwarden")
            .join("security.log"))
    }

    /// Record the validator's decision on a command
    pub fn log_verdict(&self, command: &str, verdict: &Verdict) -> std::io::Result<()> {
        let tag = if verdict.valid { "VALIDATED" } else { "BLOCKED" };
        let base = verdict.base_command.as_deref().unwrap_or("-");

        let mut entry = format!(
            "[{}] [base:{}] [risk:{}] reason=\"{}\"",
            tag, base, verdict.risk_level, verdict.reason
        );
        if verdict.needs_confirmation {
            entry.push_str(&format!(" confirm=\"{}\"", verdict.confirmation_reason));
        }
        if let Some(path) = &verdict.config_editing.file_path {
            entry.push_str(&format!(" file=\"{}\"", path));
        }
        entry.push_str(&format!(" command=\"{}\"", command));

        self.append(&entry)
    }

    /// Record how an executed command finished
    pub fn log_outcome(
        &self,
        command: &str,
        exit_code: i32,
        backup: Option<&Path>,
    ) -> std::io::Result<()> {
        let mut entry = format!("[exit:{}] {}", exit_code, command);
        if let Some(backup) = backup {
            entry.push_str(&format!(" backup=\"{}\"", backup.display()));
        }

        self.append(&entry)
    }

    /// Record a command the user declined to run
    pub fn log_cancelled(&self, command: &str) -> std::io::Result<()> {
        self.append(&format!("[CANCELLED] {}", command))
    }

    /// Log a generation failure for forensics
    ///
    /// Records when the model returned nothing usable for a request.
    pub fn log_generation_failure(&self, request: &str, reason: &str) -> std::io::Result<()> {
        self.append(&format!(
            "[GENERATION-FAILED] request=\"{}\" reason=\"{}\"",
            request, reason
        ))
    }

    fn append(&self, entry: &str) -> std::io::Result<()> {
        // Check and rotate log if needed
        self.rotate_if_needed()?;

        let timestamp = Utc::now().to_rfc3339();
        let user = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
        let line = format!("[{}] [{}] {}\n", timestamp, user, entry);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;

        file.write_all(line.as_bytes())?;
        file.flush()?;

        Ok(())
    }

    /// Rotate log file if it exceeds MAX_LOG_SIZE
    fn rotate_if_needed(&self) -> std::io::Result<()> {
        if !self.log_path.exists() {
            return Ok(());
        }

        let metadata = fs::metadata(&self.log_path)?;
        if metadata.len() > MAX_LOG_SIZE {
            // Rotate: security.log -> security.log.1
            let backup_path = self.log_path.with_extension("log.1");
            fs::rename(&self.log_path, backup_path)?;
        }

        Ok(())
    }

    /// Get the path to the log file
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::{validator::validate, ValidationConfig};
    use tempfile::TempDir;

    fn logger() -> (TempDir, AuditLogger) {
        let temp_dir = TempDir::new().unwrap();
        let logger = AuditLogger::with_path(temp_dir.path().join("logs").join("test.log")).unwrap();
        (temp_dir, logger)
    }

    #[test]
    fn test_create_logger_makes_directory() {
        let (temp_dir, logger) = logger();
        assert!(temp_dir.path().join("logs").is_dir());
        assert_eq!(logger.log_path(), temp_dir.path().join("logs").join("test.log"));
    }

    #[test]
    fn test_log_blocked_verdict() {
        let (_temp, logger) = logger();
        let verdict = validate("rm -rf /", &ValidationConfig::default());

        logger.log_verdict("rm -rf /", &verdict).unwrap();

        let content = fs::read_to_string(logger.log_path()).unwrap();
        assert!(content.contains("[BLOCKED]"));
        assert!(content.contains("[base:rm]"));
        assert!(content.contains("[risk:CRITICAL]"));
        assert!(content.contains("Critical security pattern detected"));
    }

    #[test]
    fn test_log_config_edit_verdict() {
        let (_temp, logger) = logger();
        let verdict = validate("sudo nano /etc/hosts", &ValidationConfig::default());

        logger.log_verdict("sudo nano /etc/hosts", &verdict).unwrap();

        let content = fs::read_to_string(logger.log_path()).unwrap();
        assert!(content.contains("[VALIDATED]"));
        assert!(content.contains("[risk:MEDIUM]"));
        assert!(content.contains("file=\"/etc/hosts\""));
        assert!(content.contains("confirm=\""));
    }

    #[test]
    fn test_multiple_log_entries() {
        let (_temp, logger) = logger();

        logger.log_outcome("ls -la", 0, None).unwrap();
        logger.log_cancelled("rm -r build").unwrap();
        logger
            .log_outcome("nano ~/.bashrc", 0, Some(Path::new("/backups/bashrc")))
            .unwrap();

        let content = fs::read_to_string(logger.log_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("[exit:0] ls -la"));
        assert!(lines[1].contains("[CANCELLED] rm -r build"));
        assert!(lines[2].contains("backup=\"/backups/bashrc\""));
    }

    #[test]
    fn test_log_rotation() {
        let (_temp, logger) = logger();

        // Write a large entry to trigger rotation
        let large_command = "echo ".to_string() + &"x".repeat(MAX_LOG_SIZE as usize);
        logger.log_outcome(&large_command, 0, None).unwrap();

        // Write another entry - should trigger rotation
        logger.log_outcome("ls", 0, None).unwrap();

        // Check backup file exists
        let backup_path = logger.log_path().with_extension("log.1");
        assert!(backup_path.exists());

        // New log should exist and be smaller
        let metadata = fs::metadata(logger.log_path()).unwrap();
        assert!(metadata.len() < MAX_LOG_SIZE);
    }

    #[test]
    fn test_log_generation_failure() {
        let (_temp, logger) = logger();

        logger
            .log_generation_failure("free up disk space", "empty response")
            .unwrap();

        let content = fs::read_to_string(logger.log_path()).unwrap();
        assert!(content.contains("GENERATION-FAILED"));
        assert!(content.contains("free up disk space"));
        assert!(content.contains("empty response"));
    }
}
