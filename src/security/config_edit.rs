use serde::Serialize;

use crate::security::patterns::redirect_target;
use crate::security::{CONFIG_EXTENSIONS, CRITICAL_PATHS, EDITORS, SAFE_CONFIG_PATHS, SYSTEM_PATHS};

/// The file a command appears to modify, and what kind of file it is
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigEditTarget {
    pub is_config: bool,
    pub is_critical: bool,
    pub file_path: Option<String>,
    pub editor: Option<String>,
    pub requires_sudo: bool,
}

/// Detect whether `command` edits a configuration file
///
/// `tokens` must be the shell words of `command`. Path classification is a
/// plain prefix test: symlinks, `..` segments and `$VAR` expansions are not
/// resolved.
pub fn classify_edit_target(command: &str, tokens: &[String]) -> ConfigEditTarget {
    let mut target = ConfigEditTarget::default();

    let Some(first) = tokens.first() else {
        return target;
    };
    let base_command = first.to_lowercase();

    if let Some(editor) = editor_invocation(&base_command, tokens) {
        target.editor = Some(editor.to_string());
        target.file_path = tokens[1..]
            .iter()
            .find(|token| looks_like_edited_file(token))
            .cloned();
    } else if command.contains('>') {
        // Covers `echo`/`cat`/`printf ... >> file` along with any other redirect
        target.file_path = redirect_target(command).map(str::to_string);
    }

    if let Some(path) = &target.file_path {
        let class = classify_path(path);
        target.is_config = class.is_config;
        target.is_critical = class.is_critical;
        target.requires_sudo = class.requires_sudo;
    }

    target
}

/// The editor being launched, directly or through `sudo`
///
/// For `sudo nano FILE` this is intentionally `nano`, not `sudo`.
/// `requires_sudo` records the sudo part; `editor` always names the program
/// doing the editing.
fn editor_invocation<'a>(base_command: &'a str, tokens: &'a [String]) -> Option<&'a str> {
    if EDITORS.contains(&base_command) {
        return Some(base_command);
    }
    if base_command == "sudo" {
        if let Some(second) = tokens.get(1) {
            if EDITORS.contains(&second.as_str()) {
                return Some(second.as_str());
            }
        }
    }
    None
}

fn looks_like_edited_file(token: &str) -> bool {
    if token.starts_with('-') {
        return false;
    }
    token.contains('/')
        || token.starts_with('~')
        || CONFIG_EXTENSIONS.iter().any(|ext| token.ends_with(ext))
}

fn has_prefix(path: &str, prefixes: &[&str]) -> bool {
    prefixes
        .iter()
        .any(|prefix| path.starts_with(prefix.trim_end_matches('/')))
}

#[derive(Debug, Default, PartialEq, Eq)]
struct PathClass {
    is_config: bool,
    is_critical: bool,
    requires_sudo: bool,
}

fn classify_path(path: &str) -> PathClass {
    let is_critical = has_prefix(path, CRITICAL_PATHS);
    let requires_sudo = SYSTEM_PATHS.iter().any(|root| path.starts_with(root));

    PathClass {
        is_config: is_critical || requires_sudo || has_prefix(path, SAFE_CONFIG_PATHS),
        is_critical,
        requires_sudo,
    }
}
