use regex::Regex;
use std::sync::LazyLock;

use crate::llm::client::{GeneratedCommand, GenerationError};

const EXPLANATION_MARKER: &str = "Explanation:";
const FENCE: &str = "```";

/// Words that make inline code look like a runnable command
const COMMON_COMMANDS: &[&str] = &[
    "ls", "ps", "df", "grep", "find", "sudo", "systemctl", "apt", "nano", "vim",
];

static FENCED_BLOCK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:bash|shell)?\n?(.*?)\n?```").ok());

static INLINE_CODE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"`([^`]+)`").ok());

/// Turn a raw command-mode model reply into a command
///
/// With `explain`, text after `Explanation:` becomes the explanation. A reply
/// wrapped in a Markdown fence is unwrapped.
pub fn parse_command_response(raw: &str, explain: bool) -> Result<GeneratedCommand, GenerationError> {
    let content = raw.trim();

    let (command, explanation) = match content.split_once(EXPLANATION_MARKER) {
        Some((command, explanation)) if explain => {
            let explanation = explanation.trim();
            (
                command.trim(),
                (!explanation.is_empty()).then(|| explanation.to_string()),
            )
        }
        _ => (content, None),
    };

    let command = strip_fence(command).trim();
    if command.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    Ok(GeneratedCommand {
        command: command.to_string(),
        explanation,
    })
}

/// Drop a surrounding ```lang ... ``` fence, keeping the inner lines
fn strip_fence(command: &str) -> &str {
    if command.len() < 2 * FENCE.len() || !command.starts_with(FENCE) || !command.ends_with(FENCE) {
        return command;
    }
    match (command.find('\n'), command.rfind('\n')) {
        (Some(first), Some(last)) if first < last => &command[first + 1..last],
        _ => command,
    }
}

/// Pull a runnable command out of a conversational reply
///
/// Prefers a fenced code block; falls back to inline code that contains a
/// common command word.
pub fn extract_command(text: &str) -> Option<String> {
    if let Some(caps) = FENCED_BLOCK.as_ref().and_then(|re| re.captures(text)) {
        let block = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        if !block.is_empty() {
            return Some(block.to_string());
        }
    }

    let inline = INLINE_CODE.as_ref()?.captures(text)?.get(1)?.as_str().trim();
    inline
        .split_whitespace()
        .any(|word| COMMON_COMMANDS.contains(&word))
        .then(|| inline.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_command() {
        let parsed = parse_command_response("  ls -la\n", false).unwrap();
        assert_eq!(parsed.command, "ls -la");
        assert_eq!(parsed.explanation, None);
    }

    #[test]
    fn test_command_with_explanation() {
        let raw = "du -sh * | sort -h\nExplanation: Shows directory sizes, smallest first.";
        let parsed = parse_command_response(raw, true).unwrap();
        assert_eq!(parsed.command, "du -sh * | sort -h");
        assert_eq!(
            parsed.explanation.as_deref(),
            Some("Shows directory sizes, smallest first.")
        );
    }

    #[test]
    fn test_explanation_ignored_when_not_requested() {
        let raw = "df -h\nExplanation: disk usage";
        let parsed = parse_command_response(raw, false).unwrap();
        assert_eq!(parsed.command, raw);
    }

    #[test]
    fn test_fenced_command() {
        let parsed = parse_command_response("```bash\nps aux | grep nginx\n```", false).unwrap();
        assert_eq!(parsed.command, "ps aux | grep nginx");
    }

    #[test]
    fn test_single_line_fence_kept() {
        let parsed = parse_command_response("```ls```", false).unwrap();
        assert_eq!(parsed.command, "```ls```");
    }

    #[test]
    fn test_empty_response() {
        assert!(matches!(
            parse_command_response("   ", false),
            Err(GenerationError::EmptyResponse)
        ));
        assert!(matches!(
            parse_command_response("```\n\n```", false),
            Err(GenerationError::EmptyResponse)
        ));
    }

    #[test]
    fn test_extract_fenced_block() {
        let reply = "You can check with:\n```shell\nsystemctl status nginx\n```\nThat shows the unit.";
        assert_eq!(extract_command(reply).as_deref(), Some("systemctl status nginx"));
    }

    #[test]
    fn test_extract_inline_code() {
        let reply = "Try `df -h` to see free space.";
        assert_eq!(extract_command(reply).as_deref(), Some("df -h"));
    }

    #[test]
    fn test_extract_inline_non_command() {
        let reply = "Set `max_tokens` higher.";
        assert_eq!(extract_command(reply), None);
    }

    #[test]
    fn test_extract_nothing() {
        assert_eq!(extract_command("Linux is a kernel."), None);
    }
}
