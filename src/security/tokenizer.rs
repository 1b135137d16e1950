/// Shell metacharacters that only a shell can interpret
const SHELL_OPERATORS: &[&str] = &[
    "|", ">", "<", "&", ";", "$", "`", "*", "?", "~",
];

/// Split a command into words using POSIX shell quoting rules
///
/// This is the single tokenizer for the crate: the validator and the
/// shell-mode heuristic both go through it so a command is never parsed two
/// different ways.
pub fn tokenize(command: &str) -> Result<Vec<String>, shell_words::ParseError> {
    shell_words::split(command)
}

/// Whether a command needs `sh -c` rather than a direct exec
///
/// Quoted metacharacters are still counted: once the words are re-joined the
/// quoting is gone, so a literal `*` would glob anyway. Unparseable commands
/// are left to the shell to report.
pub fn needs_shell(command: &str) -> bool {
    match tokenize(command) {
        Ok(words) => {
            let joined = words.join(" ");
            SHELL_OPERATORS.iter().any(|op| joined.contains(op))
        }
        Err(_) => true,
    }
}
