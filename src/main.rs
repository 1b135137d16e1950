use shellwarden::audit::AuditLogger;
use shellwarden::config::Config;
use shellwarden::error_translation::ErrorTranslator;
use shellwarden::{AppError, CommandValidator};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: shellwarden '<command>'";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let command = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if command.trim().is_empty() {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            let friendly = ErrorTranslator::translate_app_error(&AppError::from(e));
            eprintln!("Error: {}", friendly.simple_message);
            if let Some(suggestion) = friendly.suggestion {
                eprintln!("  {}", suggestion);
            }
            eprintln!("  ({})", friendly.raw_error);
            return ExitCode::from(2);
        }
    };

    let verdict = CommandValidator::new(config.validation_config()).validate(&command);

    if config.security.log_commands {
        if let Err(e) = AuditLogger::new().and_then(|log| log.log_verdict(&command, &verdict)) {
            tracing::warn!(error = %e, "could not write audit log");
        }
    }

    match serde_json::to_string_pretty(&verdict) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: could not encode verdict: {}", e);
            return ExitCode::from(2);
        }
    }

    if let Some(explained) = ErrorTranslator::explain_verdict(&verdict) {
        eprintln!("Blocked: {}", explained.simple_message);
        if let Some(suggestion) = explained.suggestion {
            eprintln!("  {}", suggestion);
        }
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}
