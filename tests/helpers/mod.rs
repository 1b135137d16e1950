#![allow(dead_code)]

use async_trait::async_trait;
use shellwarden::llm::{CommandGenerator, GeneratedCommand, GenerationError};
use shellwarden::ValidationConfig;

/// Config used by the reference test suite
pub fn strict_config() -> ValidationConfig {
    ValidationConfig {
        require_confirmation: true,
        block_dangerous_commands: true,
        max_command_length: Some(1000),
    }
}

/// Everything optional switched off
pub fn relaxed_config() -> ValidationConfig {
    ValidationConfig {
        require_confirmation: false,
        block_dangerous_commands: false,
        max_command_length: None,
    }
}

/// Generator that always proposes the same command
pub struct FixedGenerator {
    pub command: String,
}

impl FixedGenerator {
    pub fn boxed(command: &str) -> Box<Self> {
        Box::new(Self {
            command: command.to_string(),
        })
    }
}

#[async_trait]
impl CommandGenerator for FixedGenerator {
    async fn generate(&self, _request: &str, _explain: bool) -> Result<GeneratedCommand, GenerationError> {
        Ok(GeneratedCommand {
            command: self.command.clone(),
            explanation: None,
        })
    }
}
