pub mod client;
pub mod response;

pub use client::{CommandGenerator, GeneratedCommand, GenerationError};
pub use response::{extract_command, parse_command_response};
