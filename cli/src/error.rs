//! Errors that stop a CLI run before or during the conversation.

use thiserror::Error;

/// Anything that makes a binary exit non-zero.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("loading configuration: {0}")]
    Load(#[from] config::LoadError),
    #[error("{0}")]
    Config(#[from] config::ConfigError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("tool registry: {0}")]
    Registry(#[from] weft::RegistryError),
    #[error("listing tools: {0}")]
    ToolSource(#[from] weft::ToolSourceError),
    #[error("building graph: {0}")]
    Compilation(#[from] weft::CompilationError),
    #[error(transparent)]
    Agent(#[from] weft::AgentError),
}

impl RunError {
    /// Process exit code: 2 for setup problems, 130 for Ctrl-C, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Load(_) | RunError::Config(_) | RunError::Io(_) => 2,
            RunError::Agent(weft::AgentError::Cancelled) => 130,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(RunError::from(config::ConfigError::MissingCredential).exit_code(), 2);
        assert_eq!(RunError::from(weft::AgentError::Cancelled).exit_code(), 130);
        assert_eq!(RunError::from(weft::AgentError::InputClosed).exit_code(), 1);
    }

    #[test]
    fn missing_credential_message_names_the_variable() {
        let msg = RunError::from(config::ConfigError::MissingCredential).to_string();
        assert!(msg.contains("GOOGLE_API_KEY"), "{}", msg);
    }
}
