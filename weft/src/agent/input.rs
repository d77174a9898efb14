//! User input for the drafter: one line per turn.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::error::AgentError;

/// Source of user turns. End of input is `AgentError::InputClosed`.
#[async_trait]
pub trait UserInput: Send + Sync {
    /// Shows `prompt` (when the source is interactive) and returns the next line
    /// without its line terminator.
    async fn read_line(&self, prompt: &str) -> Result<String, AgentError>;
}

/// Reads lines from the process's stdin.
pub struct StdinInput {
    lines: tokio::sync::Mutex<Lines<BufReader<Stdin>>>,
}

impl StdinInput {
    pub fn new() -> Self {
        Self {
            lines: tokio::sync::Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

impl Default for StdinInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserInput for StdinInput {
    async fn read_line(&self, prompt: &str) -> Result<String, AgentError> {
        if !prompt.is_empty() {
            let mut stdout = std::io::stdout();
            let _ = write!(stdout, "{}", prompt);
            let _ = stdout.flush();
        }
        let mut lines = self.lines.lock().await;
        match lines.next_line().await {
            Ok(Some(line)) => Ok(line.trim_end_matches('\r').to_string()),
            Ok(None) => Err(AgentError::InputClosed),
            Err(e) => Err(AgentError::ExecutionFailed(format!("reading stdin: {}", e))),
        }
    }
}

/// Plays back fixed lines; `InputClosed` once they run out.
pub struct ScriptedInput {
    lines: Mutex<VecDeque<String>>,
}

impl ScriptedInput {
    pub fn new<I, T>(lines: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            lines: Mutex::new(lines.into_iter().map(Into::into).collect()),
        }
    }

    /// Lines not yet consumed.
    pub fn remaining(&self) -> usize {
        self.lines.lock().map(|l| l.len()).unwrap_or(0)
    }
}

#[async_trait]
impl UserInput for ScriptedInput {
    async fn read_line(&self, _prompt: &str) -> Result<String, AgentError> {
        self.lines
            .lock()
            .map_err(|_| AgentError::ExecutionFailed("scripted input poisoned".into()))?
            .pop_front()
            .ok_or(AgentError::InputClosed)
    }
}
