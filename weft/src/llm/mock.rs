//! Mock LLM for tests and offline runs.
//!
//! Plays back a script of responses in order (the last one repeats once the script
//! is exhausted), optionally failing the first N calls with a retryable error.
//! Every request is recorded so tests can assert on prompts.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;
use crate::state::ToolCall;

/// Mock LLM driven by a response script.
pub struct MockLlm {
    script: Vec<LlmResponse>,
    calls: AtomicUsize,
    fail_first: usize,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl MockLlm {
    /// Plays `script` in order; the final entry is repeated for extra calls.
    pub fn scripted(script: Vec<LlmResponse>) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            fail_first: 0,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answers `content` without tool calls.
    pub fn with_no_tool_calls(content: impl Into<String>) -> Self {
        Self::scripted(vec![LlmResponse::text(content)])
    }

    /// First call requests `tool_calls`, later calls answer `final_answer`.
    pub fn first_tools_then_end(tool_calls: Vec<ToolCall>, final_answer: impl Into<String>) -> Self {
        Self::scripted(vec![
            LlmResponse::tools(tool_calls),
            LlmResponse::text(final_answer),
        ])
    }

    /// The first `n` calls fail with `ModelInvocationFailed` and do not consume the script.
    pub fn failing_first(mut self, n: usize) -> Self {
        self.fail_first = n;
        self
    }

    /// Number of `invoke` calls so far, failed ones included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Message lists received by successful calls, in call order.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.fail_first {
            return Err(AgentError::ModelInvocationFailed(format!(
                "mock failure {}",
                n + 1
            )));
        }
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(messages.to_vec());
        }
        let index = n - self.fail_first;
        self.script
            .get(index)
            .or_else(|| self.script.last())
            .cloned()
            .ok_or_else(|| AgentError::ModelInvocationFailed("mock script is empty".into()))
    }
}
