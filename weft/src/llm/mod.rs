//! LLM client abstraction for the model-invocation node.
//!
//! ThinkNode depends on a callable that returns assistant text and optional
//! tool_calls; this module defines the trait, a mock, the OpenAI-compatible
//! client and the retry wrapper used around every model call.

mod mock;
mod openai;

use std::str::FromStr;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::RetryPolicy;
use crate::message::Message;
use crate::state::ToolCall;

pub use mock::MockLlm;
pub use openai::ChatOpenAI;

/// Tool choice mode for chat completions: when tools are present, controls whether
/// the model may choose (auto), must not use (none), or must use (required).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ToolChoiceMode {
    #[default]
    Auto,
    None,
    Required,
}

impl FromStr for ToolChoiceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "none" => Ok(Self::None),
            "required" => Ok(Self::Required),
            _ => Err(format!(
                "unknown tool_choice: {} (use auto, none, or required)",
                s
            )),
        }
    }
}

/// Token usage for one LLM call.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LlmUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Response from an LLM completion: assistant text and requested tool calls.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LlmResponse {
    /// Assistant message content (plain text; may be empty on tool-only turns).
    pub content: String,
    /// Tool calls from this turn; empty means the model answered directly.
    pub tool_calls: Vec<ToolCall>,
    /// Token usage, when the provider reports it.
    pub usage: Option<LlmUsage>,
}

impl LlmResponse {
    /// Plain text answer without tool calls.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Tool-only turn.
    pub fn tools(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Default::default()
        }
    }
}

/// LLM client: given messages, returns assistant text and optional tool_calls.
///
/// Implementations: `MockLlm` (scripted responses), `ChatOpenAI` (any OpenAI-compatible
/// endpoint, Gemini by default). Service failures are `AgentError::ModelInvocationFailed`.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Invoke one turn: read messages, return assistant content and optional tool_calls.
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError>;
}

/// Calls `llm.invoke(messages)`, retrying retryable failures per `policy`.
///
/// Non-retryable errors and the last retryable error are returned as-is.
pub async fn invoke_with_retry(
    llm: &dyn LlmClient,
    messages: &[Message],
    policy: &RetryPolicy,
) -> Result<LlmResponse, AgentError> {
    let mut attempt = 0;
    loop {
        match llm.invoke(messages).await {
            Ok(response) => return Ok(response),
            Err(e) if e.is_retryable() && policy.should_retry(attempt) => {
                let delay = policy.delay(attempt);
                tracing::warn!(attempt = attempt + 1, ?delay, error = %e, "model call failed, retrying");
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
