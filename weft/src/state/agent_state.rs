//! Conversation state and tool types shared by the calculator and drafter graphs.
//!
//! ToolCall and ToolResult align with chat-completion `tool_calls` and `tool` messages;
//! ToolResult carries a structured status so routing never depends on result wording.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// A single tool invocation produced by the model and consumed by Tool Dispatch.
///
/// `arguments` is the raw JSON string from the model; ActNode parses it when calling
/// the tool. `id` links the invocation to its [`ToolResult::call_id`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool name as registered in the tool registry.
    pub name: String,
    /// Arguments as JSON string.
    pub arguments: String,
    /// Call identifier; ThinkNode fills one in when the provider omits it.
    pub id: Option<String>,
}

/// Outcome of one tool invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    #[default]
    Success,
    Error,
}

/// Result of executing one tool call, appended to history as `Message::Tool`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Id of the tool call this result answers.
    pub call_id: Option<String>,
    /// Tool name.
    pub name: Option<String>,
    /// Result text shown to the model.
    pub content: String,
    #[serde(default)]
    pub status: ToolStatus,
    /// Set by tools whose success ends the conversation (the drafter's save).
    #[serde(default)]
    pub terminal: bool,
}

impl ToolResult {
    /// Successful result for `call`.
    pub fn success(call: &ToolCall, content: impl Into<String>) -> Self {
        Self {
            call_id: call.id.clone(),
            name: Some(call.name.clone()),
            content: content.into(),
            status: ToolStatus::Success,
            terminal: false,
        }
    }

    /// Error result for `call`; the text describes the failure to the model.
    pub fn error(call: &ToolCall, content: impl Into<String>) -> Self {
        Self {
            call_id: call.id.clone(),
            name: Some(call.name.clone()),
            content: content.into(),
            status: ToolStatus::Error,
            terminal: false,
        }
    }

    pub fn with_terminal(mut self, terminal: bool) -> Self {
        self.terminal = terminal;
        self
    }

    pub fn is_error(&self) -> bool {
        self.status == ToolStatus::Error
    }
}

/// State that think/act nodes and routers read and write.
///
/// Implementors own an append-only message history. States that carry a document
/// (the drafter) override `document` / `replace_document`; the defaults describe a
/// state without one.
pub trait ConversationState: Clone + Send + Sync + Debug + 'static {
    fn messages(&self) -> &[Message];

    fn push_message(&mut self, message: Message);

    /// Current document content, when this state has one.
    fn document(&self) -> Option<&str> {
        None
    }

    /// Replaces the document content. No-op for states without a document.
    fn replace_document(&mut self, _content: String) {}

    /// The most recent assistant message, if any.
    fn last_assistant(&self) -> Option<&Message> {
        self.messages().iter().rev().find(|m| m.is_assistant())
    }

    /// Content of the most recent assistant message; `Some("")` for a tool-only turn.
    fn last_assistant_reply(&self) -> Option<String> {
        self.last_assistant().map(|m| m.content().to_string())
    }

    /// Tool results appended after the most recent assistant message, in order.
    fn latest_tool_batch(&self) -> Vec<&ToolResult> {
        let start = self
            .messages()
            .iter()
            .rposition(|m| m.is_assistant())
            .map(|i| i + 1)
            .unwrap_or(0);
        self.messages()[start..]
            .iter()
            .filter_map(|m| match m {
                Message::Tool(r) => Some(r),
                _ => None,
            })
            .collect()
    }
}

/// State for the calculator graph: conversation history only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculatorState {
    pub messages: Vec<Message>,
}

impl CalculatorState {
    /// State seeded with one user instruction.
    pub fn with_instruction(instruction: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(instruction)],
        }
    }
}

impl ConversationState for CalculatorState {
    fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }
}

/// State for the drafter graph: history plus the document being written.
///
/// The document lives here, owned by the run, and is threaded to tools through
/// `ToolCallContext`; there is no process-wide document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrafterState {
    pub messages: Vec<Message>,
    pub document: String,
}

impl ConversationState for DrafterState {
    fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    fn document(&self) -> Option<&str> {
        Some(&self.document)
    }

    fn replace_document(&mut self, content: String) {
        self.document = content;
    }
}
