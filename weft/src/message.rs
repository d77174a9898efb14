//! Message types for conversation state.
//!
//! Roles: System (synthesized per model call, never stored), User, Assistant (with
//! optional tool invocations) and Tool (one result per invocation, linked by call id).
//! Order in the message list is conversational order.

use serde::{Deserialize, Serialize};

use crate::state::{ToolCall, ToolResult};

/// A single message in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// System prompt; placed first in the list sent to the model.
    System(String),
    /// User input.
    User(String),
    /// Model reply; `tool_calls` is empty when the model did not request tools.
    Assistant {
        content: String,
        #[serde(default)]
        tool_calls: Vec<ToolCall>,
    },
    /// Result of one tool invocation; `ToolResult::call_id` links it to the request.
    Tool(ToolResult),
}

impl Message {
    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::System(content.into())
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User(content.into())
    }

    /// Creates an assistant message without tool calls.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls: vec![],
        }
    }

    /// Creates an assistant message that requests tool invocations.
    pub fn assistant_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls,
        }
    }

    /// Creates a tool message from a tool result.
    pub fn tool(result: ToolResult) -> Self {
        Self::Tool(result)
    }

    /// Role name as used by chat completion APIs.
    pub fn role(&self) -> &'static str {
        match self {
            Message::System(_) => "system",
            Message::User(_) => "user",
            Message::Assistant { .. } => "assistant",
            Message::Tool(_) => "tool",
        }
    }

    /// Text content of the message.
    pub fn content(&self) -> &str {
        match self {
            Message::System(s) | Message::User(s) => s,
            Message::Assistant { content, .. } => content,
            Message::Tool(r) => &r.content,
        }
    }

    /// Tool invocations requested by an assistant message; empty for other roles.
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Message::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    pub fn is_assistant(&self) -> bool {
        matches!(self, Message::Assistant { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: constructors produce the correct variant with content.
    #[test]
    fn message_constructors() {
        let sys = Message::system("s");
        assert!(matches!(&sys, Message::System(c) if c == "s"));
        let usr = Message::user("u");
        assert!(matches!(&usr, Message::User(c) if c == "u"));
        let ast = Message::assistant("a");
        assert!(matches!(&ast, Message::Assistant { content, tool_calls } if content == "a" && tool_calls.is_empty()));
    }

    /// **Scenario**: role/content/tool_calls accessors cover all four variants.
    #[test]
    fn accessors_cover_all_roles() {
        let call = ToolCall {
            name: "add".into(),
            arguments: r#"{"a":1,"b":2}"#.into(),
            id: Some("call-1".into()),
        };
        let ast = Message::assistant_with_tool_calls("", vec![call.clone()]);
        assert_eq!(ast.role(), "assistant");
        assert_eq!(ast.tool_calls().len(), 1);
        assert!(ast.is_assistant());

        let tool = Message::tool(ToolResult::success(&call, "3"));
        assert_eq!(tool.role(), "tool");
        assert_eq!(tool.content(), "3");
        assert!(tool.tool_calls().is_empty());
        assert!(!tool.is_assistant());

        assert_eq!(Message::user("hi").role(), "user");
        assert_eq!(Message::system("sys").content(), "sys");
    }

    /// **Scenario**: an assistant message with tool calls survives serde.
    #[test]
    fn assistant_with_tool_calls_serde() {
        let msg = Message::assistant_with_tool_calls(
            "calling",
            vec![ToolCall {
                name: "divide".into(),
                arguments: r#"{"a":6,"b":2}"#.into(),
                id: Some("c1".into()),
            }],
        );
        let json = serde_json::to_string(&msg).expect("serialize");
        let back: Message = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(msg, back);
    }
}
