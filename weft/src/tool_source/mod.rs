//! Tool source abstraction: list tools and call a tool.
//!
//! The agents depend on `ToolSource` instead of a concrete registry. ThinkNode's model
//! client is bound to `list_tools()`; ActNode dispatches through
//! `call_tool_with_context`. The workspace implementation is
//! [`AggregateToolSource`](crate::tools::AggregateToolSource) over a validated
//! [`ToolRegistry`](crate::tools::ToolRegistry).

mod context;

pub use context::ToolCallContext;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Tool specification sent to the model: name, description, JSON schema of arguments.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolSpec {
    pub name: String,
    /// Human-readable description for the LLM.
    pub description: Option<String>,
    /// JSON Schema for arguments.
    pub input_schema: Value,
}

/// Result of a single tool call.
///
/// `document` is set by tools that replace the run's document (ActNode writes it back
/// into state); `terminal` is set by tools whose success ends the conversation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCallContent {
    pub text: String,
    pub document: Option<String>,
    pub terminal: bool,
}

impl ToolCallContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }
}

/// Errors from listing or calling tools.
///
/// ActNode converts these into error tool messages; they never abort a run.
#[derive(Debug, Error)]
pub enum ToolSourceError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid arguments: {0}")]
    InvalidInput(String),
    /// The tool ran but its computation failed (e.g. division by zero, overflow).
    #[error("execution failed: {0}")]
    Execution(String),
    /// Persisting data failed (e.g. file write).
    #[error("storage error: {0}")]
    Storage(String),
}

/// Tool source: list tools and call a tool.
#[async_trait]
pub trait ToolSource: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError>;

    /// Call a tool by name with JSON arguments.
    async fn call_tool(&self, name: &str, arguments: Value)
        -> Result<ToolCallContent, ToolSourceError>;

    /// Call a tool with per-call context (conversation, document).
    /// Default implementation ignores `ctx`.
    async fn call_tool_with_context(
        &self,
        name: &str,
        arguments: Value,
        ctx: Option<&ToolCallContext>,
    ) -> Result<ToolCallContent, ToolSourceError> {
        let _ = ctx;
        self.call_tool(name, arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display of each ToolSourceError variant contains expected keywords.
    #[test]
    fn tool_source_error_display_all_variants() {
        let s = ToolSourceError::NotFound("x".into()).to_string();
        assert!(s.contains("not found"), "{}", s);
        let s = ToolSourceError::InvalidInput("bad".into()).to_string();
        assert!(s.contains("invalid"), "{}", s);
        let s = ToolSourceError::Execution("division by zero".into()).to_string();
        assert!(s.contains("division by zero"), "{}", s);
        let s = ToolSourceError::Storage("disk full".into()).to_string();
        assert!(s.contains("storage"), "{}", s);
    }

    #[test]
    fn tool_call_content_builders() {
        let c = ToolCallContent::text("ok").with_document("doc").terminal();
        assert_eq!(c.text, "ok");
        assert_eq!(c.document.as_deref(), Some("doc"));
        assert!(c.terminal);
        assert!(!ToolCallContent::text("x").terminal);
    }
}
