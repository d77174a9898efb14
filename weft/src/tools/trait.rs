use async_trait::async_trait;

use crate::tool_source::{ToolCallContent, ToolCallContext, ToolSourceError, ToolSpec};

/// A single tool that can be called by the LLM.
///
/// Each tool has a unique name, a specification (description and JSON schema) and
/// the call logic. Tools are registered with [`ToolRegistry`](super::ToolRegistry)
/// and dispatched through [`AggregateToolSource`](super::AggregateToolSource).
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use serde_json::Value;
/// use weft::tools::Tool;
/// use weft::tool_source::{ToolCallContent, ToolCallContext, ToolSourceError, ToolSpec};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Tool for Echo {
///     fn name(&self) -> &str {
///         "echo"
///     }
///
///     fn spec(&self) -> ToolSpec {
///         ToolSpec {
///             name: "echo".to_string(),
///             description: Some("Echoes its input".to_string()),
///             input_schema: serde_json::json!({"type": "object", "properties": {}}),
///         }
///     }
///
///     async fn call(
///         &self,
///         args: Value,
///         _ctx: Option<&ToolCallContext>,
///     ) -> Result<ToolCallContent, ToolSourceError> {
///         Ok(ToolCallContent::text(args.to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name of this tool; the model refers to it by this name.
    fn name(&self) -> &str;

    /// Name, description and argument schema sent to the model.
    fn spec(&self) -> ToolSpec;

    /// Executes the tool with the given arguments and optional per-call context.
    ///
    /// Argument problems are `InvalidInput`; failures of the computation itself are
    /// `Execution`; persistence failures are `Storage`.
    async fn call(
        &self,
        args: serde_json::Value,
        ctx: Option<&ToolCallContext>,
    ) -> Result<ToolCallContent, ToolSourceError>;
}
