use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::tool_source::{ToolCallContent, ToolCallContext, ToolSource, ToolSourceError, ToolSpec};
use crate::tools::{RegistryError, ToolRegistry};

/// `ToolSource` over a validated [`ToolRegistry`].
///
/// The registry is frozen once wrapped; the model client and ActNode share the same
/// source so the tools offered and the tools dispatched are always the same set.
///
/// # Examples
///
/// ```
/// # #[tokio::main]
/// # async fn main() {
/// use weft::tool_source::ToolSource;
/// use weft::tools::{register_arithmetic_tools, AggregateToolSource, ToolRegistry};
///
/// let mut registry = ToolRegistry::new();
/// register_arithmetic_tools(&mut registry).unwrap();
/// let source = AggregateToolSource::new(registry).unwrap();
/// let out = source.call_tool("add", serde_json::json!({"a": 3, "b": 9})).await.unwrap();
/// assert_eq!(out.text, "12");
/// # }
/// ```
#[derive(Clone)]
pub struct AggregateToolSource {
    registry: Arc<ToolRegistry>,
}

impl AggregateToolSource {
    /// Validates `registry` and wraps it.
    pub fn new(registry: ToolRegistry) -> Result<Self, RegistryError> {
        registry.validate()?;
        Ok(Self {
            registry: Arc::new(registry),
        })
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

#[async_trait]
impl ToolSource for AggregateToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(self.registry.list())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        self.registry.call(name, arguments, None).await
    }

    async fn call_tool_with_context(
        &self,
        name: &str,
        arguments: Value,
        ctx: Option<&ToolCallContext>,
    ) -> Result<ToolCallContent, ToolSourceError> {
        self.registry.call(name, arguments, ctx).await
    }
}
