//! Act node: run the tool calls of the latest assistant message, append tool messages.
//!
//! Calls run sequentially in request order. Each call gets a [`ToolCallContext`] with
//! the current document; a document returned by a tool is
//! written back into state before the next call, so later calls see earlier updates.
//!
//! # Error handling
//!
//! Tool failures (unknown tool, bad arguments, execution or storage errors) become
//! tool messages with `ToolStatus::Error` by default so the model can react:
//!
//! - `HandleToolErrors::Always(None)` - default template (default)
//! - `HandleToolErrors::Always(Some(msg))` - fixed message
//! - `HandleToolErrors::Custom(handler)` - handler builds the message
//! - `HandleToolErrors::Never` - the run fails with `AgentError::ExecutionFailed`

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::error::AgentError;
use crate::graph::{Next, Node, RunContext};
use crate::message::Message;
use crate::state::{ConversationState, ToolCall, ToolResult};
use crate::tool_source::{ToolCallContext, ToolSource, ToolSourceError};

use super::TOOLS_NODE;

/// Default text of an error tool message. `{tool_name}` and `{error}` are substituted.
pub const DEFAULT_TOOL_ERROR_TEMPLATE: &str =
    "Error calling tool '{tool_name}': {error}\n Please fix your mistakes.";

/// Builds the error tool message from the error, tool name and parsed arguments.
pub type ErrorHandlerFn =
    Arc<dyn Fn(&ToolSourceError, &str, &Value) -> String + Send + Sync + 'static>;

/// How ActNode handles tool errors.
#[derive(Clone)]
pub enum HandleToolErrors {
    Never,
    Always(Option<String>),
    Custom(ErrorHandlerFn),
}

impl Default for HandleToolErrors {
    fn default() -> Self {
        Self::Always(None)
    }
}

impl std::fmt::Debug for HandleToolErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Never => write!(f, "HandleToolErrors::Never"),
            Self::Always(msg) => write!(f, "HandleToolErrors::Always({:?})", msg),
            Self::Custom(_) => write!(f, "HandleToolErrors::Custom(<fn>)"),
        }
    }
}

fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

/// Parses `ToolCall.arguments`. Blank means no arguments; a JSON string holding an
/// object is unwrapped once.
fn parse_tool_arguments(arguments: &str) -> Result<Value, ToolSourceError> {
    let invalid = |e: serde_json::Error| {
        ToolSourceError::InvalidInput(format!("arguments are not valid JSON: {}", e))
    };
    if arguments.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    match serde_json::from_str::<Value>(arguments).map_err(invalid)? {
        Value::String(inner) => serde_json::from_str(&inner).map_err(invalid),
        other => Ok(other),
    }
}

/// Tool-dispatch node.
pub struct ActNode<S> {
    id: String,
    tools: Arc<dyn ToolSource>,
    handle_tool_errors: HandleToolErrors,
    _state: PhantomData<fn() -> S>,
}

impl<S: ConversationState> ActNode<S> {
    pub fn new(tools: Arc<dyn ToolSource>) -> Self {
        Self {
            id: TOOLS_NODE.to_string(),
            tools,
            handle_tool_errors: HandleToolErrors::default(),
            _state: PhantomData,
        }
    }

    pub fn with_handle_tool_errors(mut self, handle_tool_errors: HandleToolErrors) -> Self {
        self.handle_tool_errors = handle_tool_errors;
        self
    }

    fn handle_error(
        &self,
        error: &ToolSourceError,
        tool_name: &str,
        args: &Value,
    ) -> Option<String> {
        match &self.handle_tool_errors {
            HandleToolErrors::Never => None,
            HandleToolErrors::Always(custom) => Some(custom.clone().unwrap_or_else(|| {
                DEFAULT_TOOL_ERROR_TEMPLATE
                    .replace("{tool_name}", tool_name)
                    .replace("{error}", &error.to_string())
            })),
            HandleToolErrors::Custom(handler) => Some(handler(error, tool_name, args)),
        }
    }

    fn error_result(
        &self,
        call: &ToolCall,
        error: &ToolSourceError,
        args: &Value,
    ) -> Result<ToolResult, AgentError> {
        match self.handle_error(error, &call.name, args) {
            Some(text) => Ok(ToolResult::error(call, text)),
            None => Err(AgentError::ExecutionFailed(format!(
                "tool {} failed: {}",
                call.name, error
            ))),
        }
    }

    /// Runs every pending call and appends the results to `state`.
    pub async fn dispatch(&self, mut state: S, run_id: Option<&str>) -> Result<S, AgentError> {
        let calls = match state.messages().last() {
            Some(Message::Assistant { tool_calls, .. }) => tool_calls.clone(),
            _ => Vec::new(),
        };
        if calls.is_empty() {
            debug!(node = %self.id, "no pending tool calls");
            return Ok(state);
        }

        for call in &calls {
            let result = self.call_one(&mut state, call, run_id).await?;
            state.push_message(Message::tool(result));
        }
        Ok(state)
    }

    /// Runs one call. A document returned by the tool replaces the state's document.
    async fn call_one(
        &self,
        state: &mut S,
        call: &ToolCall,
        run_id: Option<&str>,
    ) -> Result<ToolResult, AgentError> {
        let args = match parse_tool_arguments(&call.arguments) {
            Ok(args) => args,
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool arguments rejected");
                return self.error_result(call, &e, &Value::Null);
            }
        };

        let mut ctx =
            ToolCallContext::default().with_document(state.document().map(str::to_string));
        if let Some(run_id) = run_id {
            ctx = ctx.with_run_id(run_id);
        }

        debug!(tool = %call.name, args = %args, "calling tool");
        match self
            .tools
            .call_tool_with_context(&call.name, args.clone(), Some(&ctx))
            .await
        {
            Ok(content) => {
                trace!(
                    tool = %call.name,
                    result_len = content.text.len(),
                    result_preview = %truncate_for_log(&content.text, 200),
                    "tool returned"
                );
                if let Some(document) = content.document {
                    state.replace_document(document);
                }
                Ok(ToolResult::success(call, content.text).with_terminal(content.terminal))
            }
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool call failed");
                self.error_result(call, &e, &args)
            }
        }
    }
}

#[async_trait]
impl<S: ConversationState> Node<S> for ActNode<S> {
    fn id(&self) -> &str {
        &self.id
    }

    async fn run(&self, state: S) -> Result<(S, Next), AgentError> {
        let state = self.dispatch(state, None).await?;
        Ok((state, Next::Continue))
    }

    async fn run_with_context(
        &self,
        state: S,
        ctx: &RunContext<S>,
    ) -> Result<(S, Next), AgentError> {
        let state = self.dispatch(state, Some(&ctx.config.run_id)).await?;
        Ok((state, Next::Continue))
    }
}
