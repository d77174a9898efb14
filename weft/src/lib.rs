//! # Weft
//!
//! Tool-calling agents as small state graphs. A model step (`agent`) and a tool step
//! (`tools`) loop until a router sends the run to `END`.
//!
//! ## Agents
//!
//! - **Calculator** ([`agent::calculator`]): the model answers arithmetic requests
//!   through `add`, `subtract`, `multiply` and `divide`; the run ends at the first
//!   assistant turn without tool calls.
//! - **Drafter** ([`agent::drafter`]): an interactive loop that edits one document with
//!   `update_document` and ends once `save_document` writes it to disk.
//!
//! ## Main modules
//!
//! - [`graph`]: [`StateGraph`], [`CompiledStateGraph`], [`Node`], [`Next`], [`RunContext`],
//!   [`NodeMiddleware`], [`RetryPolicy`].
//! - [`agent`]: [`ThinkNode`], [`ActNode`], the routers ([`tools_condition`],
//!   [`document_saved_condition`]) and the two runners.
//! - [`state`]: [`ConversationState`], [`CalculatorState`], [`DrafterState`], [`ToolCall`],
//!   [`ToolResult`].
//! - [`llm`]: [`LlmClient`], [`MockLlm`], [`ChatOpenAI`].
//! - [`tool_source`] / [`tools`]: [`ToolSource`], [`ToolRegistry`], the arithmetic and
//!   document tools.
//! - [`message`]: [`Message`].
//! - [`stream`]: [`StreamEvent`], [`StreamMode`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use weft::{
//!     calculator_tools, AgentOptions, CalculatorRunner, ConversationState, MockLlm,
//!     DEFAULT_INSTRUCTION,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = Arc::new(MockLlm::with_no_tool_calls("O Lord Top G, ..."));
//! let runner = CalculatorRunner::new(llm, Arc::new(calculator_tools()?), AgentOptions::default())?;
//! let state = runner.invoke(DEFAULT_INSTRUCTION).await?;
//! println!("{:?}", state.last_assistant_reply());
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod error;
pub mod graph;
pub mod llm;
pub mod message;
pub mod runner_common;
pub mod state;
pub mod stream;
pub mod tool_source;
pub mod tools;

pub use agent::{
    build_calculator_graph, build_drafter_graph, calculator_tools, document_saved_condition,
    drafter_system_prompt, drafter_tools, tools_condition, ActNode, AgentOptions,
    CalculatorRunner, CompletionSignal, DrafterAgentNode, DrafterRunner, HandleToolErrors,
    Route, ScriptedInput, StdinInput, ThinkNode, UserInput, CALCULATOR_SYSTEM_PROMPT,
    DEFAULT_INSTRUCTION, DRAFTER_GREETING,
};
pub use error::AgentError;
pub use graph::{
    CompilationError, CompiledStateGraph, LoggingNodeMiddleware, Next, Node, NodeFuture,
    NodeInner, NodeMiddleware, RetryPolicy, RunConfig, RunContext, StateGraph, END, START,
};
pub use llm::{
    invoke_with_retry, ChatOpenAI, LlmClient, LlmResponse, LlmUsage, MockLlm, ToolChoiceMode,
};
pub use message::Message;
pub use runner_common::run_with_events;
pub use state::{
    CalculatorState, ConversationState, DrafterState, ToolCall, ToolResult, ToolStatus,
};
pub use stream::{StreamEvent, StreamMode};
pub use tool_source::{ToolCallContent, ToolCallContext, ToolSource, ToolSourceError, ToolSpec};
pub use tools::{AggregateToolSource, RegistryError, Tool, ToolRegistry};

/// Re-export of the `config` crate (`.env` + XDG config loading, model settings).
pub use env_config as config;
