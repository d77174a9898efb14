//! Drafter agent: an interactive loop that edits one document and saves it.
//!
//! ```text
//! START → agent → tools ─(saved)→ END
//!           ↑       │
//!           └───────┘ (otherwise)
//! ```
//!
//! Every `agent` step takes one user turn (the first turn is a fixed greeting) and
//! calls the model with the live document in the system prompt.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::AgentError;
use crate::graph::{
    CompilationError, CompiledStateGraph, Next, Node, RunConfig, RunContext, StateGraph, START,
};
use crate::llm::LlmClient;
use crate::message::Message;
use crate::state::{ConversationState, DrafterState};
use crate::tool_source::ToolSource;
use crate::tools::{register_document_tools, AggregateToolSource, RegistryError, ToolRegistry};

use super::{
    document_saved_condition, route_path_map, router_fn, ActNode, AgentOptions, ThinkNode,
    UserInput, AGENT_NODE, TOOLS_NODE,
};

/// User turn sent on the first step, before any input is read.
pub const DRAFTER_GREETING: &str = "Hey there i need help!";

/// System prompt with the current document appended.
pub fn drafter_system_prompt(document: &str) -> String {
    format!(
        "You are Drafter, a helpful writing assistant. You are going to help the user update and modify documents.\n\
         \n\
         - If the user wants to update or modify content, use the 'update_document' tool with the complete updated content.\n\
         - If the user wants to save and finish, you need to use the 'save_document' tool.\n\
         - Make sure to always show the current document state after modifications.\n\
         \n\
         The current document content is:{}",
        document
    )
}

/// Validated source with `update_document` and `save_document` (saving into `output_dir`).
pub fn drafter_tools(
    output_dir: impl Into<std::path::PathBuf>,
) -> Result<AggregateToolSource, RegistryError> {
    let mut registry = ToolRegistry::new();
    register_document_tools(&mut registry, output_dir)?;
    AggregateToolSource::new(registry)
}

/// `agent` node of the drafter: one user turn, then one model turn.
pub struct DrafterAgentNode {
    think: ThinkNode<DrafterState>,
    input: Arc<dyn UserInput>,
}

impl DrafterAgentNode {
    pub fn new(think: ThinkNode<DrafterState>, input: Arc<dyn UserInput>) -> Self {
        Self { think, input }
    }

    async fn user_turn(&self, state: &DrafterState) -> Result<String, AgentError> {
        if state.messages.is_empty() {
            return Ok(DRAFTER_GREETING.to_string());
        }
        self.input.read_line("").await
    }
}

#[async_trait]
impl Node<DrafterState> for DrafterAgentNode {
    fn id(&self) -> &str {
        AGENT_NODE
    }

    async fn run(&self, mut state: DrafterState) -> Result<(DrafterState, Next), AgentError> {
        let turn = self.user_turn(&state).await?;
        tracing::debug!(len = turn.len(), "user turn");
        state.push_message(Message::user(turn));
        let state = self.think.think(state).await?;
        Ok((state, Next::Continue))
    }
}

/// Builds the drafter graph. `llm` should already be bound to `tools`' specs.
pub fn build_drafter_graph(
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolSource>,
    input: Arc<dyn UserInput>,
    options: &AgentOptions<DrafterState>,
) -> Result<CompiledStateGraph<DrafterState>, CompilationError> {
    let think: ThinkNode<DrafterState> = ThinkNode::new(
        llm,
        Arc::new(|s: &DrafterState| drafter_system_prompt(&s.document)),
    )
    .with_retry(options.retry.clone());
    let agent = DrafterAgentNode::new(think, input);
    let act = ActNode::new(tools).with_handle_tool_errors(options.handle_tool_errors.clone());
    let signal = options.completion_signal;

    let mut graph = StateGraph::<DrafterState>::new();
    if let Some(middleware) = &options.middleware {
        graph = graph.with_middleware(Arc::clone(middleware));
    }
    graph
        .add_node(AGENT_NODE, Arc::new(agent))
        .add_node(TOOLS_NODE, Arc::new(act))
        .add_edge(START, AGENT_NODE)
        .add_edge(AGENT_NODE, TOOLS_NODE)
        .add_conditional_edges(
            TOOLS_NODE,
            router_fn(move |s: &DrafterState| document_saved_condition(s, signal)),
            Some(route_path_map()),
        );
    graph.compile()
}

/// Compiled drafter graph plus run settings.
pub struct DrafterRunner {
    compiled: CompiledStateGraph<DrafterState>,
    recursion_limit: usize,
}

impl DrafterRunner {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: Arc<dyn ToolSource>,
        input: Arc<dyn UserInput>,
        options: AgentOptions<DrafterState>,
    ) -> Result<Self, CompilationError> {
        let compiled = build_drafter_graph(llm, tools, input, &options)?;
        Ok(Self {
            compiled,
            recursion_limit: options.recursion_limit,
        })
    }

    /// Runs a conversation from an empty document until the document is saved.
    pub async fn run(&self, cancel: CancellationToken) -> Result<DrafterState, AgentError> {
        self.run_from(DrafterState::default(), cancel).await
    }

    /// Runs a conversation from `state`.
    pub async fn run_from(
        &self,
        state: DrafterState,
        cancel: CancellationToken,
    ) -> Result<DrafterState, AgentError> {
        let config = RunConfig::default().with_recursion_limit(self.recursion_limit);
        let ctx = RunContext::new(config).with_cancellation(cancel);
        self.compiled.invoke_with_context(state, ctx).await
    }

    pub fn compiled(&self) -> &CompiledStateGraph<DrafterState> {
        &self.compiled
    }
}
