//! Calculator agent: the model answers arithmetic requests through four tools.
//!
//! ```text
//! START → agent ─(tool calls)→ tools → agent
//!           └──(no tool calls)→ END
//! ```

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::AgentError;
use crate::graph::{CompilationError, CompiledStateGraph, RunConfig, StateGraph, START};
use crate::llm::LlmClient;
use crate::runner_common::run_with_events;
use crate::state::CalculatorState;
use crate::stream::{StreamEvent, StreamMode};
use crate::tool_source::ToolSource;
use crate::tools::{register_arithmetic_tools, AggregateToolSource, RegistryError, ToolRegistry};

use super::{
    route_path_map, router_fn, tools_condition, ActNode, AgentOptions, ThinkNode, AGENT_NODE,
    TOOLS_NODE,
};

pub const CALCULATOR_SYSTEM_PROMPT: &str = "You are my AI assistant, you need to answer all my queries and before answering them, make sure to call me : O Lord Top G";

/// Instruction used when none is given on the command line.
pub const DEFAULT_INSTRUCTION: &str =
    "Add 3 and 9, minus 9 from 10, multiply 8 by 5, divide 6 by 2";

/// Validated source with `add`, `subtract`, `multiply` and `divide`.
pub fn calculator_tools() -> Result<AggregateToolSource, RegistryError> {
    let mut registry = ToolRegistry::new();
    register_arithmetic_tools(&mut registry)?;
    AggregateToolSource::new(registry)
}

/// Builds the calculator graph. `llm` should already be bound to `tools`' specs.
pub fn build_calculator_graph(
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolSource>,
    options: &AgentOptions<CalculatorState>,
) -> Result<CompiledStateGraph<CalculatorState>, CompilationError> {
    let think = ThinkNode::with_static_prompt(llm, CALCULATOR_SYSTEM_PROMPT)
        .with_retry(options.retry.clone());
    let act = ActNode::new(tools).with_handle_tool_errors(options.handle_tool_errors.clone());

    let mut graph = StateGraph::<CalculatorState>::new();
    if let Some(middleware) = &options.middleware {
        graph = graph.with_middleware(Arc::clone(middleware));
    }
    graph
        .add_node(AGENT_NODE, Arc::new(think))
        .add_node(TOOLS_NODE, Arc::new(act))
        .add_edge(START, AGENT_NODE)
        .add_conditional_edges(
            AGENT_NODE,
            router_fn(|s: &CalculatorState| tools_condition(s)),
            Some(route_path_map()),
        )
        .add_edge(TOOLS_NODE, AGENT_NODE);
    graph.compile()
}

/// Compiled calculator graph plus run settings.
pub struct CalculatorRunner {
    compiled: CompiledStateGraph<CalculatorState>,
    recursion_limit: usize,
}

impl CalculatorRunner {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: Arc<dyn ToolSource>,
        options: AgentOptions<CalculatorState>,
    ) -> Result<Self, CompilationError> {
        let compiled = build_calculator_graph(llm, tools, &options)?;
        Ok(Self {
            compiled,
            recursion_limit: options.recursion_limit,
        })
    }

    fn run_config(&self) -> RunConfig {
        RunConfig::default().with_recursion_limit(self.recursion_limit)
    }

    /// Runs one instruction to completion.
    pub async fn invoke(&self, instruction: &str) -> Result<CalculatorState, AgentError> {
        self.compiled
            .invoke(
                CalculatorState::with_instruction(instruction),
                Some(self.run_config()),
            )
            .await
    }

    /// Runs one instruction, handing every intermediate state to `on_state`.
    ///
    /// The first call sees the state after the first model turn.
    pub async fn run_with_states<F>(
        &self,
        instruction: &str,
        cancel: CancellationToken,
        mut on_state: F,
    ) -> Result<CalculatorState, AgentError>
    where
        F: FnMut(&CalculatorState),
    {
        run_with_events(
            &self.compiled,
            CalculatorState::with_instruction(instruction),
            self.run_config(),
            cancel,
            [StreamMode::Values],
            |event| {
                if let StreamEvent::Values(state) = event {
                    on_state(&state);
                }
            },
        )
        .await
    }

    pub fn compiled(&self) -> &CompiledStateGraph<CalculatorState> {
        &self.compiled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmResponse, MockLlm};
    use crate::message::Message;
    use crate::state::{ConversationState, ToolCall};

    fn call(name: &str, a: i64, b: i64) -> ToolCall {
        ToolCall {
            name: name.into(),
            arguments: format!(r#"{{"a":{},"b":{}}}"#, a, b),
            id: None,
        }
    }

    fn runner(llm: Arc<MockLlm>) -> CalculatorRunner {
        CalculatorRunner::new(
            llm,
            Arc::new(calculator_tools().unwrap()),
            AgentOptions::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn answer_without_tools_ends_after_one_turn() {
        let llm = Arc::new(MockLlm::with_no_tool_calls("O Lord Top G, nothing to compute."));
        let out = runner(llm.clone()).invoke("hello").await.unwrap();
        assert_eq!(out.messages.len(), 2);
        assert_eq!(llm.call_count(), 1);
        assert_eq!(
            llm.requests()[0][0],
            Message::system(CALCULATOR_SYSTEM_PROMPT)
        );
    }

    /// **Scenario**: one tool round then a final answer; states are reported per step.
    #[tokio::test]
    async fn reports_each_state() {
        let llm = Arc::new(MockLlm::first_tools_then_end(
            vec![call("add", 3, 9)],
            "O Lord Top G, 3 + 9 = 12.",
        ));
        let mut lengths = Vec::new();
        let out = runner(llm)
            .run_with_states("Add 3 and 9", CancellationToken::new(), |s| {
                lengths.push(s.messages.len())
            })
            .await
            .unwrap();
        assert_eq!(lengths, vec![2, 3, 4]);
        assert_eq!(out.last_assistant_reply().as_deref(), Some("O Lord Top G, 3 + 9 = 12."));
    }

    #[tokio::test]
    async fn endless_tool_calls_hit_recursion_limit() {
        let llm = Arc::new(MockLlm::scripted(vec![LlmResponse::tools(vec![call(
            "add", 1, 1,
        )])]));
        let runner = CalculatorRunner::new(
            llm,
            Arc::new(calculator_tools().unwrap()),
            AgentOptions::default().with_recursion_limit(6),
        )
        .unwrap();
        let err = runner.invoke("loop").await.unwrap_err();
        assert!(matches!(err, AgentError::RecursionLimit(6)));
    }

    #[tokio::test]
    async fn cancelled_token_stops_run() {
        let llm = Arc::new(MockLlm::with_no_tool_calls("never"));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = runner(llm.clone())
            .run_with_states("x", cancel, |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Cancelled));
        assert_eq!(llm.call_count(), 0);
    }
}
