//! Integration test: hand-built agent graphs from the public nodes and routers.

mod init_logging;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use weft::{
    calculator_tools, tools_condition, ActNode, AgentError, CalculatorState, CompilationError,
    Message, MockLlm, Next, NodeInner, NodeMiddleware, StateGraph, ThinkNode, ToolCall, END,
    START,
};

/// Records the order in which nodes run.
#[derive(Default)]
struct Trace(Mutex<Vec<String>>);

#[async_trait]
impl NodeMiddleware<CalculatorState> for Trace {
    async fn around_run(
        &self,
        node_id: &str,
        state: CalculatorState,
        inner: NodeInner<CalculatorState>,
    ) -> Result<(CalculatorState, Next), AgentError> {
        if let Ok(mut seen) = self.0.lock() {
            seen.push(node_id.to_string());
        }
        inner(state).await
    }
}

fn path_map() -> HashMap<String, String> {
    [
        ("tools".to_string(), "act".to_string()),
        (END.to_string(), END.to_string()),
    ]
    .into_iter()
    .collect()
}

/// **Scenario**: renamed nodes with a custom path map; middleware sees think, act, think.
#[tokio::test]
async fn custom_node_names_with_middleware() {
    let llm = Arc::new(MockLlm::first_tools_then_end(
        vec![ToolCall {
            name: "multiply".into(),
            arguments: r#"{"a":8,"b":5}"#.into(),
            id: None,
        }],
        "40",
    ));
    let trace = Arc::new(Trace::default());

    let mut graph = StateGraph::<CalculatorState>::new().with_middleware(trace.clone());
    graph
        .add_node("think", Arc::new(ThinkNode::with_static_prompt(llm, "be brief")))
        .add_node(
            "act",
            Arc::new(ActNode::new(Arc::new(calculator_tools().unwrap()))),
        )
        .add_edge(START, "think")
        .add_conditional_edges(
            "think",
            Arc::new(|s: &CalculatorState| tools_condition(s).as_str().to_string()),
            Some(path_map()),
        )
        .add_edge("act", "think");
    let compiled = graph.compile().expect("valid graph");

    let out = compiled
        .invoke(CalculatorState::with_instruction("8 times 5"), None)
        .await
        .unwrap();

    assert_eq!(*trace.0.lock().unwrap(), vec!["think", "act", "think"]);
    assert_eq!(out.messages.len(), 4);
    assert_eq!(out.messages[2].content(), "40");
    // ThinkNode fills in a call id; the tool result answers the same id.
    let call_id = out.messages[1].tool_calls()[0].id.clone();
    assert!(call_id.is_some());
    match &out.messages[2] {
        Message::Tool(r) => assert_eq!(r.call_id, call_id),
        other => panic!("expected tool message, got {:?}", other),
    }
}

/// **Scenario**: a path map pointing at a node that was never added fails to compile.
#[test]
fn path_map_target_must_exist() {
    let llm = Arc::new(MockLlm::with_no_tool_calls("hi"));
    let mut graph = StateGraph::<CalculatorState>::new();
    graph
        .add_node("think", Arc::new(ThinkNode::with_static_prompt(llm, "sys")))
        .add_edge(START, "think")
        .add_conditional_edges(
            "think",
            Arc::new(|s: &CalculatorState| tools_condition(s).as_str().to_string()),
            Some(path_map()),
        );
    match graph.compile() {
        Err(CompilationError::InvalidConditionalPathMap(id)) => assert_eq!(id, "act"),
        other => panic!("expected InvalidConditionalPathMap, got {:?}", other.err()),
    }
}
