//! Agents: the agent ⇄ tools loop shared by the calculator and the drafter.
//!
//! # Main types
//!
//! - **[`ThinkNode`]**: prepends a system prompt, calls the model, appends one
//!   assistant message.
//! - **[`ActNode`]**: runs the latest tool calls in order and appends one tool message
//!   per call.
//! - **[`tools_condition`]** / **[`document_saved_condition`]**: the routers.
//! - **[`calculator`]** and **[`drafter`]**: graph builders and runners for each agent.

pub mod calculator;
pub mod drafter;
pub mod input;

mod act_node;
mod options;
mod think_node;

use std::collections::HashMap;
use std::sync::Arc;

pub use act_node::{ActNode, ErrorHandlerFn, HandleToolErrors, DEFAULT_TOOL_ERROR_TEMPLATE};
pub use calculator::{
    build_calculator_graph, calculator_tools, CalculatorRunner, CALCULATOR_SYSTEM_PROMPT,
    DEFAULT_INSTRUCTION,
};
pub use drafter::{
    build_drafter_graph, drafter_system_prompt, drafter_tools, DrafterAgentNode, DrafterRunner,
    DRAFTER_GREETING,
};
pub use input::{ScriptedInput, StdinInput, UserInput};
pub use options::AgentOptions;
pub use think_node::{SystemPrompt, ThinkNode};

use crate::graph::{ConditionalRouterFn, END};
use crate::message::Message;
use crate::state::ConversationState;

/// Node id of the model step.
pub const AGENT_NODE: &str = "agent";
/// Node id of the tool step.
pub const TOOLS_NODE: &str = "tools";

/// Next loop state picked by a router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Agent,
    Tools,
    End,
}

impl Route {
    /// Node id (or `END`) this route resolves to.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agent => AGENT_NODE,
            Self::Tools => TOOLS_NODE,
            Self::End => END,
        }
    }
}

/// How the drafter decides that the document was saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionSignal {
    /// A tool result in the latest batch has `terminal` set.
    #[default]
    Flag,
    /// A tool result in the latest batch mentions both "saved" and "document".
    Text,
}

/// Arithmetic router.
///
/// Last message is an assistant turn with tool calls → `Tools`; without → `End`.
/// Any other shape (empty history, trailing user or tool message) → `Agent`.
pub fn tools_condition<S: ConversationState>(state: &S) -> Route {
    match state.messages().last() {
        Some(Message::Assistant { tool_calls, .. }) if tool_calls.is_empty() => Route::End,
        Some(Message::Assistant { .. }) => Route::Tools,
        _ => Route::Agent,
    }
}

/// Drafter router, evaluated after the tools step: `End` once the latest tool batch
/// carries the completion signal, `Agent` otherwise.
pub fn document_saved_condition<S: ConversationState>(state: &S, signal: CompletionSignal) -> Route {
    let saved = state.latest_tool_batch().into_iter().any(|r| match signal {
        CompletionSignal::Flag => r.terminal && !r.is_error(),
        CompletionSignal::Text => {
            let text = r.content.to_lowercase();
            text.contains("saved") && text.contains("document")
        }
    });
    if saved {
        Route::End
    } else {
        Route::Agent
    }
}

/// Wraps a router as a graph `ConditionalRouterFn`.
pub(crate) fn router_fn<S, F>(route: F) -> ConditionalRouterFn<S>
where
    S: ConversationState,
    F: Fn(&S) -> Route + Send + Sync + 'static,
{
    Arc::new(move |state: &S| route(state).as_str().to_string())
}

/// Path map covering every route key.
pub(crate) fn route_path_map() -> HashMap<String, String> {
    [Route::Agent, Route::Tools, Route::End]
        .iter()
        .map(|r| (r.as_str().to_string(), r.as_str().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CalculatorState, DrafterState, ToolCall, ToolResult};

    fn call(name: &str) -> ToolCall {
        ToolCall {
            name: name.into(),
            arguments: "{}".into(),
            id: Some(format!("id-{}", name)),
        }
    }

    #[test]
    fn tools_condition_routes_on_last_assistant() {
        let mut state = CalculatorState::with_instruction("add 1 and 2");
        assert_eq!(tools_condition(&state), Route::Agent);

        state.push_message(Message::assistant_with_tool_calls("", vec![call("add")]));
        assert_eq!(tools_condition(&state), Route::Tools);
        assert_eq!(tools_condition(&state).as_str(), "tools");

        state.push_message(Message::tool(ToolResult::success(&call("add"), "3")));
        assert_eq!(tools_condition(&state), Route::Agent);

        state.push_message(Message::assistant("3"));
        assert_eq!(tools_condition(&state), Route::End);
        assert_eq!(tools_condition(&state).as_str(), END);
        // same state, same answer
        assert_eq!(tools_condition(&state), Route::End);
    }

    #[test]
    fn empty_history_continues() {
        let state = DrafterState::default();
        assert_eq!(tools_condition(&state), Route::Agent);
        assert_eq!(
            document_saved_condition(&state, CompletionSignal::Flag),
            Route::Agent
        );
        assert_eq!(
            document_saved_condition(&state, CompletionSignal::Text),
            Route::Agent
        );
    }

    /// **Scenario**: text mode needs both words, in any case, in the latest batch.
    #[test]
    fn text_signal_needs_saved_and_document() {
        let save = call("save_document");
        let mut state = DrafterState::default();
        state.push_message(Message::assistant_with_tool_calls("", vec![save.clone()]));
        state.push_message(Message::tool(ToolResult::success(&save, "File SAVED.")));
        assert_eq!(
            document_saved_condition(&state, CompletionSignal::Text),
            Route::Agent
        );

        state.push_message(Message::assistant_with_tool_calls("", vec![save.clone()]));
        state.push_message(Message::tool(ToolResult::success(
            &save,
            "Document has been SAVED successfully to a.txt.",
        )));
        assert_eq!(
            document_saved_condition(&state, CompletionSignal::Text),
            Route::End
        );
    }

    #[test]
    fn text_signal_ignores_older_batches() {
        let save = call("save_document");
        let update = call("update_document");
        let mut state = DrafterState::default();
        state.push_message(Message::assistant_with_tool_calls("", vec![save.clone()]));
        state.push_message(Message::tool(ToolResult::success(
            &save,
            "Document has been saved successfully to a.txt.",
        )));
        state.push_message(Message::assistant_with_tool_calls("", vec![update.clone()]));
        state.push_message(Message::tool(ToolResult::success(&update, "ok")));
        assert_eq!(
            document_saved_condition(&state, CompletionSignal::Text),
            Route::Agent
        );
    }

    /// **Scenario**: flag mode ignores wording and only trusts successful terminal results.
    #[test]
    fn flag_signal_uses_terminal() {
        let save = call("save_document");
        let mut state = DrafterState::default();
        state.push_message(Message::assistant_with_tool_calls("", vec![save.clone()]));
        state.push_message(Message::tool(ToolResult::success(
            &save,
            "Document has been saved successfully to a.txt.",
        )));
        assert_eq!(
            document_saved_condition(&state, CompletionSignal::Flag),
            Route::Agent
        );

        state.push_message(Message::assistant_with_tool_calls("", vec![save.clone()]));
        state.push_message(Message::tool(
            ToolResult::success(&save, "done").with_terminal(true),
        ));
        assert_eq!(
            document_saved_condition(&state, CompletionSignal::Flag),
            Route::End
        );
    }

    #[test]
    fn path_map_covers_all_routes() {
        let map = route_path_map();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(END).map(String::as_str), Some(END));
        let router = router_fn(|s: &CalculatorState| tools_condition(s));
        assert_eq!(router(&CalculatorState::default()), "agent");
    }
}
