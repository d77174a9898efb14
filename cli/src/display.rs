//! Console output for the two agents.
//!
//! The calculator prints every intermediate state's newest message as a titled block.
//! The drafter prints through [`DrafterConsole`], a node middleware, so lines appear
//! right after the node that produced them and before the next stdin read.

use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use weft::agent::{AGENT_NODE, TOOLS_NODE};
use weft::tools::SAVED_PREFIX;
use weft::{AgentError, DrafterState, Message, Next, NodeInner, NodeMiddleware, ToolStatus};

/// Width of the calculator's message header rule.
const RULE_WIDTH: usize = 80;

/// Longest argument string shown for a tool call.
const MAX_ARGS_DISPLAY: usize = 200;

/// Truncates to at most `max` chars, ending in "..." when cut. UTF-8 safe.
pub fn truncate_display(s: &str, max: usize) -> String {
    const SUFFIX: &str = "...";
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= SUFFIX.len() {
        return s.chars().take(max).collect();
    }
    let kept: String = s.chars().take(max - SUFFIX.len()).collect();
    format!("{}{}", kept, SUFFIX)
}

fn header(title: &str) -> String {
    let title = format!(" {} ", title);
    let side = RULE_WIDTH.saturating_sub(title.len());
    let left = side / 2;
    format!("{}{}{}", "=".repeat(left), title, "=".repeat(side - left))
}

/// One message as a titled block: a centered header line, then the content, then any
/// tool calls with their ids and arguments.
pub fn format_message_block(message: &Message) -> String {
    let title = match message {
        Message::System(_) => "System Message",
        Message::User(_) => "Human Message",
        Message::Assistant { .. } => "Ai Message",
        Message::Tool(_) => "Tool Message",
    };
    let mut lines = vec![header(title)];
    if let Message::Tool(result) = message {
        if let Some(name) = &result.name {
            lines.push(format!("Name: {}", name));
        }
    }
    if !message.content().is_empty() {
        lines.push(String::new());
        lines.push(message.content().to_string());
    }
    let calls = message.tool_calls();
    if !calls.is_empty() {
        lines.push("Tool Calls:".to_string());
        for call in calls {
            lines.push(format!(
                "  {} ({})",
                call.name,
                call.id.as_deref().unwrap_or("-")
            ));
            lines.push(format!(
                "    Args: {}",
                truncate_display(&call.arguments, MAX_ARGS_DISPLAY)
            ));
        }
    }
    lines.join("\n")
}

/// Lines printed after the drafter's `agent` node appended `added`.
///
/// The greeting on the opening turn was not typed by the user, so it is not echoed.
pub fn agent_turn_lines(added: &[Message], opening_turn: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for message in added {
        match message {
            Message::User(text) if !opening_turn => lines.push(format!("\n USER: {}", text)),
            Message::Assistant {
                content,
                tool_calls,
            } => {
                lines.push(format!("\n AI: {}", content));
                if !tool_calls.is_empty() {
                    let names: Vec<String> =
                        tool_calls.iter().map(|c| format!("'{}'", c.name)).collect();
                    lines.push(format!(" USING TOOLS: [{}]", names.join(", ")));
                }
            }
            _ => {}
        }
    }
    lines
}

/// Lines printed after the drafter's `tools` node appended `added`.
///
/// A successful save announces the file before its result line.
pub fn tool_result_lines(added: &[Message]) -> Vec<String> {
    let mut lines = Vec::new();
    for message in added {
        let Message::Tool(result) = message else {
            continue;
        };
        if result.terminal && result.status == ToolStatus::Success {
            if let Some(file) = result.content.strip_prefix(SAVED_PREFIX) {
                let file = file.trim_end_matches('.');
                lines.push(format!("\n Document has been saved to {}", file));
            }
        }
        lines.push(format!("\n  TOOL RESULT: {}", result.content));
    }
    lines
}

/// Prints each drafter step to a writer (stdout by default), optionally wrapping
/// another middleware such as `LoggingNodeMiddleware`.
pub struct DrafterConsole {
    out: Mutex<Box<dyn Write + Send>>,
    inner: Option<Arc<dyn NodeMiddleware<DrafterState>>>,
}

impl DrafterConsole {
    pub fn stdout() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            inner: None,
        }
    }

    /// Runs `inner` around every node, inside the printing.
    pub fn wrapping(mut self, inner: Arc<dyn NodeMiddleware<DrafterState>>) -> Self {
        self.inner = Some(inner);
        self
    }

    fn print(&self, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        if let Ok(mut out) = self.out.lock() {
            for line in lines {
                if let Err(e) = writeln!(out, "{}", line) {
                    tracing::warn!(error = %e, "console write failed");
                    return;
                }
            }
            let _ = out.flush();
        }
    }
}

#[async_trait]
impl NodeMiddleware<DrafterState> for DrafterConsole {
    async fn around_run(
        &self,
        node_id: &str,
        state: DrafterState,
        inner: NodeInner<DrafterState>,
    ) -> Result<(DrafterState, Next), AgentError> {
        let before = state.messages.len();
        let result = match &self.inner {
            Some(mw) => mw.around_run(node_id, state, inner).await,
            None => inner(state).await,
        };
        if let Ok((after, _)) = &result {
            let added = after.messages.get(before..).unwrap_or_default();
            let lines = match node_id {
                AGENT_NODE => agent_turn_lines(added, before == 0),
                TOOLS_NODE => tool_result_lines(added),
                _ => Vec::new(),
            };
            self.print(&lines);
        }
        result
    }
}
