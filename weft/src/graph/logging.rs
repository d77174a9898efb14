//! Structured logging helpers for graph execution.

use std::fmt::Debug;

use crate::error::AgentError;
use crate::graph::Next;

pub fn log_node_start(node_id: &str, step: usize) {
    tracing::debug!(node_id = node_id, step, "Starting node execution");
}

/// Logs the input state of a node (trace level: states grow with the conversation).
pub fn log_node_state<S: Debug>(node_id: &str, state: &S) {
    tracing::trace!(node_id = node_id, state = ?state, "Node execution: state");
}

pub fn log_node_complete(node_id: &str, next: &Next) {
    tracing::debug!(node_id = node_id, ?next, "Node execution complete");
}

pub fn log_routing(from: &str, to: &str) {
    tracing::debug!(from = from, to = to, "routing");
}

pub fn log_graph_start(run_id: &str) {
    tracing::info!(run_id = run_id, "Starting graph execution");
}

pub fn log_graph_complete(run_id: &str, steps: usize) {
    tracing::info!(run_id = run_id, steps, "Graph execution complete");
}

pub fn log_graph_error(run_id: &str, error: &AgentError) {
    tracing::error!(run_id = run_id, %error, "Graph execution error");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_functions() {
        log_node_start("agent", 0);
        log_node_state("agent", &());
        log_node_complete("agent", &Next::End);
        log_routing("agent", "tools");
        log_graph_start("run");
        log_graph_complete("run", 3);
        log_graph_error("run", &AgentError::ExecutionFailed("test".to_string()));
    }
}
