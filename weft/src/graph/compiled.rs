//! Compiled state graph: immutable, runs via invoke.
//!
//! Built by `StateGraph::compile`. Each step runs one node (raced against the run's
//! cancellation token), applies its output, emits stream events and resolves the next
//! node from the conditional router, the unconditional edge, or the node's `Next`.
//! Runs stop at END, on the first node error, on cancellation, or when the recursion
//! limit is hit.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use tracing::Instrument;

use crate::error::AgentError;
use crate::stream::{StreamEvent, StreamMode};

use super::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_node_state, log_routing,
};
use super::node_middleware::{NodeFuture, NodeMiddleware};
use super::run_context::RunConfig;
use super::state_graph::END;
use super::{Next, NextEntry, Node, RunContext};

/// Compiled graph: immutable structure produced by `StateGraph::compile()`.
#[derive(Clone)]
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// Node reached from START.
    pub(super) first_node_id: String,
    /// Linear order of nodes; only the first entry is meaningful when the graph has conditional edges.
    pub(super) edge_order: Vec<String>,
    pub(super) next_map: HashMap<String, NextEntry<S>>,
    pub(super) middleware: Option<Arc<dyn NodeMiddleware<S>>>,
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    async fn execute_node(
        &self,
        node: Arc<dyn Node<S>>,
        state: S,
        run_ctx: &RunContext<S>,
    ) -> Result<(S, Next), AgentError> {
        match &self.middleware {
            Some(middleware) => {
                let node_id = node.id().to_string();
                let ctx = run_ctx.clone();
                middleware
                    .around_run(
                        &node_id,
                        state,
                        Box::new(move |s: S| -> NodeFuture<S> {
                            Box::pin(async move { node.run_with_context(s, &ctx).await })
                        }),
                    )
                    .await
            }
            None => node.run_with_context(state, run_ctx).await,
        }
    }

    fn resolve_next(&self, current_id: &str, state: &S, next: Next) -> Option<String> {
        if let Some(NextEntry::Conditional(router)) = self.next_map.get(current_id) {
            return Some(router.resolve_next(state));
        }
        match next {
            Next::End => None,
            Next::Node(id) => Some(id),
            Next::Continue => match self.next_map.get(current_id) {
                Some(NextEntry::Unconditional(id)) => Some(id.clone()),
                _ => {
                    let pos = self.edge_order.iter().position(|x| x == current_id)?;
                    self.edge_order.get(pos + 1).cloned()
                }
            },
        }
    }

    /// Steps through nodes until END. Returns the number of node executions.
    ///
    /// `state` only ever holds outputs of nodes that completed successfully.
    async fn run_loop_inner(
        &self,
        state: &mut S,
        current_id: &mut String,
        run_ctx: &RunContext<S>,
    ) -> Result<usize, AgentError> {
        let limit = run_ctx.config.recursion_limit;
        let tasks = run_ctx.is_streaming_mode(StreamMode::Tasks);
        let mut steps = 0usize;

        loop {
            if run_ctx.cancel.is_cancelled() {
                return Err(AgentError::Cancelled);
            }
            if steps >= limit {
                return Err(AgentError::RecursionLimit(limit));
            }
            let node = self.nodes.get(current_id.as_str()).cloned().ok_or_else(|| {
                AgentError::ExecutionFailed(format!("node not found: {}", current_id))
            })?;

            log_node_start(current_id, steps);
            log_node_state(current_id, &*state);
            if tasks {
                run_ctx
                    .emit(StreamEvent::TaskStart {
                        node_id: current_id.clone(),
                    })
                    .await;
            }

            let result = tokio::select! {
                biased;
                _ = run_ctx.cancel.cancelled() => Err(AgentError::Cancelled),
                r = self
                    .execute_node(node, state.clone(), run_ctx)
                    .instrument(tracing::debug_span!("node", id = %current_id)) => r,
            };
            steps += 1;

            let (new_state, next) = match result {
                Ok(output) => output,
                Err(e) => {
                    if tasks {
                        run_ctx
                            .emit(StreamEvent::TaskEnd {
                                node_id: current_id.clone(),
                                result: Err(e.to_string()),
                            })
                            .await;
                    }
                    return Err(e);
                }
            };
            if tasks {
                run_ctx
                    .emit(StreamEvent::TaskEnd {
                        node_id: current_id.clone(),
                        result: Ok(()),
                    })
                    .await;
            }
            log_node_complete(current_id, &next);

            *state = new_state;

            if run_ctx.is_streaming_mode(StreamMode::Values) {
                run_ctx.emit(StreamEvent::Values(state.clone())).await;
            }
            if run_ctx.is_streaming_mode(StreamMode::Updates) {
                run_ctx
                    .emit(StreamEvent::Updates {
                        node_id: current_id.clone(),
                        state: state.clone(),
                    })
                    .await;
            }

            match self.resolve_next(current_id, state, next) {
                Some(id) if id != END => {
                    log_routing(current_id, &id);
                    *current_id = id;
                }
                _ => {
                    log_routing(current_id, END);
                    return Ok(steps);
                }
            }
        }
    }

    /// Runs the graph from its first node with a fresh context built from `config`
    /// (default: recursion limit 25, new run id, no streaming).
    pub async fn invoke(&self, state: S, config: Option<RunConfig>) -> Result<S, AgentError> {
        self.invoke_with_context(state, RunContext::new(config.unwrap_or_default()))
            .await
    }

    /// Runs the graph with a caller-built context (stream sender, cancellation token).
    pub async fn invoke_with_context(
        &self,
        state: S,
        run_ctx: RunContext<S>,
    ) -> Result<S, AgentError> {
        if !self.nodes.contains_key(&self.first_node_id) {
            return Err(AgentError::ExecutionFailed("empty graph".into()));
        }
        let run_id = run_ctx.config.run_id.clone();
        log_graph_start(&run_id);
        let mut state = state;
        let mut current_id = self.first_node_id.clone();
        match self
            .run_loop_inner(&mut state, &mut current_id, &run_ctx)
            .instrument(tracing::info_span!("graph", run_id = %run_id))
            .await
        {
            Ok(steps) => {
                log_graph_complete(&run_id, steps);
                Ok(state)
            }
            Err(e) => {
                log_graph_error(&run_id, &e);
                Err(e)
            }
        }
    }
}
