//! Logging middleware that records node enter/exit around each node run.
//!
//! Installed by the CLI when `--verbose` is passed.

use async_trait::async_trait;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::time::Instant;

use crate::error::AgentError;
use crate::graph::Next;

use super::node_middleware::{NodeInner, NodeMiddleware};

/// Middleware that logs node enter/exit (with elapsed time) via `tracing`.
pub struct LoggingNodeMiddleware<S> {
    _phantom: PhantomData<S>,
}

impl<S> Default for LoggingNodeMiddleware<S> {
    fn default() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

#[async_trait]
impl<S> NodeMiddleware<S> for LoggingNodeMiddleware<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    async fn around_run(
        &self,
        node_id: &str,
        state: S,
        inner: NodeInner<S>,
    ) -> Result<(S, Next), AgentError> {
        tracing::info!(node = node_id, "enter node");
        let started = Instant::now();
        let result = inner(state).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok((_, next)) => tracing::info!(node = node_id, ?next, elapsed_ms, "exit node"),
            Err(e) => tracing::warn!(node = node_id, error = %e, elapsed_ms, "node failed"),
        }
        result
    }
}
