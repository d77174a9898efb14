//! Run context passed into nodes: run config, stream sender, cancellation.

use std::collections::HashSet;
use std::fmt::Debug;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::stream::{StreamEvent, StreamMode};

/// Steps a run may take before it fails with `AgentError::RecursionLimit`.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

/// Per-run configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Maximum number of node executions in one run.
    pub recursion_limit: usize,
    /// Identifier attached to run logs.
    pub run_id: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            run_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

impl RunConfig {
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }
}

/// Run context passed into nodes.
///
/// Holds the run config, an optional stream sender with the enabled modes, and the
/// run's cancellation token. Cancelling the token stops the run between steps and
/// aborts the node currently running.
#[derive(Clone)]
pub struct RunContext<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    pub config: RunConfig,
    pub stream_tx: Option<mpsc::Sender<StreamEvent<S>>>,
    pub stream_mode: HashSet<StreamMode>,
    pub cancel: CancellationToken,
}

impl<S> RunContext<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            stream_tx: None,
            stream_mode: HashSet::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Enables streaming of the given modes into `tx`.
    pub fn with_stream(
        mut self,
        tx: mpsc::Sender<StreamEvent<S>>,
        modes: impl IntoIterator<Item = StreamMode>,
    ) -> Self {
        self.stream_tx = Some(tx);
        self.stream_mode = modes.into_iter().collect();
        self
    }

    /// Uses an externally owned token (e.g. one cancelled from a Ctrl-C handler).
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn is_streaming_mode(&self, mode: StreamMode) -> bool {
        self.stream_mode.contains(&mode)
    }

    /// Sends `event` when a sender is set. A dropped receiver is ignored.
    pub(crate) async fn emit(&self, event: StreamEvent<S>) {
        if let Some(tx) = &self.stream_tx {
            let _ = tx.send(event).await;
        }
    }
}
