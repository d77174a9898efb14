//! Streaming types for graph runs.
//!
//! A run started with `CompiledStateGraph::invoke_with_context` (or `stream`) sends
//! [`StreamEvent`]s through `RunContext::stream_tx` for every mode enabled in
//! `RunContext::stream_mode`. The CLI uses `Values` to print intermediate states.

use std::fmt::Debug;

/// Stream mode selector: which kinds of events to emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamMode {
    /// Emit full state after each node completes.
    Values,
    /// Emit node id plus state after each node completes.
    Updates,
    /// Emit task start/end events around each node execution.
    Tasks,
}

/// One event emitted during a streamed run.
#[derive(Clone, Debug)]
pub enum StreamEvent<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Full state after a node completed.
    Values(S),
    /// State after the named node completed.
    Updates { node_id: String, state: S },
    /// A node is about to run.
    TaskStart { node_id: String },
    /// A node finished; `Err` carries the error text.
    TaskEnd {
        node_id: String,
        result: Result<(), String>,
    },
}

impl<S> StreamEvent<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Node id for node-scoped events; `None` for `Values`.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            StreamEvent::Values(_) => None,
            StreamEvent::Updates { node_id, .. }
            | StreamEvent::TaskStart { node_id }
            | StreamEvent::TaskEnd { node_id, .. } => Some(node_id),
        }
    }
}
