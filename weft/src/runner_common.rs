//! Shared run-with-events loop used by the calculator and drafter runners.
//!
//! Unlike [`CompiledStateGraph::stream`], the run is driven on the caller's task and
//! its error is returned, so a failed run is never mistaken for a finished one.

use std::collections::HashSet;
use std::fmt::Debug;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::AgentError;
use crate::graph::{CompiledStateGraph, RunConfig, RunContext};
use crate::stream::{StreamEvent, StreamMode};

const EVENT_BUFFER: usize = 128;

/// Runs `compiled` from `state`, calling `on_event` for every event of the enabled
/// `modes` while the graph runs. Returns the final state or the run's error.
pub async fn run_with_events<S, F>(
    compiled: &CompiledStateGraph<S>,
    state: S,
    config: RunConfig,
    cancel: CancellationToken,
    modes: impl IntoIterator<Item = StreamMode>,
    mut on_event: F,
) -> Result<S, AgentError>
where
    S: Clone + Send + Sync + Debug + 'static,
    F: FnMut(StreamEvent<S>),
{
    let modes: HashSet<StreamMode> = modes.into_iter().collect();
    if modes.is_empty() {
        let ctx = RunContext::new(config).with_cancellation(cancel);
        return compiled.invoke_with_context(state, ctx).await;
    }

    let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
    let ctx = RunContext::new(config)
        .with_cancellation(cancel)
        .with_stream(tx, modes);
    let run = compiled.invoke_with_context(state, ctx);
    let consume = async {
        while let Some(event) = rx.recv().await {
            on_event(event);
        }
    };
    // the sender lives in the run's context, so the consumer ends with the run
    let (result, ()) = tokio::join!(run, consume);
    result
}
