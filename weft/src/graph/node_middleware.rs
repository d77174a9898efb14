//! Node middleware: wrap node.run with external async logic (around pattern).
//!
//! Set via `StateGraph::with_middleware` before `compile()`.

use async_trait::async_trait;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

use crate::error::AgentError;

use super::Next;

/// Boxed future returned by the wrapped node call.
pub type NodeFuture<S> = Pin<Box<dyn Future<Output = Result<(S, Next), AgentError>> + Send>>;

/// The wrapped node call handed to [`NodeMiddleware::around_run`].
pub type NodeInner<S> = Box<dyn FnOnce(S) -> NodeFuture<S> + Send>;

/// Async middleware that wraps each node run.
#[async_trait]
pub trait NodeMiddleware<S>: Send + Sync
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Wraps node.run. `inner` must be called to execute the node.
    async fn around_run(
        &self,
        node_id: &str,
        state: S,
        inner: NodeInner<S>,
    ) -> Result<(S, Next), AgentError>;
}
