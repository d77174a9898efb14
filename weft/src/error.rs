//! Agent execution error types.
//!
//! Returned by graph nodes and by `CompiledStateGraph::invoke`. Tool failures are
//! not represented here: Tool Dispatch turns them into error tool messages so the
//! model can react (see `ActNode`).

use thiserror::Error;

/// Agent execution error.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Execution failed with a message (e.g. invalid graph, request build failure).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The completion service failed (transport, HTTP status, timeout, empty choices).
    ///
    /// `ThinkNode` retries this variant according to its `RetryPolicy`; once retries
    /// are exhausted the run stops with this error.
    #[error("model invocation failed: {0}")]
    ModelInvocationFailed(String),

    /// The run was cancelled through its `CancellationToken`.
    #[error("run cancelled")]
    Cancelled,

    /// The run took more steps than `RunConfig::recursion_limit` allows.
    #[error("recursion limit of {0} steps reached without hitting END")]
    RecursionLimit(usize),

    /// Interactive input ended (EOF) while the agent was waiting for the user.
    #[error("input closed before the conversation finished")]
    InputClosed,
}

impl AgentError {
    /// True when retrying the same step may succeed (only model invocation failures).
    pub fn is_retryable(&self) -> bool {
        matches!(self, AgentError::ModelInvocationFailed(_))
    }
}
