//! Options shared by the calculator and drafter runners.

use std::sync::Arc;

use crate::graph::{NodeMiddleware, RetryPolicy, DEFAULT_RECURSION_LIMIT};
use crate::state::ConversationState;

use super::{CompletionSignal, HandleToolErrors};

/// Knobs for building an agent graph.
///
/// `completion_signal` is only read by the drafter.
pub struct AgentOptions<S: ConversationState> {
    /// Retry policy around each model call.
    pub retry: RetryPolicy,
    /// Steps per run before `AgentError::RecursionLimit`.
    pub recursion_limit: usize,
    pub handle_tool_errors: HandleToolErrors,
    pub completion_signal: CompletionSignal,
    /// Wraps every node run (logging, console display).
    pub middleware: Option<Arc<dyn NodeMiddleware<S>>>,
}

impl<S: ConversationState> Default for AgentOptions<S> {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::None,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            handle_tool_errors: HandleToolErrors::default(),
            completion_signal: CompletionSignal::default(),
            middleware: None,
        }
    }
}

impl<S: ConversationState> AgentOptions<S> {
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn with_completion_signal(mut self, signal: CompletionSignal) -> Self {
        self.completion_signal = signal;
        self
    }

    pub fn with_handle_tool_errors(mut self, handle: HandleToolErrors) -> Self {
        self.handle_tool_errors = handle;
        self
    }

    pub fn with_middleware(mut self, middleware: Arc<dyn NodeMiddleware<S>>) -> Self {
        self.middleware = Some(middleware);
        self
    }
}
