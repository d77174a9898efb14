//! Context passed into tool calls for the current step.
//!
//! ActNode builds one per tool call from the run state, so tools that need the
//! current document read it here instead of from globals.

/// Per-call context available to tools during execution.
///
/// - `document`: current document content for states that carry one (drafter);
///   reflects updates made by earlier calls in the same batch.
/// - `run_id`: id of the current run, for logs.
#[derive(Debug, Clone, Default)]
pub struct ToolCallContext {
    pub document: Option<String>,
    pub run_id: Option<String>,
}

impl ToolCallContext {
    pub fn with_document(mut self, document: Option<String>) -> Self {
        self.document = document;
        self
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }
}
