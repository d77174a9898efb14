//! Think node: prepend the system prompt, call the model, append one assistant message.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node, RetryPolicy};
use crate::llm::{invoke_with_retry, LlmClient};
use crate::message::Message;
use crate::state::{ConversationState, ToolCall};

use super::AGENT_NODE;

/// Builds the system prompt from the current state. Called once per model call, so
/// prompts that embed state (the drafter's document) are always current.
pub type SystemPrompt<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// Model-invocation node.
///
/// The system message is synthesized per call and never stored in history. Tool
/// calls without an id get a fresh one so every tool message can link back.
pub struct ThinkNode<S> {
    id: String,
    llm: Arc<dyn LlmClient>,
    system_prompt: SystemPrompt<S>,
    retry: RetryPolicy,
}

impl<S: ConversationState> ThinkNode<S> {
    pub fn new(llm: Arc<dyn LlmClient>, system_prompt: SystemPrompt<S>) -> Self {
        Self {
            id: AGENT_NODE.to_string(),
            llm,
            system_prompt,
            retry: RetryPolicy::None,
        }
    }

    /// Fixed system prompt.
    pub fn with_static_prompt(llm: Arc<dyn LlmClient>, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        Self::new(llm, Arc::new(move |_: &S| prompt.clone()))
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Messages sent to the model: system prompt first, then the stored history.
    pub fn request_messages(&self, state: &S) -> Vec<Message> {
        let history = state.messages();
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system((self.system_prompt)(state)));
        messages.extend_from_slice(history);
        messages
    }

    /// One model turn: call the model and append its reply to `state`.
    pub async fn think(&self, mut state: S) -> Result<S, AgentError> {
        let messages = self.request_messages(&state);
        let response = invoke_with_retry(self.llm.as_ref(), &messages, &self.retry).await?;
        let tool_calls: Vec<ToolCall> = response
            .tool_calls
            .into_iter()
            .map(|mut call| {
                if call.id.as_deref().map_or(true, str::is_empty) {
                    call.id = Some(format!("call_{}", uuid::Uuid::new_v4().simple()));
                }
                call
            })
            .collect();
        tracing::debug!(
            node = %self.id,
            content_len = response.content.len(),
            tool_calls = tool_calls.len(),
            "model replied"
        );
        if let Some(usage) = &response.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "token usage"
            );
        }
        state.push_message(Message::assistant_with_tool_calls(
            response.content,
            tool_calls,
        ));
        Ok(state)
    }
}

#[async_trait]
impl<S: ConversationState> Node<S> for ThinkNode<S> {
    fn id(&self) -> &str {
        &self.id
    }

    async fn run(&self, state: S) -> Result<(S, Next), AgentError> {
        let state = self.think(state).await?;
        Ok((state, Next::Continue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmResponse, MockLlm};
    use crate::state::{CalculatorState, DrafterState};

    /// **Scenario**: system prompt goes first and is not stored; reply is appended.
    #[tokio::test]
    async fn think_prepends_prompt_and_appends_reply() {
        let mock = Arc::new(MockLlm::with_no_tool_calls("hello"));
        let node = ThinkNode::with_static_prompt(mock.clone(), "be nice");
        let state = CalculatorState::with_instruction("hi");

        let (out, next) = node.run(state).await.unwrap();
        assert_eq!(next, Next::Continue);
        assert_eq!(out.messages.len(), 2);
        assert_eq!(out.messages[1], Message::assistant("hello"));
        assert!(!out.messages.iter().any(|m| matches!(m, Message::System(_))));

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0][0], Message::system("be nice"));
        assert_eq!(requests[0][1], Message::user("hi"));
    }

    #[tokio::test]
    async fn prompt_reads_current_state() {
        let mock = Arc::new(MockLlm::with_no_tool_calls("ok"));
        let node: ThinkNode<DrafterState> = ThinkNode::new(
            mock.clone(),
            Arc::new(|s: &DrafterState| format!("doc={}", s.document)),
        );
        let state = DrafterState {
            messages: vec![Message::user("x")],
            document: "draft".into(),
        };
        node.run(state).await.unwrap();
        assert_eq!(mock.requests()[0][0], Message::system("doc=draft"));
    }

    #[tokio::test]
    async fn missing_call_ids_are_filled() {
        let mock = Arc::new(MockLlm::scripted(vec![LlmResponse::tools(vec![
            ToolCall {
                name: "add".into(),
                arguments: r#"{"a":1,"b":2}"#.into(),
                id: None,
            },
            ToolCall {
                name: "add".into(),
                arguments: r#"{"a":3,"b":4}"#.into(),
                id: Some("keep".into()),
            },
        ])]));
        let node = ThinkNode::with_static_prompt(mock, "p");
        let (out, _) = node
            .run(CalculatorState::with_instruction("go"))
            .await
            .unwrap();
        let calls = out.messages[1].tool_calls();
        assert!(calls[0].id.as_deref().is_some_and(|id| id.starts_with("call_")));
        assert_eq!(calls[1].id.as_deref(), Some("keep"));
    }

    #[tokio::test]
    async fn retries_model_failures_per_policy() {
        let mock = Arc::new(MockLlm::with_no_tool_calls("ok").failing_first(2));
        let node = ThinkNode::with_static_prompt(mock.clone(), "p")
            .with_retry(RetryPolicy::fixed(3, std::time::Duration::ZERO));
        node.run(CalculatorState::with_instruction("go"))
            .await
            .unwrap();
        assert_eq!(mock.call_count(), 3);

        let mock = Arc::new(MockLlm::with_no_tool_calls("ok").failing_first(1));
        let node = ThinkNode::with_static_prompt(mock, "p");
        let err = node
            .run(CalculatorState::with_instruction("go"))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ModelInvocationFailed(_)));
    }
}
