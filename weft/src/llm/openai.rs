//! OpenAI-compatible Chat Completions client implementing `LlmClient`.
//!
//! Works against any endpoint speaking the Chat Completions wire format; the
//! default settings point at Gemini's OpenAI-compatible endpoint. Tools are sent as
//! function tools; assistant tool calls and tool results in the history are
//! converted so multi-turn tool use round-trips.
//!
//! **Interaction**: Implements `LlmClient`; used by ThinkNode like `MockLlm`.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, trace};

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse, LlmUsage};
use crate::message::Message;
use crate::state::{ToolCall, ToolResult};
use crate::tool_source::{ToolSource, ToolSourceError, ToolSpec};

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionMessageToolCalls, ChatCompletionRequestAssistantMessageArgs,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessage,
        ChatCompletionTool, ChatCompletionToolChoiceOption, ChatCompletionTools,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, FunctionObject,
        ToolChoiceOptions,
    },
    Client,
};

use env_config::ModelSettings;

use super::ToolChoiceMode;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Chat Completions client with tool calling.
pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    tools: Option<Vec<ToolSpec>>,
    temperature: Option<f32>,
    tool_choice: Option<ToolChoiceMode>,
    timeout: Duration,
}

impl ChatOpenAI {
    /// Client with default config (API key from `OPENAI_API_KEY`).
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_client(Client::new(), model)
    }

    /// Client with custom config (API key, base URL).
    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self::with_client(Client::with_config(config), model)
    }

    fn with_client(client: Client<OpenAIConfig>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            tools: None,
            temperature: None,
            tool_choice: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Client bound to every tool listed by `tool_source`.
    ///
    /// Use the same source for ActNode so the model and dispatch see the same tools.
    pub async fn new_with_tool_source(
        config: OpenAIConfig,
        model: impl Into<String>,
        tool_source: &dyn ToolSource,
    ) -> Result<Self, ToolSourceError> {
        let tools = tool_source.list_tools().await?;
        Ok(Self::with_config(config, model).with_tools(tools))
    }

    /// Client for the endpoint, model, temperature, timeout and tool choice in
    /// `settings`, bound to `tool_source`'s tools.
    pub async fn from_settings(
        settings: &ModelSettings,
        tool_source: &dyn ToolSource,
    ) -> Result<Self, ToolSourceError> {
        let config = OpenAIConfig::new()
            .with_api_key(settings.api_key.clone())
            .with_api_base(settings.api_base.clone());
        let mut client = Self::new_with_tool_source(config, settings.model.clone(), tool_source)
            .await?
            .with_temperature(settings.temperature)
            .with_timeout(settings.timeout);
        if let Some(mode) = settings.tool_choice.as_deref() {
            client = client.with_tool_choice(mode.parse().map_err(ToolSourceError::InvalidInput)?);
        }
        debug!(model = %settings.model, api_base = %settings.api_base, "chat client configured");
        Ok(client)
    }

    /// Set tools for this completion (enables tool_calls in response).
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Set temperature (0–2). 0 is the most deterministic.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Override the provider's default tool choice.
    pub fn with_tool_choice(mut self, mode: ToolChoiceMode) -> Self {
        self.tool_choice = Some(mode);
        self
    }

    /// Bound each request; an elapsed timeout is a retryable invocation failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_tool_call(call: &ToolCall) -> Result<ChatCompletionMessageToolCalls, AgentError> {
        let value = json!({
            "id": call.id.clone().unwrap_or_default(),
            "type": "function",
            "function": { "name": call.name, "arguments": call.arguments },
        });
        serde_json::from_value(value).map_err(|e| {
            AgentError::ExecutionFailed(format!("tool call {} not encodable: {}", call.name, e))
        })
    }

    fn assistant_message(
        content: &str,
        tool_calls: &[ToolCall],
    ) -> Result<ChatCompletionRequestMessage, AgentError> {
        let mut args = ChatCompletionRequestAssistantMessageArgs::default();
        if !content.is_empty() || tool_calls.is_empty() {
            args.content(content);
        }
        if !tool_calls.is_empty() {
            let calls = tool_calls
                .iter()
                .map(Self::request_tool_call)
                .collect::<Result<Vec<_>, _>>()?;
            args.tool_calls(calls);
        }
        let message = args.build().map_err(|e| {
            AgentError::ExecutionFailed(format!("assistant message build failed: {}", e))
        })?;
        Ok(ChatCompletionRequestMessage::Assistant(message))
    }

    fn tool_message(result: &ToolResult) -> Result<ChatCompletionRequestMessage, AgentError> {
        let message = ChatCompletionRequestToolMessageArgs::default()
            .content(result.content.as_str())
            .tool_call_id(result.call_id.clone().unwrap_or_default())
            .build()
            .map_err(|e| {
                AgentError::ExecutionFailed(format!("tool message build failed: {}", e))
            })?;
        Ok(ChatCompletionRequestMessage::Tool(message))
    }

    /// Convert our `Message` list to request messages, including tool traffic.
    fn messages_to_request(
        messages: &[Message],
    ) -> Result<Vec<ChatCompletionRequestMessage>, AgentError> {
        messages
            .iter()
            .map(|m| match m {
                Message::System(s) => Ok(ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessage::from(s.as_str()),
                )),
                Message::User(s) => Ok(ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessage::from(s.as_str()),
                )),
                Message::Assistant {
                    content,
                    tool_calls,
                } => Self::assistant_message(content, tool_calls),
                Message::Tool(result) => Self::tool_message(result),
            })
            .collect()
    }

    fn build_request(&self, messages: &[Message]) -> Result<CreateChatCompletionRequest, AgentError> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(Self::messages_to_request(messages)?);

        if let Some(tools) = self.tools.as_ref().filter(|t| !t.is_empty()) {
            let chat_tools: Vec<ChatCompletionTools> = tools
                .iter()
                .map(|t| {
                    ChatCompletionTools::Function(ChatCompletionTool {
                        function: FunctionObject {
                            name: t.name.clone(),
                            description: t.description.clone(),
                            parameters: Some(t.input_schema.clone()),
                            ..Default::default()
                        },
                    })
                })
                .collect();
            args.tools(chat_tools);
        }

        if let Some(t) = self.temperature {
            args.temperature(t);
        }

        if let Some(mode) = self.tool_choice {
            let opt = match mode {
                ToolChoiceMode::Auto => ToolChoiceOptions::Auto,
                ToolChoiceMode::None => ToolChoiceOptions::None,
                ToolChoiceMode::Required => ToolChoiceOptions::Required,
            };
            args.tool_choice(ChatCompletionToolChoiceOption::Mode(opt));
        }

        args.build()
            .map_err(|e| AgentError::ExecutionFailed(format!("request build failed: {}", e)))
    }
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        let trace_id = uuid::Uuid::new_v4().to_string();
        let request = self.build_request(messages)?;

        debug!(
            trace_id = %trace_id,
            model = %self.model,
            message_count = messages.len(),
            tools_count = self.tools.as_ref().map_or(0, |t| t.len()),
            temperature = ?self.temperature,
            tool_choice = ?self.tool_choice,
            "chat completion create"
        );
        if let Ok(js) = serde_json::to_string_pretty(&request) {
            trace!(trace_id = %trace_id, request = %js, "chat completion request body");
        }

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                AgentError::ModelInvocationFailed(format!(
                    "request timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| AgentError::ModelInvocationFailed(format!("API error: {}", e)))?;

        if let Ok(js) = serde_json::to_string_pretty(&response) {
            trace!(trace_id = %trace_id, response = %js, "chat completion response body");
        }

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            AgentError::ModelInvocationFailed("completion returned no choices".to_string())
        })?;

        let msg = choice.message;
        let content = msg.content.unwrap_or_default();
        let tool_calls: Vec<ToolCall> = msg
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter_map(|tc| match tc {
                ChatCompletionMessageToolCalls::Function(f) => Some(ToolCall {
                    name: f.function.name,
                    arguments: f.function.arguments,
                    id: Some(f.id).filter(|id| !id.is_empty()),
                }),
                _ => None,
            })
            .collect();

        let usage = response.usage.map(|u| LlmUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });
        debug!(
            trace_id = %trace_id,
            content_len = content.len(),
            tool_calls = tool_calls.len(),
            "chat completion done"
        );
        Ok(LlmResponse {
            content,
            tool_calls,
            usage,
        })
    }
}
