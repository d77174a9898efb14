//! Shared pieces of the `weft-calculator` and `weft-drafter` binaries: settings and
//! client setup, Ctrl-C handling, logging and console display.

pub mod display;
mod error;
mod log_format;
pub mod logging;

use std::sync::Arc;

use config::ModelSettings;
use tokio_util::sync::CancellationToken;
use weft::{
    AgentOptions, ChatOpenAI, ConversationState, LoggingNodeMiddleware, RetryPolicy, ToolSource,
};

pub use error::RunError;

/// App name for `$XDG_CONFIG_HOME/<app>/config.toml`.
pub const APP_NAME: &str = "weft";

/// Fills the environment from `.env` and the XDG config (existing variables win).
///
/// Runs before logging is set up so `RUST_LOG` and `LOG_FILE` may come from `.env`.
pub fn load_env() -> Result<(), RunError> {
    config::load_and_apply(APP_NAME, None)?;
    Ok(())
}

/// Model settings from the environment. Fails before any request when no API key is set.
pub fn model_settings() -> Result<ModelSettings, RunError> {
    let settings = ModelSettings::from_env()?;
    tracing::debug!(?settings, "model settings");
    Ok(settings)
}

/// Chat client for `settings`, bound to the tools in `tools`.
pub async fn chat_client(
    settings: &ModelSettings,
    tools: &dyn ToolSource,
) -> Result<Arc<ChatOpenAI>, RunError> {
    Ok(Arc::new(ChatOpenAI::from_settings(settings, tools).await?))
}

/// Agent options shared by both binaries: model retries from settings, node
/// enter/exit logging when `verbose`.
pub fn agent_options<S: ConversationState>(
    settings: &ModelSettings,
    verbose: bool,
) -> AgentOptions<S> {
    let options =
        AgentOptions::default().with_retry(RetryPolicy::for_model_calls(settings.max_retries));
    if verbose {
        options.with_middleware(Arc::new(LoggingNodeMiddleware::<S>::default()))
    } else {
        options
    }
}

/// Token cancelled on the first Ctrl-C.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, cancelling run");
            token.cancel();
        }
    });
    cancel
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft::CalculatorState;

    fn settings(max_retries: usize) -> ModelSettings {
        ModelSettings::from_lookup(|key| match key {
            "GOOGLE_API_KEY" => Some("k".to_string()),
            "WEFT_MAX_RETRIES" => Some(max_retries.to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn options_follow_settings_and_verbosity() {
        let quiet: AgentOptions<CalculatorState> = agent_options(&settings(5), false);
        assert_eq!(quiet.retry.max_attempts(), 5);
        assert!(quiet.middleware.is_none());

        let verbose: AgentOptions<CalculatorState> = agent_options(&settings(0), true);
        assert_eq!(verbose.retry, RetryPolicy::None);
        assert!(verbose.middleware.is_some());
    }

    #[tokio::test]
    async fn client_uses_configured_model() {
        let tools = weft::calculator_tools().unwrap();
        let client = chat_client(&settings(3), &tools).await.unwrap();
        assert_eq!(client.model(), config::DEFAULT_MODEL);
    }
}
