//! Model endpoint settings read from the environment.
//!
//! | variable | default |
//! |---|---|
//! | `GOOGLE_API_KEY` (fallback `OPENAI_API_KEY`) | required |
//! | `WEFT_MODEL` | `gemini-2.0-flash` |
//! | `WEFT_API_BASE` | Gemini's OpenAI-compatible endpoint |
//! | `WEFT_TEMPERATURE` | `0` |
//! | `WEFT_TIMEOUT_SECS` | `60` |
//! | `WEFT_MAX_RETRIES` | `3` |
//! | `WEFT_TOOL_CHOICE` (`auto`, `none` or `required`) | provider default |

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_TEMPERATURE: f32 = 0.0;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_RETRIES: usize = 3;
pub const TOOL_CHOICES: [&str; 3] = ["auto", "none", "required"];

/// Invalid or missing settings. Fatal at startup, before any request is sent.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("no API key: set GOOGLE_API_KEY (or OPENAI_API_KEY)")]
    MissingCredential,
    #[error("invalid {key}={value}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Everything needed to build the chat client.
#[derive(Clone, PartialEq)]
pub struct ModelSettings {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub temperature: f32,
    pub timeout: Duration,
    pub max_retries: usize,
    /// Lowercased, one of [`TOOL_CHOICES`]; `None` leaves it to the provider.
    pub tool_choice: Option<String>,
}

impl fmt::Debug for ModelSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSettings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("tool_choice", &self.tool_choice)
            .finish()
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
            reason: e.to_string(),
        }),
    }
}

impl ModelSettings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup` (a map in tests, the environment otherwise).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let api_key = non_empty("GOOGLE_API_KEY")
            .or_else(|| non_empty("OPENAI_API_KEY"))
            .ok_or(ConfigError::MissingCredential)?;
        let model = non_empty("WEFT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_base = non_empty("WEFT_API_BASE")
            .map(|b| b.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let temperature: f32 = parse_or(&lookup, "WEFT_TEMPERATURE", DEFAULT_TEMPERATURE)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidValue {
                key: "WEFT_TEMPERATURE".into(),
                value: temperature.to_string(),
                reason: "must be between 0 and 2".into(),
            });
        }
        let timeout_secs: u64 = parse_or(&lookup, "WEFT_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "WEFT_TIMEOUT_SECS".into(),
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }
        let max_retries = parse_or(&lookup, "WEFT_MAX_RETRIES", DEFAULT_MAX_RETRIES)?;
        let tool_choice = match non_empty("WEFT_TOOL_CHOICE") {
            None => None,
            Some(raw) => {
                let mode = raw.trim().to_lowercase();
                if !TOOL_CHOICES.contains(&mode.as_str()) {
                    return Err(ConfigError::InvalidValue {
                        key: "WEFT_TOOL_CHOICE".into(),
                        value: raw,
                        reason: "use auto, none or required".into(),
                    });
                }
                Some(mode)
            }
        };

        Ok(Self {
            api_key,
            model,
            api_base,
            temperature,
            timeout: Duration::from_secs(timeout_secs),
            max_retries,
            tool_choice,
        })
    }
}
