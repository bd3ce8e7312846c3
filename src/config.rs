//! Configuration management for Search Bot.
//!
//! Configuration can be set via environment variables (a `.env` file in the
//! working directory is loaded first, if present):
//! - `GROQ_API_KEY` - Optional. Default model API key; a key entered in the UI takes precedence.
//! - `GROQ_MODEL` - Optional. Model identifier. Defaults to `llama3-8b-8192`.
//! - `GROQ_BASE_URL` - Optional. OpenAI-compatible API base. Defaults to `https://api.groq.com/openai/v1`.
//! - `LLM_TEMPERATURE` - Optional. Sampling temperature. Defaults to `0.7`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `8501`.
//! - `MAX_ITERATIONS` - Optional. Maximum reason-act steps per turn. Defaults to `15`.
//! - `RECOVER_PARSE_ERRORS` - Optional. Feed unparseable model output back as an observation. Defaults to `false`.
//! - `TOOL_MAX_RESULTS` - Optional. Results requested per lookup. Defaults to `1`.
//! - `TOOL_MAX_RESULT_CHARS` - Optional. Characters kept per lookup. Defaults to `200`.
//! - `REQUEST_TIMEOUT_SECS` - Optional. Outbound HTTP timeout. Defaults to `30`.
//! - `SESSION_IDLE_TIMEOUT_SECS` - Optional. Idle sessions are dropped after this. Defaults to `3600`.
//! - `SUBMIT_MODE` - Optional. `button` or `on_change`. Defaults to `button`.
//! - `DDG_BASE_URL`, `ARXIV_BASE_URL`, `WIKIPEDIA_BASE_URL` - Optional. Lookup endpoints.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::credential::Credential;

pub const DEFAULT_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_DDG_BASE_URL: &str = "https://html.duckduckgo.com";
pub const DEFAULT_ARXIV_BASE_URL: &str = "https://export.arxiv.org";
pub const DEFAULT_WIKIPEDIA_BASE_URL: &str = "https://en.wikipedia.org";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// How the chat page dispatches the input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    /// A "Search" button submits the form; the input keeps its text afterwards.
    Button,
    /// The input submits on change and is cleared after dispatch.
    OnChange,
}

impl FromStr for SubmitMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().replace('-', "_").as_str() {
            "button" => Ok(Self::Button),
            "on_change" | "onchange" => Ok(Self::OnChange),
            other => Err(format!("expected `button` or `on_change`, got: {}", other)),
        }
    }
}

/// Lookup tool configuration.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Maximum number of results requested from each backend
    pub max_results: usize,

    /// Maximum number of characters returned to the agent per lookup
    pub max_result_chars: usize,

    pub ddg_base_url: String,
    pub arxiv_base_url: String,
    pub wikipedia_base_url: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            max_results: 1,
            max_result_chars: 200,
            ddg_base_url: DEFAULT_DDG_BASE_URL.to_string(),
            arxiv_base_url: DEFAULT_ARXIV_BASE_URL.to_string(),
            wikipedia_base_url: DEFAULT_WIKIPEDIA_BASE_URL.to_string(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default model API key, used when the session has none
    pub default_api_key: Option<Credential>,

    /// Model identifier passed to the chat-completions API
    pub model: String,

    /// OpenAI-compatible API base URL
    pub llm_base_url: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Maximum iterations for the reason-act loop
    pub max_iterations: usize,

    /// Whether unparseable model output is fed back instead of ending the turn
    pub recover_parse_errors: bool,

    /// Timeout applied to every outbound HTTP request
    pub request_timeout: Duration,

    /// Sessions untouched for longer than this are dropped
    pub session_idle_timeout: Duration,

    /// Chat page submit behavior
    pub submit_mode: SubmitMode,

    /// Lookup tool configuration
    pub tools: ToolConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_api_key = lookup("GROQ_API_KEY").and_then(|v| Credential::from_input(&v));

        let model = lookup("GROQ_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let llm_base_url =
            lookup("GROQ_BASE_URL").unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string());

        let temperature = parse_var(&lookup, "LLM_TEMPERATURE")?.unwrap_or(0.7);

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = parse_var(&lookup, "PORT")?.unwrap_or(8501);

        let max_iterations: usize = parse_var(&lookup, "MAX_ITERATIONS")?.unwrap_or(15);
        if max_iterations == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_ITERATIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let recover_parse_errors = lookup("RECOVER_PARSE_ERRORS")
            .map(|v| {
                parse_bool(&v)
                    .map_err(|e| ConfigError::InvalidValue("RECOVER_PARSE_ERRORS".to_string(), e))
            })
            .transpose()?
            .unwrap_or(false);

        let request_timeout =
            Duration::from_secs(parse_var(&lookup, "REQUEST_TIMEOUT_SECS")?.unwrap_or(30));

        let session_idle_timeout =
            Duration::from_secs(parse_var(&lookup, "SESSION_IDLE_TIMEOUT_SECS")?.unwrap_or(3600));

        let submit_mode = lookup("SUBMIT_MODE")
            .map(|v| {
                v.parse::<SubmitMode>()
                    .map_err(|e| ConfigError::InvalidValue("SUBMIT_MODE".to_string(), e))
            })
            .transpose()?
            .unwrap_or(SubmitMode::Button);

        let defaults = ToolConfig::default();
        let tools = ToolConfig {
            max_results: parse_var(&lookup, "TOOL_MAX_RESULTS")?.unwrap_or(defaults.max_results),
            max_result_chars: parse_var(&lookup, "TOOL_MAX_RESULT_CHARS")?
                .unwrap_or(defaults.max_result_chars),
            ddg_base_url: lookup("DDG_BASE_URL").unwrap_or(defaults.ddg_base_url),
            arxiv_base_url: lookup("ARXIV_BASE_URL").unwrap_or(defaults.arxiv_base_url),
            wikipedia_base_url: lookup("WIKIPEDIA_BASE_URL")
                .unwrap_or(defaults.wikipedia_base_url),
        };

        Ok(Self {
            default_api_key,
            model,
            llm_base_url,
            temperature,
            host,
            port,
            max_iterations,
            recover_parse_errors,
            request_timeout,
            session_idle_timeout,
            submit_mode,
            tools,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
            temperature: 0.7,
            host: "127.0.0.1".to_string(),
            port: 8501,
            max_iterations: 15,
            recover_parse_errors: false,
            request_timeout: Duration::from_secs(30),
            session_idle_timeout: Duration::from_secs(3600),
            submit_mode: SubmitMode::Button,
            tools: ToolConfig::default(),
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidValue(key.to_string(), format!("{}", e)))
        })
        .transpose()
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
        other => Err(format!("expected boolean-like value, got: {}", other)),
    }
}
