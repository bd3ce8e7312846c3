//! Lookup tools the agent can call.
//!
//! Every tool takes a plain-text query and returns plain text, capped to a
//! configured number of results and characters so observations stay small
//! enough to feed back into the prompt.

mod arxiv;
mod search;
mod wikipedia;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ToolConfig;

pub use arxiv::ArxivLookup;
pub use search::WebSearch;
pub use wikipedia::WikipediaLookup;

/// Queries longer than this are cut before being sent to a lookup backend.
pub const MAX_QUERY_CHARS: usize = 300;

/// A lookup backend failed or returned something unusable.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("request to {service} failed: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned HTTP {status}")]
    Status { service: &'static str, status: u16 },

    #[error("{service} returned malformed data: {reason}")]
    Malformed {
        service: &'static str,
        reason: String,
    },
}

/// Result-size caps applied by every tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolLimits {
    /// Maximum number of results requested from the backend
    pub max_results: usize,
    /// Maximum number of characters returned
    pub max_result_chars: usize,
}

impl From<&ToolConfig> for ToolLimits {
    fn from(config: &ToolConfig) -> Self {
        Self {
            max_results: config.max_results.max(1),
            max_result_chars: config.max_result_chars,
        }
    }
}

/// A query-in, text-out capability exposed to the agent.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses in `Action:` lines.
    fn name(&self) -> &str;

    /// Description shown to the model.
    fn description(&self) -> &str;

    fn limits(&self) -> ToolLimits;

    async fn invoke(&self, query: &str) -> Result<String, ToolError>;
}

/// Name and description of a registered tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// The fixed set of tools available to the agent.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Web search, Arxiv and Wikipedia, in the order the model sees them.
    pub fn standard(client: reqwest::Client, config: &ToolConfig) -> Self {
        let limits = ToolLimits::from(config);
        Self::with_tools(vec![
            Arc::new(WebSearch::new(client.clone(), &config.ddg_base_url, limits)),
            Arc::new(ArxivLookup::new(
                client.clone(),
                &config.arxiv_base_url,
                limits,
            )),
            Arc::new(WikipediaLookup::new(
                client,
                &config.wikipedia_base_url,
                limits,
            )),
        ])
    }

    pub fn with_tools(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn list_tools(&self) -> Vec<ToolInfo> {
        self.tools
            .iter()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect()
    }
}

/// Shared HTTP client for lookup backends.
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent("Mozilla/5.0 (compatible; SearchBot/0.1)")
        .timeout(timeout)
        .build()
}

/// Keep at most `max_chars` characters.
pub(crate) fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Basic HTML/XML entity decoding.
pub(crate) fn html_decode(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Map a non-success response to [`ToolError::Status`].
pub(crate) fn check_status(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ToolError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        tracing::warn!("{} returned HTTP {}", service, status);
        Err(ToolError::Status {
            service,
            status: status.as_u16(),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("short", 200), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_html_decode_handles_double_escaping_once() {
        assert_eq!(html_decode("Tom &amp; Jerry &lt;3"), "Tom & Jerry <3");
        assert_eq!(html_decode("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_standard_registry_order_and_limits() {
        let config = ToolConfig::default();
        let registry = ToolRegistry::standard(reqwest::Client::new(), &config);
        assert_eq!(registry.names(), vec!["Search", "arxiv", "wikipedia"]);
        for name in registry.names() {
            let limits = registry.get(name).unwrap().limits();
            assert_eq!(limits.max_results, 1);
            assert_eq!(limits.max_result_chars, 200);
        }
        assert!(registry.get("calculator").is_none());
    }
}
