//! Web search through the DuckDuckGo HTML endpoint.

use async_trait::async_trait;

use super::{
    check_status, collapse_whitespace, html_decode, truncate_chars, Tool, ToolError, ToolLimits,
};

const SERVICE: &str = "DuckDuckGo";

/// Search the web (DuckDuckGo HTML results, no API key needed).
pub struct WebSearch {
    client: reqwest::Client,
    base_url: String,
    limits: ToolLimits,
}

impl WebSearch {
    pub fn new(client: reqwest::Client, base_url: &str, limits: ToolLimits) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            limits,
        }
    }
}

#[async_trait]
impl Tool for WebSearch {
    fn name(&self) -> &str {
        "Search"
    }

    fn description(&self) -> &str {
        "A wrapper around DuckDuckGo Search. Useful for when you need to answer questions about current events. Input should be a search query."
    }

    fn limits(&self) -> ToolLimits {
        self.limits
    }

    async fn invoke(&self, query: &str) -> Result<String, ToolError> {
        let url = format!(
            "{}/html/?q={}",
            self.base_url,
            urlencoding::encode(query.trim())
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ToolError::Request {
                service: SERVICE,
                source,
            })?;
        let html = check_status(SERVICE, response)?
            .text()
            .await
            .map_err(|source| ToolError::Request {
                service: SERVICE,
                source,
            })?;

        let snippets = extract_ddg_snippets(&html, self.limits.max_results);
        if snippets.is_empty() {
            return Ok("No good DuckDuckGo Search Result was found".to_string());
        }

        Ok(truncate_chars(
            &snippets.join(" "),
            self.limits.max_result_chars,
        ))
    }
}

/// Extract result snippets from DuckDuckGo HTML.
fn extract_ddg_snippets(html: &str, max_results: usize) -> Vec<String> {
    html.split("result__body")
        .skip(1)
        .filter_map(|chunk| {
            let snippet = chunk
                .split("class=\"result__snippet\"")
                .nth(1)?
                .split_once('>')?
                .1;
            let end = snippet.find("</a>").unwrap_or(snippet.len());
            let text = collapse_whitespace(&html_decode(&strip_tags(&snippet[..end])));
            (!text.is_empty()).then_some(text)
        })
        .take(max_results)
        .collect()
}

/// Drop inline markup such as `<b>` highlighting.
fn strip_tags(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use pretty_assertions::assert_eq;

    use super::*;

    const RESULTS_PAGE: &str = r#"
        <div class="result results_links">
          <div class="links_main links_deep result__body">
            <h2 class="result__title"><a class="result__a" href="https://example.com/paris">Paris - Wikipedia</a></h2>
            <a class="result__snippet" href="https://example.com/paris"><b>Paris</b> is the capital and largest city of France &amp; its
               political centre.</a>
          </div>
        </div>
        <div class="result results_links">
          <div class="links_main links_deep result__body">
            <a class="result__snippet" href="https://example.com/lyon">Lyon is a city in France.</a>
          </div>
        </div>
    "#;

    fn limits(max_results: usize, max_result_chars: usize) -> ToolLimits {
        ToolLimits {
            max_results,
            max_result_chars,
        }
    }

    #[test]
    fn test_extract_snippets_strips_markup() {
        let snippets = extract_ddg_snippets(RESULTS_PAGE, 5);
        assert_eq!(
            snippets,
            vec![
                "Paris is the capital and largest city of France & its political centre.",
                "Lyon is a city in France.",
            ]
        );
    }

    #[test]
    fn test_extract_snippets_respects_max_results() {
        assert_eq!(extract_ddg_snippets(RESULTS_PAGE, 1).len(), 1);
        assert!(extract_ddg_snippets("<html></html>", 3).is_empty());
    }

    #[tokio::test]
    async fn test_invoke_caps_output() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/html/")
            .match_query(Matcher::UrlEncoded(
                "q".into(),
                "capital of France".into(),
            ))
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(RESULTS_PAGE)
            .create_async()
            .await;

        let tool = WebSearch::new(reqwest::Client::new(), &server.url(), limits(1, 20));
        let result = tool.invoke("capital of France").await.unwrap();

        assert_eq!(result, "Paris is the capital");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invoke_without_results() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/html/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html><body>No results.</body></html>")
            .create_async()
            .await;

        let tool = WebSearch::new(reqwest::Client::new(), &server.url(), limits(1, 200));
        let result = tool.invoke("zzzz").await.unwrap();

        assert_eq!(result, "No good DuckDuckGo Search Result was found");
    }

    #[tokio::test]
    async fn test_invoke_surfaces_upstream_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/html/")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let tool = WebSearch::new(reqwest::Client::new(), &server.url(), limits(1, 200));
        let err = tool.invoke("anything").await.unwrap_err();

        assert!(matches!(err, ToolError::Status { status: 503, .. }));
    }
}
