//! Wikipedia summary lookup through the MediaWiki action API.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{check_status, truncate_chars, Tool, ToolError, ToolLimits, MAX_QUERY_CHARS};

const SERVICE: &str = "Wikipedia";

/// Look up page summaries on Wikipedia.
pub struct WikipediaLookup {
    client: reqwest::Client,
    base_url: String,
    limits: ToolLimits,
}

#[derive(Deserialize)]
struct SearchResponse {
    query: SearchQuery,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Deserialize)]
struct ExtractResponse {
    query: ExtractQuery,
}

#[derive(Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    missing: bool,
}

impl WikipediaLookup {
    pub fn new(client: reqwest::Client, base_url: &str, limits: ToolLimits) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            limits,
        }
    }

    async fn api_get<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T, ToolError> {
        let response = self
            .client
            .get(format!("{}/w/api.php", self.base_url))
            .query(&[("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await
            .map_err(|source| ToolError::Request {
                service: SERVICE,
                source,
            })?;
        let body = check_status(SERVICE, response)?
            .text()
            .await
            .map_err(|source| ToolError::Request {
                service: SERVICE,
                source,
            })?;

        serde_json::from_str(&body).map_err(|e| ToolError::Malformed {
            service: SERVICE,
            reason: e.to_string(),
        })
    }

    async fn search_titles(&self, query: &str) -> Result<Vec<String>, ToolError> {
        let limit = self.limits.max_results.to_string();
        let response: SearchResponse = self
            .api_get(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
            ])
            .await?;

        Ok(response.query.search.into_iter().map(|hit| hit.title).collect())
    }

    /// Plain-text intro of a page; `None` when the page has no usable extract.
    async fn page_summary(&self, title: &str) -> Result<Option<String>, ToolError> {
        let response: ExtractResponse = self
            .api_get(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
            ])
            .await?;

        Ok(response
            .query
            .pages
            .into_iter()
            .find(|page| !page.missing)
            .and_then(|page| {
                let extract = page.extract?.trim().to_string();
                (!extract.is_empty())
                    .then(|| format!("Page: {}\nSummary: {}", page.title, extract))
            }))
    }
}

#[async_trait]
impl Tool for WikipediaLookup {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn description(&self) -> &str {
        "A wrapper around Wikipedia. Useful for when you need to answer general questions about people, places, companies, facts, historical events, or other subjects. Input should be a search query."
    }

    fn limits(&self) -> ToolLimits {
        self.limits
    }

    async fn invoke(&self, query: &str) -> Result<String, ToolError> {
        let query = truncate_chars(query.trim(), MAX_QUERY_CHARS);
        let titles = self.search_titles(&query).await?;

        let mut summaries = Vec::new();
        for title in titles.iter().take(self.limits.max_results) {
            if let Some(summary) = self.page_summary(title).await? {
                summaries.push(summary);
            } else {
                tracing::debug!("Wikipedia page '{}' has no summary", title);
            }
        }

        if summaries.is_empty() {
            return Ok("No good Wikipedia Search Result was found".to_string());
        }

        Ok(truncate_chars(
            &summaries.join("\n\n"),
            self.limits.max_result_chars,
        ))
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn tool(url: &str, max_result_chars: usize) -> WikipediaLookup {
        WikipediaLookup::new(
            reqwest::Client::new(),
            url,
            ToolLimits {
                max_results: 1,
                max_result_chars,
            },
        )
    }

    #[tokio::test]
    async fn test_invoke_searches_then_fetches_summary() {
        let mut server = mockito::Server::new_async().await;
        let search = server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("list".into(), "search".into()),
                Matcher::UrlEncoded("srsearch".into(), "capital of France".into()),
                Matcher::UrlEncoded("srlimit".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(json!({"query": {"search": [{"title": "Paris"}]}}).to_string())
            .create_async()
            .await;
        let extract = server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("prop".into(), "extracts".into()),
                Matcher::UrlEncoded("titles".into(), "Paris".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({"query": {"pages": [{
                    "title": "Paris",
                    "extract": "Paris is the capital and largest city of France."
                }]}})
                .to_string(),
            )
            .create_async()
            .await;

        let result = tool(&server.url(), 200)
            .invoke("capital of France")
            .await
            .unwrap();

        assert_eq!(
            result,
            "Page: Paris\nSummary: Paris is the capital and largest city of France."
        );
        search.assert_async().await;
        extract.assert_async().await;
    }

    #[tokio::test]
    async fn test_invoke_truncates_summary() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::UrlEncoded("list".into(), "search".into()))
            .with_status(200)
            .with_body(json!({"query": {"search": [{"title": "Paris"}]}}).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::UrlEncoded("prop".into(), "extracts".into()))
            .with_status(200)
            .with_body(
                json!({"query": {"pages": [{"title": "Paris", "extract": "x".repeat(500)}]}})
                    .to_string(),
            )
            .create_async()
            .await;

        let result = tool(&server.url(), 200).invoke("Paris").await.unwrap();

        assert_eq!(result.chars().count(), 200);
        assert!(result.starts_with("Page: Paris\nSummary: xxx"));
    }

    #[tokio::test]
    async fn test_invoke_without_hits() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"query": {"search": []}}).to_string())
            .create_async()
            .await;

        let result = tool(&server.url(), 200).invoke("qwxz").await.unwrap();

        assert_eq!(result, "No good Wikipedia Search Result was found");
    }

    #[tokio::test]
    async fn test_invoke_rejects_malformed_payload() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let err = tool(&server.url(), 200).invoke("Paris").await.unwrap_err();

        assert!(matches!(err, ToolError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_long_query_is_cut_before_lookup() {
        let mut server = mockito::Server::new_async().await;
        let search = server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("list".into(), "search".into()),
                Matcher::UrlEncoded("srsearch".into(), "é".repeat(MAX_QUERY_CHARS)),
            ]))
            .with_status(200)
            .with_body(json!({"query": {"search": []}}).to_string())
            .create_async()
            .await;

        let result = tool(&server.url(), 200)
            .invoke(&"é".repeat(MAX_QUERY_CHARS * 2))
            .await
            .unwrap();

        assert_eq!(result, "No good Wikipedia Search Result was found");
        search.assert_async().await;
    }
}
