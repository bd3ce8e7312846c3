//! Arxiv abstract lookup through the arxiv export API (Atom feed).

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::{
    check_status, collapse_whitespace, html_decode, truncate_chars, Tool, ToolError, ToolLimits,
    MAX_QUERY_CHARS,
};

const SERVICE: &str = "arxiv";

static ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<entry>(.*?)</entry>").expect("valid regex"));
static PUBLISHED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<published>(.*?)</published>").expect("valid regex"));
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<title[^>]*>(.*?)</title>").expect("valid regex"));
static SUMMARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<summary[^>]*>(.*?)</summary>").expect("valid regex"));
static AUTHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<author>\s*<name>(.*?)</name>").expect("valid regex")
});

/// Look up paper abstracts on arxiv.org.
pub struct ArxivLookup {
    client: reqwest::Client,
    base_url: String,
    limits: ToolLimits,
}

/// One parsed feed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Paper {
    published: String,
    title: String,
    authors: Vec<String>,
    summary: String,
}

impl Paper {
    fn render(&self) -> String {
        format!(
            "Published: {}\nTitle: {}\nAuthors: {}\nSummary: {}",
            self.published,
            self.title,
            self.authors.join(", "),
            self.summary
        )
    }
}

impl ArxivLookup {
    pub fn new(client: reqwest::Client, base_url: &str, limits: ToolLimits) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            limits,
        }
    }
}

#[async_trait]
impl Tool for ArxivLookup {
    fn name(&self) -> &str {
        "arxiv"
    }

    fn description(&self) -> &str {
        "A wrapper around Arxiv.org Useful for when you need to answer questions about Physics, Mathematics, Computer Science, Quantitative Biology, Quantitative Finance, Statistics, Electrical Engineering, and Economics from scientific articles on arxiv.org. Input should be a search query."
    }

    fn limits(&self) -> ToolLimits {
        self.limits
    }

    async fn invoke(&self, query: &str) -> Result<String, ToolError> {
        let query = truncate_chars(query.trim(), MAX_QUERY_CHARS);
        let max_results = self.limits.max_results.to_string();

        let response = self
            .client
            .get(format!("{}/api/query", self.base_url))
            .query(&[
                ("search_query", query.as_str()),
                ("start", "0"),
                ("max_results", max_results.as_str()),
            ])
            .send()
            .await
            .map_err(|source| ToolError::Request {
                service: SERVICE,
                source,
            })?;
        let feed = check_status(SERVICE, response)?
            .text()
            .await
            .map_err(|source| ToolError::Request {
                service: SERVICE,
                source,
            })?;

        let papers = parse_feed(&feed)?;
        if papers.is_empty() {
            return Ok("No good Arxiv Result was found".to_string());
        }

        let text = papers
            .iter()
            .take(self.limits.max_results)
            .map(Paper::render)
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(truncate_chars(&text, self.limits.max_result_chars))
    }
}

fn parse_feed(feed: &str) -> Result<Vec<Paper>, ToolError> {
    if !feed.contains("<feed") {
        return Err(ToolError::Malformed {
            service: SERVICE,
            reason: "response is not an Atom feed".to_string(),
        });
    }

    ENTRY_RE
        .captures_iter(feed)
        .map(|entry| parse_entry(&entry[1]))
        .collect()
}

fn parse_entry(entry: &str) -> Result<Paper, ToolError> {
    let field = |re: &Regex, name: &str| {
        re.captures(entry)
            .map(|c| collapse_whitespace(&html_decode(&c[1])))
            .ok_or_else(|| ToolError::Malformed {
                service: SERVICE,
                reason: format!("entry without <{}>", name),
            })
    };

    let published = field(&*PUBLISHED_RE, "published")?;
    let published = published.get(..10).unwrap_or(&published).to_string();

    Ok(Paper {
        published,
        title: field(&*TITLE_RE, "title")?,
        authors: AUTHOR_RE
            .captures_iter(entry)
            .map(|c| collapse_whitespace(&html_decode(&c[1])))
            .collect(),
        summary: field(&*SUMMARY_RE, "summary")?,
    })
}
