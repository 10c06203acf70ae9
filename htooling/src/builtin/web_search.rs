//! Web search over the DuckDuckGo instant answer API.

use std::sync::Arc;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use hprovider::ToolDefinition;

use crate::{
    Tool, ToolError, ToolExecutionContext, ToolFuture, optional_u64, parse_json_object,
    required_string, tool_definition,
};

pub const DEFAULT_MAX_RESULTS: usize = 5;

const DUCKDUCKGO_URL: &str = "https://api.duckduckgo.com/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

pub trait SearchBackend: Send + Sync {
    fn search<'a>(
        &'a self,
        query: &'a str,
        max_results: usize,
    ) -> ToolFuture<'a, Result<Vec<SearchResult>, ToolError>>;
}

#[derive(Debug, Clone)]
pub struct DuckDuckGoBackend {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoBackend {
    pub fn new(client: Client) -> Self {
        Self::with_endpoint(client, DUCKDUCKGO_URL)
    }

    pub fn with_endpoint(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct InstantAnswer {
    heading: String,
    abstract_text: String,
    #[serde(rename = "AbstractURL")]
    abstract_url: String,
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct RelatedTopic {
    text: String,
    #[serde(rename = "FirstURL")]
    first_url: String,
    topics: Vec<RelatedTopic>,
}

fn flatten_topics(topics: Vec<RelatedTopic>, results: &mut Vec<SearchResult>) {
    for topic in topics {
        if !topic.topics.is_empty() {
            flatten_topics(topic.topics, results);
            continue;
        }
        if topic.text.is_empty() {
            continue;
        }

        let title = topic
            .text
            .split_once(" - ")
            .map(|(title, _)| title.to_string())
            .unwrap_or_else(|| topic.text.clone());
        results.push(SearchResult {
            title,
            url: topic.first_url,
            snippet: topic.text,
        });
    }
}

fn parse_instant_answer(body: &str, max_results: usize) -> Result<Vec<SearchResult>, ToolError> {
    let answer = serde_json::from_str::<InstantAnswer>(body)
        .map_err(|err| ToolError::execution(format!("invalid search response: {err}")))?;

    let mut results = Vec::new();
    if !answer.abstract_text.is_empty() {
        results.push(SearchResult {
            title: answer.heading,
            url: answer.abstract_url,
            snippet: answer.abstract_text,
        });
    }
    flatten_topics(answer.related_topics, &mut results);
    results.truncate(max_results);
    Ok(results)
}

impl SearchBackend for DuckDuckGoBackend {
    fn search<'a>(
        &'a self,
        query: &'a str,
        max_results: usize,
    ) -> ToolFuture<'a, Result<Vec<SearchResult>, ToolError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(&self.endpoint)
                .query(&[
                    ("q", query),
                    ("format", "json"),
                    ("no_html", "1"),
                    ("skip_disambig", "1"),
                ])
                .send()
                .await
                .map_err(|err| ToolError::execution(format!("search request failed: {err}")))?;

            if !response.status().is_success() {
                return Err(ToolError::execution(format!(
                    "search returned status {}",
                    response.status()
                )));
            }

            let body = response
                .text()
                .await
                .map_err(|err| ToolError::execution(format!("failed to read search response: {err}")))?;
            parse_instant_answer(&body, max_results)
        })
    }
}

#[derive(Clone)]
pub struct WebSearchTool {
    backend: Arc<dyn SearchBackend>,
}

impl WebSearchTool {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, ToolError> {
        self.backend.search(query, max_results).await
    }
}

impl std::fmt::Debug for WebSearchTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSearchTool").finish_non_exhaustive()
    }
}

impl Tool for WebSearchTool {
    fn definition(&self) -> ToolDefinition {
        tool_definition(
            "web_search",
            "Search the web and return titles, URLs, and snippets",
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string"},
                    "max_results": {"type": "integer", "minimum": 1, "default": DEFAULT_MAX_RESULTS}
                },
                "required": ["query"]
            }),
        )
    }

    /// Backend failures are reported in the output as `[{"error": ...}]`.
    fn invoke<'a>(
        &'a self,
        args_json: &'a str,
        _context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<String, ToolError>> {
        Box::pin(async move {
            let args = parse_json_object(args_json)?;
            let query = required_string(&args, "query")?;
            let max_results = optional_u64(&args, "max_results")?
                .map(|value| value as usize)
                .unwrap_or(DEFAULT_MAX_RESULTS);

            let output = match self.search(&query, max_results).await {
                Ok(results) => json!(results),
                Err(error) => Value::Array(vec![json!({"error": error.message})]),
            };
            Ok(output.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToolErrorKind;

    const ANSWER: &str = r#"{
        "Heading": "Rust (programming language)",
        "AbstractText": "Rust is a general-purpose programming language.",
        "AbstractURL": "https://en.wikipedia.org/wiki/Rust_(programming_language)",
        "RelatedTopics": [
            {"Text": "Cargo - Rust package manager", "FirstURL": "https://duckduckgo.com/Cargo"},
            {"Name": "See also", "Topics": [
                {"Text": "Ferris - Rust mascot", "FirstURL": "https://duckduckgo.com/Ferris"}
            ]},
            {"Text": "", "FirstURL": ""}
        ]
    }"#;

    struct StaticBackend(Result<Vec<SearchResult>, ToolError>);

    impl SearchBackend for StaticBackend {
        fn search<'a>(
            &'a self,
            _query: &'a str,
            max_results: usize,
        ) -> ToolFuture<'a, Result<Vec<SearchResult>, ToolError>> {
            let mut outcome = self.0.clone();
            if let Ok(results) = outcome.as_mut() {
                results.truncate(max_results);
            }
            Box::pin(async move { outcome })
        }
    }

    fn result(title: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            url: format!("https://example.com/{title}"),
            snippet: format!("about {title}"),
        }
    }

    #[test]
    fn instant_answer_puts_abstract_first_and_flattens_groups() {
        let results = parse_instant_answer(ANSWER, 5).expect("answer should parse");

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "Rust (programming language)");
        assert_eq!(results[1].title, "Cargo");
        assert_eq!(results[1].snippet, "Cargo - Rust package manager");
        assert_eq!(results[2].url, "https://duckduckgo.com/Ferris");
    }

    #[test]
    fn instant_answer_respects_max_results() {
        let results = parse_instant_answer(ANSWER, 1).expect("answer should parse");
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn tool_defaults_to_five_results() {
        let backend = StaticBackend(Ok((0..8).map(|n| result(&n.to_string())).collect()));
        let tool = WebSearchTool::new(Arc::new(backend));

        let output = tool
            .invoke(r#"{"query":"rust"}"#, &ToolExecutionContext::new())
            .await
            .expect("search should succeed");
        let parsed: Vec<SearchResult> = serde_json::from_str(&output).expect("output is JSON");
        assert_eq!(parsed.len(), DEFAULT_MAX_RESULTS);
    }

    #[tokio::test]
    async fn backend_failure_is_reported_inline() {
        let backend = StaticBackend(Err(ToolError::execution("search returned status 503")));
        let tool = WebSearchTool::new(Arc::new(backend));

        let output = tool
            .invoke(r#"{"query":"rust","max_results":3}"#, &ToolExecutionContext::new())
            .await
            .expect("failure is still output");
        assert_eq!(output, r#"[{"error":"search returned status 503"}]"#);
    }

    #[tokio::test]
    async fn missing_query_is_invalid_arguments() {
        let tool = WebSearchTool::new(Arc::new(StaticBackend(Ok(Vec::new()))));

        let error = tool
            .invoke("{}", &ToolExecutionContext::new())
            .await
            .expect_err("query is required");
        assert_eq!(error.kind, ToolErrorKind::InvalidArguments);
    }
}
