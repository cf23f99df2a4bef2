//! Web search through the Serper Google Search API

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Capability, CapabilityError, CapabilityKind, CapabilityRequest};

pub struct SerperSearch {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    num_results: usize,
}

#[derive(Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: usize,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SearchResult>,
    #[serde(default, rename = "topStories")]
    top_stories: Vec<SearchResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl SerperSearch {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        endpoint: String,
        num_results: usize,
    ) -> Self {
        Self {
            client,
            api_key,
            endpoint,
            num_results,
        }
    }
}

#[async_trait]
impl Capability for SerperSearch {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Search
    }

    async fn invoke(&self, request: &CapabilityRequest) -> Result<String, CapabilityError> {
        let query = request.target.trim();
        if query.is_empty() {
            return Err(CapabilityError::InvalidTarget {
                kind: CapabilityKind::Search,
                target: request.target.clone(),
            });
        }
        debug!("Serper search: {}", query);

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&SerperRequest {
                q: query,
                num: self.num_results,
            })
            .send()
            .await
            .map_err(|e| CapabilityError::failed(request, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CapabilityError::failed(
                request,
                format!("Serper API error ({}): {}", status, body),
            ));
        }

        let parsed: SerperResponse = response
            .json()
            .await
            .map_err(|e| CapabilityError::failed(request, format!("bad response: {}", e)))?;

        let mut results = parsed.top_stories;
        results.extend(parsed.organic);
        Ok(format_results(query, &results))
    }
}

/// Render results as a numbered plain-text list for the prompt
pub fn format_results(query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return format!("No search results for \"{}\".", query);
    }
    let mut out = format!("Search results for \"{}\":\n", query);
    for (i, r) in results.iter().enumerate() {
        out.push_str(&format!("{}. {} <{}>", i + 1, r.title, r.link));
        if let Some(source) = &r.source {
            out.push_str(&format!(" [{}]", source));
        }
        if let Some(date) = &r.date {
            out.push_str(&format!(" ({})", date));
        }
        out.push('\n');
        if !r.snippet.is_empty() {
            out.push_str(&format!("   {}\n", r.snippet));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serper_payload() {
        let payload = r#"{
            "organic": [{"title": "A", "link": "https://a.example", "snippet": "first"}],
            "topStories": [{"title": "B", "link": "https://b.example", "source": "Wire", "date": "2 hours ago"}]
        }"#;
        let parsed: SerperResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(parsed.organic.len(), 1);
        assert_eq!(parsed.top_stories[0].source.as_deref(), Some("Wire"));
    }

    #[test]
    fn test_format_results() {
        let results = vec![SearchResult {
            title: "Claim checked".to_string(),
            link: "https://factcheck.example/1".to_string(),
            snippet: "Rated false".to_string(),
            date: None,
            source: None,
        }];
        let text = format_results("q", &results);
        assert!(text.contains("1. Claim checked <https://factcheck.example/1>"));
        assert!(text.contains("Rated false"));
        assert_eq!(format_results("q", &[]), "No search results for \"q\".");
    }
}
