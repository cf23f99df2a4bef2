//! External tools a stage may invoke: web search, page scraping, social lookups.
//!
//! Every tool sits behind the same `Capability::invoke` signature. Stages name
//! the kinds they may use in a static list; `CapabilitySet` resolves those
//! kinds to concrete implementations at run time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;

pub mod scrape;
pub mod search;
pub mod social;

pub use scrape::{WebScraper, html_to_text};
pub use search::SerperSearch;
pub use social::{RedditClient, RedditLookup, RedditPost, is_reddit_url};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    Search,
    Scrape,
    Social,
}

impl CapabilityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityKind::Search => "search",
            CapabilityKind::Scrape => "scrape",
            CapabilityKind::Social => "social",
        }
    }
}

impl std::fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One invocation: a search query, a URL to scrape, or a social lookup target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityRequest {
    pub kind: CapabilityKind,
    pub target: String,
}

impl CapabilityRequest {
    pub fn new(kind: CapabilityKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("capability {0} is not configured")]
    Unavailable(CapabilityKind),
    #[error("{kind} request for '{target}' failed: {message}")]
    Failed {
        kind: CapabilityKind,
        target: String,
        message: String,
    },
    #[error("invalid {kind} target '{target}'")]
    InvalidTarget {
        kind: CapabilityKind,
        target: String,
    },
}

impl CapabilityError {
    pub fn failed(request: &CapabilityRequest, message: impl Into<String>) -> Self {
        CapabilityError::Failed {
            kind: request.kind,
            target: request.target.clone(),
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait Capability: Send + Sync {
    fn kind(&self) -> CapabilityKind;

    async fn invoke(&self, request: &CapabilityRequest) -> Result<String, CapabilityError>;
}

/// Kind -> implementation lookup handed to the orchestrator
#[derive(Clone, Default)]
pub struct CapabilitySet {
    tools: HashMap<CapabilityKind, Arc<dyn Capability>>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, capability: Arc<dyn Capability>) -> Self {
        self.tools.insert(capability.kind(), capability);
        self
    }

    pub fn get(&self, kind: CapabilityKind) -> Result<Arc<dyn Capability>, CapabilityError> {
        self.tools
            .get(&kind)
            .cloned()
            .ok_or(CapabilityError::Unavailable(kind))
    }

    pub fn contains(&self, kind: CapabilityKind) -> bool {
        self.tools.contains_key(&kind)
    }

    /// Register every capability the config has credentials for, all on `client`
    pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
        let mut set = Self::new()
            .with(Arc::new(WebScraper::new(
                client.clone(),
                config.pipeline.scrape_max_chars,
            )))
            .with(Arc::new(RedditLookup::new(client.clone())));

        match config.runtime.serper_api_key.clone() {
            Some(key) => {
                set = set.with(Arc::new(SerperSearch::new(
                    client,
                    key,
                    config.pipeline.search_endpoint.clone(),
                    config.pipeline.search_results,
                )));
            }
            None => {
                tracing::warn!("SERPER_API_KEY not set; stages that search will fail");
            }
        }

        set
    }
}

/// Client with the configured transport timeout, shared by every capability
/// and the model client
pub fn shared_http_client(config: &Config) -> crate::error::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.pipeline.http_timeout_secs))
        .user_agent(concat!("newsprobe/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

pub(crate) fn truncate_chars(input: &str, max: usize) -> String {
    let mut out = String::new();
    for (idx, ch) in input.chars().enumerate() {
        if idx >= max {
            out.push_str("...");
            break;
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Capability for Echo {
        fn kind(&self) -> CapabilityKind {
            CapabilityKind::Search
        }

        async fn invoke(&self, request: &CapabilityRequest) -> Result<String, CapabilityError> {
            Ok(request.target.clone())
        }
    }

    #[tokio::test]
    async fn test_set_resolves_registered_kind() {
        let set = CapabilitySet::new().with(Arc::new(Echo));
        let tool = set.get(CapabilityKind::Search).unwrap();
        let out = tool
            .invoke(&CapabilityRequest::new(CapabilityKind::Search, "q"))
            .await
            .unwrap();
        assert_eq!(out, "q");
        assert!(matches!(
            set.get(CapabilityKind::Scrape),
            Err(CapabilityError::Unavailable(CapabilityKind::Scrape))
        ));
    }

    #[test]
    fn test_from_config_without_serper_key() {
        let config = Config::default();
        let set = CapabilitySet::from_config(&config, shared_http_client(&config).unwrap());
        assert!(set.contains(CapabilityKind::Scrape));
        assert!(set.contains(CapabilityKind::Social));
        assert!(!set.contains(CapabilityKind::Search));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        assert_eq!(truncate_chars("ab", 3), "ab");
    }
}
