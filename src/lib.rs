pub mod capabilities;
pub mod clients;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod http;
pub mod keywords;
pub mod pipeline;
pub mod report;

use std::sync::Arc;

use crate::capabilities::{
    CapabilitySet, RedditClient, RedditPost, is_reddit_url, shared_http_client,
};
use crate::clients::OpenAIChatClient;
use crate::config::Config;
use crate::error::{NewsProbeError, Result};
use crate::pipeline::Pipeline;

/// News analysis pipeline wired to the configured model and live capabilities.
/// The model and every capability share one HTTP client.
pub fn build_news_pipeline(config: &Config) -> Result<Pipeline> {
    let client = shared_http_client(config)?;
    let model = OpenAIChatClient::from_config(config, client.clone())?;
    let capabilities = CapabilitySet::from_config(config, client);
    let pipeline = Pipeline::news_analysis(Arc::new(model), capabilities)?
        .with_max_capability_calls(config.pipeline.max_capability_calls);
    Ok(pipeline)
}

/// Fetch a Reddit post with its top comments
pub async fn fetch_reddit_post(config: &Config, url: &str) -> Result<RedditPost> {
    if !is_reddit_url(url) {
        return Err(NewsProbeError::input(
            "Invalid Reddit URL. Please enter a URL from reddit.com",
        ));
    }
    let client = shared_http_client(config)?;
    RedditClient::new(client)
        .fetch_post(url)
        .await
        .map_err(|e| NewsProbeError::Capability {
            message: format!("Error fetching Reddit post: {}", e),
        })
}
