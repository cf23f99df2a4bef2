//! Social-media lookups against Reddit's public JSON endpoints

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::{Capability, CapabilityError, CapabilityKind, CapabilityRequest, truncate_chars};

const REDDIT_SEARCH_URL: &str = "https://www.reddit.com/search.json";
const TOP_COMMENTS: usize = 10;
const SEARCH_LIMIT: usize = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RedditComment {
    pub author: String,
    pub body: String,
    pub score: i64,
    pub created_utc: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RedditPost {
    pub title: String,
    pub selftext: String,
    pub author: String,
    pub subreddit: String,
    pub score: i64,
    pub upvote_ratio: f64,
    pub created_utc: f64,
    pub url: String,
    pub permalink: String,
    pub num_comments: u64,
    pub is_original_content: bool,
    #[serde(default)]
    pub top_comments: Vec<RedditComment>,
}

/// Check if a URL is a Reddit URL
pub fn is_reddit_url(text: &str) -> bool {
    text.to_lowercase().contains("reddit.com")
}

/// `https://www.reddit.com/r/x/comments/id/slug/?utm=1` -> `.../slug.json`
pub fn post_json_url(url: &str) -> String {
    let base = url.split(['?', '#']).next().unwrap_or(url);
    format!("{}.json", base.trim_end_matches('/'))
}

fn str_field(v: &Value, key: &str) -> String {
    v[key].as_str().unwrap_or_default().to_string()
}

fn parse_post_data(data: &Value) -> RedditPost {
    RedditPost {
        title: str_field(data, "title"),
        selftext: str_field(data, "selftext"),
        author: str_field(data, "author"),
        subreddit: str_field(data, "subreddit"),
        score: data["score"].as_i64().unwrap_or(0),
        upvote_ratio: data["upvote_ratio"].as_f64().unwrap_or(0.0),
        created_utc: data["created_utc"].as_f64().unwrap_or(0.0),
        url: str_field(data, "url"),
        permalink: str_field(data, "permalink"),
        num_comments: data["num_comments"].as_u64().unwrap_or(0),
        is_original_content: data["is_original_content"].as_bool().unwrap_or(false),
        top_comments: Vec::new(),
    }
}

/// Parse the two-listing payload returned by `<permalink>.json`
pub fn parse_post_listing(payload: &Value) -> Option<RedditPost> {
    let post_data = &payload[0]["data"]["children"][0]["data"];
    if !post_data.is_object() {
        return None;
    }
    let mut post = parse_post_data(post_data);
    post.top_comments = payload[1]["data"]["children"]
        .as_array()
        .map(|children| {
            children
                .iter()
                .filter(|c| c["kind"].as_str() == Some("t1"))
                .take(TOP_COMMENTS)
                .map(|c| RedditComment {
                    author: str_field(&c["data"], "author"),
                    body: str_field(&c["data"], "body"),
                    score: c["data"]["score"].as_i64().unwrap_or(0),
                    created_utc: c["data"]["created_utc"].as_f64().unwrap_or(0.0),
                })
                .collect()
        })
        .unwrap_or_default();
    Some(post)
}

/// Parse a search listing into posts
pub fn parse_search_listing(payload: &Value) -> Vec<RedditPost> {
    payload["data"]["children"]
        .as_array()
        .map(|children| {
            children
                .iter()
                .map(|c| parse_post_data(&c["data"]))
                .collect()
        })
        .unwrap_or_default()
}

/// Thin Reddit client shared by the social capability and the `reddit` command
#[derive(Clone)]
pub struct RedditClient {
    client: reqwest::Client,
}

impl RedditClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, String> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("Reddit returned HTTP {}", response.status()));
        }
        response.json().await.map_err(|e| e.to_string())
    }

    pub async fn fetch_post(&self, url: &str) -> Result<RedditPost, String> {
        if !is_reddit_url(url) {
            return Err(format!("Invalid Reddit URL: {}", url));
        }
        let payload = self.get_json(&post_json_url(url), &[]).await?;
        let post = parse_post_listing(&payload).ok_or("Reddit payload had no post")?;
        info!("Fetched Reddit post: {}", post.title);
        Ok(post)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<RedditPost>, String> {
        let payload = self
            .get_json(
                REDDIT_SEARCH_URL,
                &[
                    ("q", query.to_string()),
                    ("limit", SEARCH_LIMIT.to_string()),
                    ("sort", "relevance".to_string()),
                ],
            )
            .await?;
        Ok(parse_search_listing(&payload))
    }
}

pub struct RedditLookup {
    reddit: RedditClient,
}

impl RedditLookup {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            reddit: RedditClient::new(client),
        }
    }
}

#[async_trait]
impl Capability for RedditLookup {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Social
    }

    async fn invoke(&self, request: &CapabilityRequest) -> Result<String, CapabilityError> {
        let target = request.target.trim();
        if target.is_empty() {
            return Err(CapabilityError::InvalidTarget {
                kind: CapabilityKind::Social,
                target: request.target.clone(),
            });
        }
        if is_reddit_url(target) {
            debug!("Social lookup of post {}", target);
            let post = self
                .reddit
                .fetch_post(target)
                .await
                .map_err(|e| CapabilityError::failed(request, e))?;
            Ok(describe_post(&post))
        } else {
            debug!("Social search for {}", target);
            let posts = self
                .reddit
                .search(target)
                .await
                .map_err(|e| CapabilityError::failed(request, e))?;
            Ok(describe_search(target, &posts))
        }
    }
}

pub fn describe_post(post: &RedditPost) -> String {
    let mut out = format!(
        "Reddit post in r/{} by u/{}: \"{}\" (score {}, upvote ratio {:.2}, {} comments)\n",
        post.subreddit, post.author, post.title, post.score, post.upvote_ratio, post.num_comments
    );
    if !post.selftext.is_empty() {
        out.push_str(&truncate_chars(&post.selftext, 2000));
        out.push('\n');
    }
    for comment in &post.top_comments {
        out.push_str(&format!(
            "- u/{} ({}): {}\n",
            comment.author,
            comment.score,
            truncate_chars(&comment.body, 300)
        ));
    }
    out
}

pub fn describe_search(query: &str, posts: &[RedditPost]) -> String {
    if posts.is_empty() {
        return format!("No Reddit posts found for \"{}\".", query);
    }
    let mut out = format!("Reddit posts for \"{}\":\n", query);
    for post in posts {
        out.push_str(&format!(
            "- r/{}: \"{}\" (score {}, {} comments, created {})\n",
            post.subreddit,
            post.title,
            post.score,
            post.num_comments,
            chrono::DateTime::<chrono::Utc>::from_timestamp(post.created_utc as i64, 0)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_reddit_url() {
        assert!(is_reddit_url("https://www.Reddit.com/r/news/comments/abc"));
        assert!(!is_reddit_url("https://example.com"));
    }

    #[test]
    fn test_post_json_url() {
        assert_eq!(
            post_json_url("https://www.reddit.com/r/news/comments/abc/title/?utm_source=x"),
            "https://www.reddit.com/r/news/comments/abc/title.json"
        );
    }

    #[test]
    fn test_parse_post_listing() {
        let payload = json!([
            {"data": {"children": [{"kind": "t3", "data": {
                "title": "Ballots found in river",
                "selftext": "Claims are spreading",
                "author": "someone",
                "subreddit": "news",
                "score": 120,
                "upvote_ratio": 0.87,
                "num_comments": 2
            }}]}},
            {"data": {"children": [
                {"kind": "t1", "data": {"author": "a", "body": "source?", "score": 5}},
                {"kind": "more", "data": {}}
            ]}}
        ]);
        let post = parse_post_listing(&payload).unwrap();
        assert_eq!(post.title, "Ballots found in river");
        assert_eq!(post.score, 120);
        assert_eq!(post.top_comments.len(), 1);
        assert_eq!(post.top_comments[0].body, "source?");
        assert!(describe_post(&post).contains("r/news"));
    }

    #[test]
    fn test_parse_post_listing_empty() {
        assert!(parse_post_listing(&json!([])).is_none());
    }
}
