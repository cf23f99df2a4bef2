//! Request and response shapes of the dashboard REST surface

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{NewsProbeError, Result};

/// Body of `POST /analyze`. At least one field must be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub hashtag: Option<String>,
}

impl AnalysisRequest {
    /// Blank fields become absent and a bare host gains `https://`
    pub fn normalize(self) -> Result<Self> {
        let url = non_blank(self.url).map(|u| {
            if u.starts_with("http://") || u.starts_with("https://") {
                u
            } else {
                format!("https://{}", u)
            }
        });
        let keyword = non_blank(self.keyword);
        let hashtag = non_blank(self.hashtag);

        if url.is_none() && keyword.is_none() && hashtag.is_none() {
            return Err(NewsProbeError::input(
                "At least one of url, keyword, or hashtag must be provided",
            ));
        }
        Ok(Self {
            url,
            keyword,
            hashtag,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WordFrequency {
    pub word: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelatedSource {
    pub source_name: String,
    pub source_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub article_id: String,
    pub title: String,
    pub hyperlink: String,
    pub content: String,
    pub word_cloud: Vec<WordFrequency>,
    pub related_articles: Vec<RelatedSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceReliability {
    pub source_score: u32,
    pub source_name: String,
    pub source_url: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LanguageTimePoint {
    pub date: String,
    pub related_articles: u32,
    pub propaganda_score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LanguageScore {
    pub language_score: u32,
    pub article_text: String,
    pub propaganda_language_detected: String,
    pub topic: String,
    pub propaganda_techniques: BTreeMap<String, u32>,
    pub time_series_data: Vec<LanguageTimePoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoordinationStatistics {
    pub tweets: u32,
    pub sharing_users: u32,
    pub total_likes: u32,
    pub reach: u32,
    pub coordinated_users_percent: u32,
    pub users_shared_in_coordination_otherwise_percent: u32,
    pub urls_shared_in_coordination_percent: u32,
    pub likelihood_coordination_past_behavior: u32,
    pub likelihood_exact_users_coordination: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TweetCount {
    pub date: String,
    pub tweet_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HashtagCount {
    pub hashtag: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRetweets {
    pub username: String,
    pub retweets: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LanguageCount {
    pub language: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnotationCount {
    pub annotation: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NetworkGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl NetworkGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoordinationScore {
    pub coordination_score: u32,
    pub statistics: CoordinationStatistics,
    pub tweet_timeline: Vec<TweetCount>,
    pub top_hashtags: Vec<HashtagCount>,
    pub top_users: Vec<UserRetweets>,
    pub top_languages: Vec<LanguageCount>,
    pub top_annotations: Vec<AnnotationCount>,
    pub network_data: NetworkGraph,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SharingTimeBucket {
    pub time_seconds: u32,
    pub share_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuspiciousAccount {
    pub username: String,
    pub coordinated_sharing_within_5s: u32,
    pub average_sharing_time: u32,
    pub botometer_score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BotActivity {
    pub bot_score: u32,
    pub sharing_time_distribution: Vec<SharingTimeBucket>,
    pub suspicious_accounts: Vec<SuspiciousAccount>,
    pub fast_sharing_communities: NetworkGraph,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreMetric {
    pub source_score: u32,
    pub language_score: u32,
    pub coordination_score: u32,
    pub bot_activity_score: u32,
    pub average_score: u32,
}

impl ScoreMetric {
    /// Integer mean of the four component scores
    pub fn from_components(source: u32, language: u32, coordination: u32, bot: u32) -> Self {
        Self {
            source_score: source,
            language_score: language,
            coordination_score: coordination,
            bot_activity_score: bot,
            average_score: (source + language + coordination + bot) / 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardData {
    pub article: Article,
    pub source_reliability: SourceReliability,
    pub language_score: LanguageScore,
    pub coordination_score: CoordinationScore,
    pub bot_activity: BotActivity,
    pub score_metric: ScoreMetric,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendingTopic {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub engagement: u32,
    pub source_count: u32,
    pub recent_urls: Vec<String>,
}

/// Words longer than one character, counted in first-appearance order
pub fn word_cloud(content: &str) -> Vec<WordFrequency> {
    let mut cloud: Vec<WordFrequency> = Vec::new();
    for raw in content.split_whitespace() {
        let word = raw.trim_matches(|c| c == '.' || c == ',').to_lowercase();
        if word.chars().count() <= 1 {
            continue;
        }
        match cloud.iter_mut().find(|w| w.word == word) {
            Some(entry) => entry.count += 1,
            None => cloud.push(WordFrequency { word, count: 1 }),
        }
    }
    cloud
}
