//! Where dashboard payloads come from.
//!
//! `RandomDashboardSource` fabricates plausible values; nothing here reads a
//! `Report`. A real analysis backend would implement `DashboardSource` and
//! slot in without touching the HTTP layer.

use chrono::{Duration, Local};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::models::*;

/// Days covered by every generated time series
pub const SERIES_DAYS: i64 = 30;
pub const TRENDING_COUNT: u32 = 6;

pub trait DashboardSource: Send + Sync {
    fn dashboard(&self, article_id: &str) -> DashboardData;

    fn trending(&self) -> Vec<TrendingTopic>;

    /// Identifier for content submitted through `POST /analyze`
    fn new_content_id(&self) -> String;
}

const CONTENT_WORDS: &[&str] = &[
    "news", "government", "health", "crisis", "economy", "policy", "international", "report",
    "analysis", "truth", "data", "election", "climate", "security", "public", "official",
    "statement", "social", "media",
];
const SOURCES: &[&str] = &["NewsMax", "DailyReport", "TruthWatch", "GlobalInsight", "FastFeed"];
const COUNTRIES: &[&str] = &["USA", "UK", "Russia", "China", "Germany", "India"];
const TOPICS: &[&str] = &["Politics", "Health", "Economy", "Environment", "Technology"];
const TECHNIQUES: &[&str] = &[
    "Repetition",
    "Whataboutism",
    "Causal oversimplification",
    "Bandwagon",
    "Flag-Waving",
    "Exaggeration",
    "Appeal to fear",
    "Prejudice",
    "Loaded Language",
    "Name Calling",
];
const HASHTAGS: &[&str] = &["#fakenews", "#truth", "#scandal", "#breaking", "#exposed"];
const USERS: &[&str] = &[
    "@truth_seeker",
    "@news_watcher",
    "@fact_checker",
    "@reality_bytes",
    "@info_warrior",
];
const LANGUAGES: &[&str] = &["English", "Spanish", "Russian", "Chinese", "German"];
const ANNOTATIONS: &[&str] = &["Breaking News", "Analysis", "Opinion", "Investigation", "Report"];

pub struct RandomDashboardSource {
    rng: Mutex<StdRng>,
}

impl Default for RandomDashboardSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomDashboardSource {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Same seed, same sequence of payloads
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut guard = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

impl DashboardSource for RandomDashboardSource {
    fn dashboard(&self, article_id: &str) -> DashboardData {
        self.with_rng(|rng| {
            let source = source_reliability(rng);
            let language = language_score(rng);
            let coordination = coordination_score(rng);
            let bot = bot_activity(rng);
            let score_metric = ScoreMetric::from_components(
                source.source_score,
                language.language_score,
                coordination.coordination_score,
                bot.bot_score,
            );
            DashboardData {
                article: article(rng, article_id),
                source_reliability: source,
                language_score: language,
                coordination_score: coordination,
                bot_activity: bot,
                score_metric,
            }
        })
    }

    fn trending(&self) -> Vec<TrendingTopic> {
        self.with_rng(|rng| {
            (1..=TRENDING_COUNT)
                .map(|id| TrendingTopic {
                    id,
                    title: format!("Trending Topic {}", id),
                    description: format!("This is description for trending topic {}", id),
                    engagement: rng.gen_range(1000..=100_000),
                    source_count: rng.gen_range(5..=100),
                    recent_urls: vec![
                        format!(
                            "https://example{}.com/article{}",
                            rng.gen_range(1..=100),
                            rng.gen_range(1..=1000)
                        ),
                        format!(
                            "https://news{}.com/story{}",
                            rng.gen_range(1..=50),
                            rng.gen_range(1..=500)
                        ),
                    ],
                })
                .collect()
        })
    }

    fn new_content_id(&self) -> String {
        self.with_rng(|rng| rng.gen_range(1000..=9999u32).to_string())
    }
}

fn pick<'a>(rng: &mut StdRng, options: &[&'a str]) -> &'a str {
    options.choose(rng).copied().unwrap_or_default()
}

/// Dates for the last `SERIES_DAYS` days, newest first
fn recent_dates() -> impl Iterator<Item = String> {
    let today = Local::now();
    (0..SERIES_DAYS).map(move |i| (today - Duration::days(i)).format("%Y-%m-%d").to_string())
}

fn article(rng: &mut StdRng, article_id: &str) -> Article {
    let content = (0..50)
        .map(|_| pick(rng, CONTENT_WORDS))
        .collect::<Vec<_>>()
        .join(" ");
    let related_articles = (0..4)
        .map(|_| RelatedSource {
            source_name: format!("{} News", pick(rng, &["Global", "Daily", "Fact"])),
            source_url: format!(
                "https://{}-{}.com",
                pick(rng, &["news", "media", "times"]),
                rng.gen_range(1..=100)
            ),
        })
        .collect();

    Article {
        article_id: article_id.to_string(),
        title: format!("Analysis Report: {}", article_id),
        hyperlink: format!("https://news-site.com/articles/{}", article_id),
        word_cloud: word_cloud(&content),
        content,
        related_articles,
    }
}

fn source_reliability(rng: &mut StdRng) -> SourceReliability {
    SourceReliability {
        source_score: rng.gen_range(1..=100),
        source_name: pick(rng, SOURCES).to_string(),
        source_url: format!("https://www.{}.com", pick(rng, SOURCES).to_lowercase()),
        country: pick(rng, COUNTRIES).to_string(),
    }
}

fn language_score(rng: &mut StdRng) -> LanguageScore {
    let propaganda_techniques: BTreeMap<String, u32> = TECHNIQUES
        .iter()
        .map(|t| (t.to_string(), rng.gen_range(0..=100)))
        .collect();
    let time_series_data = recent_dates()
        .map(|date| LanguageTimePoint {
            date,
            related_articles: rng.gen_range(0..=50),
            propaganda_score: rng.gen_range(0..=100),
        })
        .collect();

    LanguageScore {
        language_score: rng.gen_range(1..=100),
        article_text: "Lorem ipsum dolor sit amet, consectetur adipiscing elit...".to_string(),
        propaganda_language_detected:
            "Use of emotional appeals, fact distortion, and loaded language.".to_string(),
        topic: pick(rng, TOPICS).to_string(),
        propaganda_techniques,
        time_series_data,
    }
}

fn random_graph(rng: &mut StdRng, prefix: &str, nodes: u32, links: usize) -> NetworkGraph {
    NetworkGraph {
        nodes: (0..nodes)
            .map(|i| GraphNode {
                id: format!("{}_{}", prefix, i),
                size: rng.gen_range(1..=10),
            })
            .collect(),
        links: (0..links)
            .map(|_| GraphLink {
                source: format!("{}_{}", prefix, rng.gen_range(0..nodes)),
                target: format!("{}_{}", prefix, rng.gen_range(0..nodes)),
            })
            .collect(),
    }
}

fn coordination_score(rng: &mut StdRng) -> CoordinationScore {
    let statistics = CoordinationStatistics {
        tweets: rng.gen_range(100..=10_000),
        sharing_users: rng.gen_range(50..=5000),
        total_likes: rng.gen_range(500..=50_000),
        reach: rng.gen_range(10_000..=1_000_000),
        coordinated_users_percent: rng.gen_range(5..=70),
        users_shared_in_coordination_otherwise_percent: rng.gen_range(5..=50),
        urls_shared_in_coordination_percent: rng.gen_range(5..=80),
        likelihood_coordination_past_behavior: rng.gen_range(5..=95),
        likelihood_exact_users_coordination: rng.gen_range(5..=95),
    };

    CoordinationScore {
        coordination_score: rng.gen_range(1..=100),
        statistics,
        tweet_timeline: recent_dates()
            .map(|date| TweetCount {
                date,
                tweet_count: rng.gen_range(0..=200),
            })
            .collect(),
        top_hashtags: HASHTAGS
            .iter()
            .map(|h| HashtagCount {
                hashtag: h.to_string(),
                count: rng.gen_range(50..=500),
            })
            .collect(),
        top_users: USERS
            .iter()
            .map(|u| UserRetweets {
                username: u.to_string(),
                retweets: rng.gen_range(10..=100),
            })
            .collect(),
        top_languages: LANGUAGES
            .iter()
            .map(|l| LanguageCount {
                language: l.to_string(),
                count: rng.gen_range(10..=1000),
            })
            .collect(),
        top_annotations: ANNOTATIONS
            .iter()
            .map(|a| AnnotationCount {
                annotation: a.to_string(),
                count: rng.gen_range(5..=50),
            })
            .collect(),
        network_data: random_graph(rng, "user", 20, 30),
    }
}

fn bot_activity(rng: &mut StdRng) -> BotActivity {
    let bot_score = rng.gen_range(0..=100);
    if bot_score == 0 {
        return BotActivity {
            bot_score,
            sharing_time_distribution: Vec::new(),
            suspicious_accounts: Vec::new(),
            fast_sharing_communities: NetworkGraph::default(),
        };
    }

    let accounts = rng.gen_range(1..=5);
    BotActivity {
        bot_score,
        sharing_time_distribution: (0..10)
            .map(|i| SharingTimeBucket {
                time_seconds: i * 5,
                share_count: rng.gen_range(0..=100),
            })
            .collect(),
        suspicious_accounts: (1..=accounts)
            .map(|i| SuspiciousAccount {
                username: format!("bot_network_{}", i),
                coordinated_sharing_within_5s: rng.gen_range(5..=50),
                average_sharing_time: rng.gen_range(1..=20),
                botometer_score: rng.gen_range(1..=100),
            })
            .collect(),
        fast_sharing_communities: random_graph(rng, "bot", 10, 15),
    }
}
