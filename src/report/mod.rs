//! The structured news analysis report produced by the terminal stage,
//! plus its read-only projections (markdown, terminal dashboard) and persistence.
//!
//! Every list and map field defaults to empty when the model omits it, so a
//! coerced report never has an absent collection. Score ranges are a
//! convention the model is asked to follow; `out_of_range_fields` reports
//! violations without altering the values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use lenient::{de_count, de_text};

pub mod coerce;
pub mod dashboard_view;
pub mod lenient;
pub mod markdown;
pub mod persist;

pub use coerce::{REPORT_SHAPE, coerce_report};
pub use dashboard_view::render_dashboard;
pub use markdown::render_markdown;
pub use persist::{load_report, save_report};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RelatedArticleRepr")]
pub struct RelatedArticle {
    pub title: String,
    pub url: String,
}

/// Accepts `{title, url}` and the single-entry `{"<title>": "<url>"}` form
#[derive(Deserialize)]
#[serde(untagged)]
enum RelatedArticleRepr {
    Explicit { title: String, url: String },
    Legacy(BTreeMap<String, String>),
}

impl TryFrom<RelatedArticleRepr> for RelatedArticle {
    type Error = String;

    fn try_from(repr: RelatedArticleRepr) -> Result<Self, Self::Error> {
        match repr {
            RelatedArticleRepr::Explicit { title, url } => Ok(Self { title, url }),
            RelatedArticleRepr::Legacy(map) => map
                .into_iter()
                .next()
                .map(|(title, url)| Self { title, url })
                .ok_or_else(|| "related article entry is empty".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicCluster {
    #[serde(default, deserialize_with = "de_text")]
    pub topic: String,
    #[serde(default, deserialize_with = "de_count")]
    pub size: u64,
    #[serde(default)]
    pub related_narratives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReliability {
    pub domain: String,
    /// High, Low, Mixed, Mostly Factual
    pub factual_rating: String,
    #[serde(default, deserialize_with = "de_count")]
    pub articles_count: u64,
    #[serde(default, deserialize_with = "de_count")]
    pub engagement: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialMediaMetrics {
    pub hashtag: String,
    /// Percentage
    pub engagement_rate: f64,
    #[serde(default, deserialize_with = "de_count")]
    pub reach: u64,
    /// Positive, Negative, Neutral
    pub sentiment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    #[serde(default, deserialize_with = "de_text")]
    pub date: String,
    #[serde(default, deserialize_with = "de_count")]
    pub count: u64,
}

/// Share count for a site; any further keys the model adds are kept verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FakeNewsShare {
    #[serde(default, deserialize_with = "de_text")]
    pub site: String,
    #[serde(default, deserialize_with = "de_count")]
    pub shares: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentAnalysisMetrics {
    pub language_percentage: f64,
    pub coordination_percentage: f64,
    pub source_percentage: f64,
    pub bot_like_activity_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagandaTechnique {
    pub technique_name: String,
    #[serde(default, deserialize_with = "de_count")]
    pub frequency: u64,
    /// 0-10
    pub severity: f64,
    pub example: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MisinformationIndicator {
    pub indicator_type: String,
    /// 0-1
    pub confidence: f64,
    pub correction: String,
    #[serde(default)]
    pub source_verification: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinationPattern {
    pub pattern_type: String,
    /// 0-1
    pub strength: f64,
    #[serde(default)]
    pub entities_involved: Vec<String>,
    pub timeline: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotActivityMetrics {
    /// 0-1
    pub bot_likelihood_score: f64,
    pub account_creation_patterns: String,
    #[serde(default)]
    pub behavioral_indicators: Vec<String>,
    pub network_analysis: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FakeNewsSite {
    pub domain: String,
    #[serde(default, deserialize_with = "de_count")]
    pub shares: u64,
    #[serde(default, deserialize_with = "de_count")]
    pub engagement: u64,
    #[serde(default, deserialize_with = "de_count")]
    pub known_false_stories: u64,
    #[serde(default)]
    pub verification_failures: Vec<String>,
    #[serde(default)]
    pub deceptive_practices: Vec<String>,
    #[serde(default)]
    pub network_connections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    #[serde(default, deserialize_with = "de_text")]
    pub date: String,
    #[serde(default, deserialize_with = "de_text")]
    pub event: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagandaAnalysis {
    /// 0-100
    pub overall_reliability_score: f64,
    #[serde(default)]
    pub propaganda_techniques: Vec<PropagandaTechnique>,
    #[serde(default)]
    pub misinformation_indicators: Vec<MisinformationIndicator>,
    #[serde(default)]
    pub coordination_patterns: Vec<CoordinationPattern>,
    pub bot_activity_metrics: BotActivityMetrics,
    #[serde(default)]
    pub fake_news_sites: Vec<FakeNewsSite>,
    #[serde(default)]
    pub manipulation_timeline: Vec<TimelineEntry>,
    /// Narrative -> strength in 0-1
    #[serde(default)]
    pub narrative_fingerprint: BTreeMap<String, f64>,
    #[serde(default)]
    pub cross_verification_results: BTreeMap<String, Value>,
    #[serde(default)]
    pub recommended_verification_steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub query_summary: String,
    pub key_findings: String,
    #[serde(default)]
    pub related_articles: Vec<RelatedArticle>,
    /// Terms for a word cloud
    #[serde(default)]
    pub related_words: Vec<String>,
    #[serde(default)]
    pub topic_clusters: Vec<TopicCluster>,
    #[serde(default)]
    pub top_sources: Vec<SourceReliability>,
    #[serde(default)]
    pub top_hashtags: Vec<SocialMediaMetrics>,
    #[serde(default)]
    pub similar_posts_time_series: Vec<TimeSeriesPoint>,
    #[serde(default)]
    pub fake_news_sites: Vec<FakeNewsShare>,
    pub content_analysis: ContentAnalysisMetrics,
    pub propaganda_analysis: PropagandaAnalysis,
    #[serde(default)]
    pub platform_facts: Vec<String>,
    #[serde(default)]
    pub cross_source_facts: Vec<String>,
}

impl Report {
    /// Fields whose value falls outside its documented range, as `path=value`
    pub fn out_of_range_fields(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut check = |path: String, value: f64, max: f64| {
            if !(0.0..=max).contains(&value) {
                out.push(format!("{}={}", path, value));
            }
        };

        let ca = &self.content_analysis;
        check("content_analysis.language_percentage".into(), ca.language_percentage, 100.0);
        check("content_analysis.coordination_percentage".into(), ca.coordination_percentage, 100.0);
        check("content_analysis.source_percentage".into(), ca.source_percentage, 100.0);
        check(
            "content_analysis.bot_like_activity_percentage".into(),
            ca.bot_like_activity_percentage,
            100.0,
        );

        let pa = &self.propaganda_analysis;
        check(
            "propaganda_analysis.overall_reliability_score".into(),
            pa.overall_reliability_score,
            100.0,
        );
        for (i, t) in pa.propaganda_techniques.iter().enumerate() {
            check(format!("propaganda_techniques[{}].severity", i), t.severity, 10.0);
        }
        for (i, m) in pa.misinformation_indicators.iter().enumerate() {
            check(format!("misinformation_indicators[{}].confidence", i), m.confidence, 1.0);
        }
        for (i, c) in pa.coordination_patterns.iter().enumerate() {
            check(format!("coordination_patterns[{}].strength", i), c.strength, 1.0);
        }
        check(
            "bot_activity_metrics.bot_likelihood_score".into(),
            pa.bot_activity_metrics.bot_likelihood_score,
            1.0,
        );
        for (name, strength) in &pa.narrative_fingerprint {
            check(format!("narrative_fingerprint.{}", name), *strength, 1.0);
        }
        out
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A small but fully populated report
    pub fn sample_report() -> Report {
        serde_json::from_value(serde_json::json!({
            "query_summary": "Election fraud claims",
            "key_findings": "Claims trace back to two low-reliability outlets.",
            "related_articles": [
                {"title": "Audit finds no fraud", "url": "https://news.example/audit"},
                {"Fact check: ballots": "https://factcheck.example/ballots"}
            ],
            "related_words": ["ballots", "audit", "fraud"],
            "topic_clusters": [
                {"topic": "Voting machines", "size": 12, "related_narratives": ["rigged", "hacked"]}
            ],
            "top_sources": [
                {"domain": "news.example", "factual_rating": "High", "articles_count": 4, "engagement": 1200}
            ],
            "top_hashtags": [
                {"hashtag": "#stopthesteal", "engagement_rate": 4.5, "reach": 50000, "sentiment": "Negative"}
            ],
            "similar_posts_time_series": [{"date": "2024-11-05", "count": 40}],
            "fake_news_sites": [{"site": "fake.example", "shares": 900, "country": "US"}],
            "content_analysis": {
                "language_percentage": 62.0,
                "coordination_percentage": 35.5,
                "source_percentage": 20.0,
                "bot_like_activity_percentage": 12.0
            },
            "propaganda_analysis": {
                "overall_reliability_score": 38.0,
                "propaganda_techniques": [{
                    "technique_name": "Appeal to fear",
                    "frequency": 7,
                    "severity": 6.5,
                    "example": "They are stealing your vote",
                    "explanation": "Invokes threat to mobilise"
                }],
                "misinformation_indicators": [{
                    "indicator_type": "Missing context",
                    "confidence": 0.82,
                    "correction": "Counts were reconciled",
                    "source_verification": ["ap.example", "reuters.example"]
                }],
                "coordination_patterns": [{
                    "pattern_type": "Identical phrasing",
                    "strength": 0.7,
                    "entities_involved": ["site-a", "site-b"],
                    "timeline": "Within 2 hours"
                }],
                "bot_activity_metrics": {
                    "bot_likelihood_score": 0.41,
                    "account_creation_patterns": "Burst of new accounts",
                    "behavioral_indicators": ["24/7 posting"],
                    "network_analysis": "Dense retweet cluster"
                },
                "fake_news_sites": [{
                    "domain": "fake.example",
                    "shares": 900,
                    "engagement": 3000,
                    "known_false_stories": 14,
                    "verification_failures": ["a", "b", "c"],
                    "deceptive_practices": ["Fake bylines"],
                    "network_connections": ["mirror.example"]
                }],
                "manipulation_timeline": [{"date": "2024-11-04", "event": "First post"}],
                "narrative_fingerprint": {"stolen election": 0.8},
                "cross_verification_results": {"ap.example": "contradicts"},
                "recommended_verification_steps": ["Check official results", "Search fact-checkers"]
            },
            "platform_facts": ["Post was removed"],
            "cross_source_facts": ["Officials certified results"]
        }))
        .expect("fixture parses")
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::sample_report;
    use super::*;

    #[test]
    fn test_legacy_related_article_shape() {
        let report = sample_report();
        assert_eq!(report.related_articles[1].title, "Fact check: ballots");
        assert_eq!(
            report.related_articles[1].url,
            "https://factcheck.example/ballots"
        );
    }

    #[test]
    fn test_extra_keys_are_kept() {
        let report = sample_report();
        assert_eq!(report.fake_news_sites[0].extra["country"], "US");
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["fake_news_sites"][0]["country"], "US");
    }

    #[test]
    fn test_sample_in_range() {
        assert!(sample_report().out_of_range_fields().is_empty());
    }

    #[test]
    fn test_out_of_range_is_reported_not_clamped() {
        let mut report = sample_report();
        report.content_analysis.language_percentage = 140.0;
        report.propaganda_analysis.bot_activity_metrics.bot_likelihood_score = -0.1;
        let bad = report.out_of_range_fields();
        assert_eq!(bad.len(), 2);
        assert!(bad[0].starts_with("content_analysis.language_percentage"));
        assert_eq!(report.content_analysis.language_percentage, 140.0);
    }

    #[test]
    fn test_empty_legacy_article_rejected() {
        let res: Result<RelatedArticle, _> = serde_json::from_str("{}");
        assert!(res.is_err());
    }
}
