//! Turning a model completion into a validated `Report`

use super::Report;

/// Shape shown to the terminal stage so its reply deserializes cleanly
pub const REPORT_SHAPE: &str = r#"{
  "query_summary": "string",
  "key_findings": "string",
  "related_articles": [{"title": "string", "url": "string"}],
  "related_words": ["string"],
  "topic_clusters": [{"topic": "string", "size": 0, "related_narratives": ["string"]}],
  "top_sources": [{"domain": "string", "factual_rating": "High|Low|Mixed|Mostly Factual", "articles_count": 0, "engagement": 0}],
  "top_hashtags": [{"hashtag": "string", "engagement_rate": 0.0, "reach": 0, "sentiment": "Positive|Negative|Neutral"}],
  "similar_posts_time_series": [{"date": "YYYY-MM-DD", "count": 0}],
  "fake_news_sites": [{"site": "string", "shares": 0}],
  "content_analysis": {"language_percentage": 0.0, "coordination_percentage": 0.0, "source_percentage": 0.0, "bot_like_activity_percentage": 0.0},
  "propaganda_analysis": {
    "overall_reliability_score": 0.0,
    "propaganda_techniques": [{"technique_name": "string", "frequency": 0, "severity": 0.0, "example": "string", "explanation": "string"}],
    "misinformation_indicators": [{"indicator_type": "string", "confidence": 0.0, "correction": "string", "source_verification": ["string"]}],
    "coordination_patterns": [{"pattern_type": "string", "strength": 0.0, "entities_involved": ["string"], "timeline": "string"}],
    "bot_activity_metrics": {"bot_likelihood_score": 0.0, "account_creation_patterns": "string", "behavioral_indicators": ["string"], "network_analysis": "string"},
    "fake_news_sites": [{"domain": "string", "shares": 0, "engagement": 0, "known_false_stories": 0, "verification_failures": ["string"], "deceptive_practices": ["string"], "network_connections": ["string"]}],
    "manipulation_timeline": [{"date": "YYYY-MM-DD", "event": "string"}],
    "narrative_fingerprint": {"narrative": 0.0},
    "cross_verification_results": {"source": "string"},
    "recommended_verification_steps": ["string"]
  },
  "platform_facts": ["string"],
  "cross_source_facts": ["string"]
}
Percentages and overall_reliability_score are 0-100, severity is 0-10,
confidence, strength, bot_likelihood_score and narrative strengths are 0-1."#;

/// Coerce free text into a `Report`.
///
/// Tries the whole text, then a fenced code block, then every balanced
/// top-level `{...}` object from last to first. The error names the first
/// serde failure seen so a caller can tell a schema mismatch from no JSON.
pub fn coerce_report(text: &str) -> Result<Report, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("empty output".to_string());
    }

    let mut first_error: Option<String> = None;
    let mut attempt = |candidate: &str| -> Option<Report> {
        match serde_json::from_str::<Report>(candidate) {
            Ok(report) => Some(report),
            Err(e) => {
                first_error.get_or_insert_with(|| e.to_string());
                None
            }
        }
    };

    let mut parsed = attempt(trimmed);
    if parsed.is_none()
        && let Some(fenced) = strip_code_fence(trimmed)
    {
        parsed = attempt(fenced);
    }
    if parsed.is_none() {
        for candidate in extract_json_candidates(trimmed).iter().rev() {
            if let Some(report) = attempt(candidate) {
                parsed = Some(report);
                break;
            }
        }
    }

    let report = parsed.ok_or_else(|| {
        first_error.unwrap_or_else(|| "no JSON object found in output".to_string())
    })?;

    if report.query_summary.trim().is_empty() {
        return Err("query_summary is empty".to_string());
    }
    Ok(report)
}

/// Body of the first ``` fenced block, with an optional language tag removed
fn strip_code_fence(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after = &text[start + 3..];
    let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

/// Balanced top-level objects, skipping braces inside JSON strings
fn extract_json_candidates(text: &str) -> Vec<&str> {
    let mut candidates = Vec::new();
    let mut depth: u32 = 0;
    let mut start: Option<usize> = None;
    let mut in_string = false;
    let mut escape = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            if escape {
                escape = false;
                continue;
            }
            match ch {
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            // Quotes in surrounding prose do not open strings
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(idx);
                }
                depth += 1;
            }
            '}' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0
                        && let Some(s) = start.take()
                    {
                        candidates.push(&text[s..idx + 1]);
                    }
                }
            }
            _ => {}
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::sample_report;
    use super::*;

    fn sample_json() -> String {
        serde_json::to_string_pretty(&sample_report()).unwrap()
    }

    #[test]
    fn test_raw_json() {
        let report = coerce_report(&sample_json()).unwrap();
        assert_eq!(report, sample_report());
    }

    #[test]
    fn test_fenced_json() {
        let text = format!("Here is the report:\n```json\n{}\n```\nDone.", sample_json());
        let report = coerce_report(&text).unwrap();
        assert_eq!(report.query_summary, "Election fraud claims");
    }

    #[test]
    fn test_last_object_in_prose() {
        let text = format!(
            "Draft {{\"note\": \"ignore\"}} and the \"final\" answer: {} thanks",
            sample_json()
        );
        let report = coerce_report(&text).unwrap();
        assert_eq!(report.related_words.len(), 3);
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let text = r#"{
            "query_summary": "q",
            "key_findings": "k",
            "content_analysis": {"language_percentage": 1, "coordination_percentage": 2,
                                 "source_percentage": 3, "bot_like_activity_percentage": 4},
            "propaganda_analysis": {
                "overall_reliability_score": 50,
                "bot_activity_metrics": {"bot_likelihood_score": 0.1,
                    "account_creation_patterns": "", "network_analysis": ""}
            }
        }"#;
        let report = coerce_report(text).unwrap();
        assert!(report.related_articles.is_empty());
        assert!(report.propaganda_analysis.narrative_fingerprint.is_empty());
        let value = serde_json::to_value(&report).unwrap();
        assert!(value["platform_facts"].as_array().unwrap().is_empty());
        assert!(value["propaganda_analysis"]["manipulation_timeline"].is_array());
    }

    #[test]
    fn test_free_text_rejected() {
        let err = coerce_report("The claims appear to be false.").unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn test_missing_required_scalar_rejected() {
        let mut value = serde_json::to_value(sample_report()).unwrap();
        value.as_object_mut().unwrap().remove("key_findings");
        let err = coerce_report(&value.to_string()).unwrap_err();
        assert!(err.contains("key_findings"));
    }

    #[test]
    fn test_empty_summary_rejected() {
        let mut report = sample_report();
        report.query_summary = "  ".to_string();
        let text = serde_json::to_string(&report).unwrap();
        assert_eq!(coerce_report(&text).unwrap_err(), "query_summary is empty");
    }

    #[test]
    fn test_loose_free_form_entries_accepted() {
        let mut value = serde_json::to_value(sample_report()).unwrap();
        value["topic_clusters"] = serde_json::json!([{"size": 3, "related_narratives": ["x"]}]);
        value["top_sources"][0]["articles_count"] = serde_json::json!(5.0);
        value["fake_news_sites"] = serde_json::json!([{"site": "fake.example", "shares": "1.2k"}]);
        value["propaganda_analysis"]["manipulation_timeline"] =
            serde_json::json!([{"date": 2024, "event": "Spike"}]);
        value["propaganda_analysis"]["propaganda_techniques"][0]["frequency"] =
            serde_json::json!("7");

        let report = coerce_report(&value.to_string()).unwrap();
        assert_eq!(report.topic_clusters[0].topic, "");
        assert_eq!(report.topic_clusters[0].size, 3);
        assert_eq!(report.top_sources[0].articles_count, 5);
        assert_eq!(report.fake_news_sites[0].shares, 1200);
        assert_eq!(report.propaganda_analysis.manipulation_timeline[0].date, "2024");
        assert_eq!(report.propaganda_analysis.propaganda_techniques[0].frequency, 7);
    }

    #[test]
    fn test_negative_count_still_rejected() {
        let mut value = serde_json::to_value(sample_report()).unwrap();
        value["top_sources"][0]["engagement"] = serde_json::json!(-4);
        assert!(coerce_report(&value.to_string()).is_err());
    }

    #[test]
    fn test_candidates_skip_braces_in_strings() {
        let found = extract_json_candidates(r#"x {"a": "}{"} y {"b": 1}"#);
        assert_eq!(found, vec![r#"{"a": "}{"}"#, r#"{"b": 1}"#]);
    }
}
