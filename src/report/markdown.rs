//! Markdown projection of a `Report`. Section order is fixed.

use super::Report;

pub fn render_markdown(report: &Report) -> String {
    let mut md = String::new();

    md.push_str(&format!("# News Analysis Report: {}\n\n", report.query_summary));
    md.push_str("## Key Findings & Summary\n\n");
    md.push_str(&format!("{}\n\n", report.key_findings));

    md.push_str("## Related Articles\n\n");
    for article in &report.related_articles {
        md.push_str(&format!("- [{}]({})\n", article.title, article.url));
    }
    md.push('\n');

    md.push_str("## Related Words\n\n");
    md.push_str("*Wordcloud visualization would show these terms with size relative to frequency:*\n\n");
    md.push_str(&report.related_words.join(", "));
    md.push_str("\n\n");

    md.push_str("## Related Topic Clusters\n\n");
    md.push_str("*Visualization would show bubbles with sizes relative to prevalence:*\n\n");
    for cluster in &report.topic_clusters {
        md.push_str(&format!("- **{}** (Size: {})\n", or_na(&cluster.topic), cluster.size));
        if !cluster.related_narratives.is_empty() {
            md.push_str(&format!(
                "  - Related narratives: {}\n",
                cluster.related_narratives.join(", ")
            ));
        }
    }
    md.push('\n');

    md.push_str("## List of Top Sources\n\n");
    md.push_str("| Domain | Factual | Articles | Engagement |\n");
    md.push_str("|--------|---------|----------|------------|\n");
    for source in &report.top_sources {
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            cell(&source.domain),
            cell(&source.factual_rating),
            source.articles_count,
            source.engagement
        ));
    }
    md.push('\n');

    md.push_str("## Top Hashtags\n\n");
    md.push_str("| Hashtag | Engagement Rate (%) | Reach | Sentiment |\n");
    md.push_str("|---------|---------------------|-------|-----------|\n");
    for tag in &report.top_hashtags {
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            cell(&tag.hashtag),
            decimal(tag.engagement_rate),
            tag.reach,
            cell(&tag.sentiment)
        ));
    }
    md.push('\n');

    md.push_str("## Similar Posts Spread Over Time\n\n");
    md.push_str("*Time series visualization would show:*\n\n");
    for point in &report.similar_posts_time_series {
        md.push_str(&format!("- {}: {} posts\n", point.date, point.count));
    }
    md.push('\n');

    md.push_str("## Most Shared Fake News Sites\n\n");
    md.push_str("*Line chart visualization would show:*\n\n");
    for site in &report.fake_news_sites {
        let name = if site.site.is_empty() { "N/A" } else { site.site.as_str() };
        md.push_str(&format!("- {}: {} shares\n", name, site.shares));
    }
    md.push('\n');

    let ca = &report.content_analysis;
    md.push_str("## Content Analysis Metrics\n\n");
    md.push_str("*Percentage bars visualization would show:*\n\n");
    md.push_str(&format!("- Language: {}%\n", decimal(ca.language_percentage)));
    md.push_str(&format!(
        "- Coordination: {}%\n",
        decimal(ca.coordination_percentage)
    ));
    md.push_str(&format!("- Source: {}%\n", decimal(ca.source_percentage)));
    md.push_str(&format!(
        "- Bot-like activity: {}%\n\n",
        decimal(ca.bot_like_activity_percentage)
    ));

    render_propaganda(report, &mut md);

    md.push_str("## Facts Gathered from Platform\n\n");
    for fact in &report.platform_facts {
        md.push_str(&format!("- {}\n", fact));
    }
    md.push('\n');

    md.push_str("## Facts Gathered from Relevant Sources\n\n");
    for fact in &report.cross_source_facts {
        md.push_str(&format!("- {}\n", fact));
    }

    md
}

fn render_propaganda(report: &Report, md: &mut String) {
    let pa = &report.propaganda_analysis;
    md.push_str("## Propaganda and Misinformation Analysis\n\n");
    md.push_str(&format!(
        "### Overall Reliability Score: {}/100\n\n",
        decimal(pa.overall_reliability_score)
    ));

    md.push_str("### Propaganda Techniques Detected\n\n");
    md.push_str("| Technique | Frequency | Severity (0-10) | Example |\n");
    md.push_str("|-----------|-----------|-----------------|---------|\n");
    for t in &pa.propaganda_techniques {
        md.push_str(&format!(
            "| **{}** | {} | {} | {} |\n",
            cell(&t.technique_name),
            t.frequency,
            decimal(t.severity),
            cell(&t.example)
        ));
    }
    md.push_str("\n*Explanation of techniques:*\n\n");
    for t in &pa.propaganda_techniques {
        md.push_str(&format!("- **{}**: {}\n", t.technique_name, t.explanation));
    }
    md.push('\n');

    md.push_str("### Misinformation Indicators\n\n");
    md.push_str("| Type | Confidence | Correction | Verification Sources |\n");
    md.push_str("|------|------------|------------|----------------------|\n");
    for ind in &pa.misinformation_indicators {
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            cell(&ind.indicator_type),
            percent(ind.confidence),
            cell(&ind.correction),
            cell(&ind.source_verification.join(", "))
        ));
    }
    md.push('\n');

    md.push_str("### Coordination Patterns\n\n");
    for p in &pa.coordination_patterns {
        md.push_str(&format!(
            "**{}** (Strength: {})\n",
            p.pattern_type,
            percent(p.strength)
        ));
        md.push_str(&format!(
            "- Entities involved: {}\n",
            p.entities_involved.join(", ")
        ));
        md.push_str(&format!("- Timeline: {}\n\n", p.timeline));
    }

    let bot = &pa.bot_activity_metrics;
    md.push_str("### Bot Activity Metrics\n\n");
    md.push_str(&format!(
        "**Bot Likelihood Score: {}**\n\n",
        percent(bot.bot_likelihood_score)
    ));
    md.push_str(&format!(
        "Account Creation Patterns: {}\n\n",
        bot.account_creation_patterns
    ));
    md.push_str("Behavioral Indicators:\n");
    for indicator in &bot.behavioral_indicators {
        md.push_str(&format!("- {}\n", indicator));
    }
    md.push_str(&format!("\nNetwork Analysis: {}\n\n", bot.network_analysis));

    md.push_str("### Most Shared Fake News Sites\n\n");
    md.push_str("| Domain | Shares | Engagement | Known False Stories | Verification Failures |\n");
    md.push_str("|--------|--------|------------|---------------------|-----------------------|\n");
    for site in &pa.fake_news_sites {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            cell(&site.domain),
            site.shares,
            site.engagement,
            site.known_false_stories,
            cell(&abbreviate(&site.verification_failures, 2))
        ));
    }
    md.push('\n');

    md.push_str("### Deceptive Practices by Domain\n\n");
    for site in &pa.fake_news_sites {
        md.push_str(&format!("**{}**:\n", site.domain));
        for practice in &site.deceptive_practices {
            md.push_str(&format!("- {}\n", practice));
        }
        md.push('\n');
    }

    md.push_str("### Information Manipulation Timeline\n\n");
    md.push_str("*Timeline showing how information evolved and spread:*\n\n");
    for entry in &pa.manipulation_timeline {
        md.push_str(&format!(
            "- **{}**: {}\n",
            or_na(&entry.date),
            or_na(&entry.event)
        ));
    }
    md.push('\n');

    md.push_str("### Narrative Fingerprint\n\n");
    md.push_str("*Distinctive narrative patterns and their strength:*\n\n");
    for (narrative, strength) in &pa.narrative_fingerprint {
        md.push_str(&format!("- **{}**: {}\n", narrative, percent(*strength)));
    }
    md.push('\n');

    md.push_str("### How to Verify This Information\n\n");
    for (i, step) in pa.recommended_verification_steps.iter().enumerate() {
        md.push_str(&format!("{}. {}\n", i + 1, step));
    }
    md.push('\n');
}

/// 0-1 fraction as a one-decimal percentage
fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Whole numbers keep one decimal (`38.0`), others print as written (`35.5`)
fn decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// First `keep` items, then `...` if more were dropped
fn abbreviate(items: &[String], keep: usize) -> String {
    let mut out = items
        .iter()
        .take(keep)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if items.len() > keep {
        out.push_str(", ...");
    }
    out
}

fn or_na(value: &str) -> &str {
    if value.is_empty() { "N/A" } else { value }
}

/// Pipes and newlines would break a table row
fn cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::sample_report;
    use super::*;

    const SECTIONS: &[&str] = &[
        "# News Analysis Report: Election fraud claims",
        "## Key Findings & Summary",
        "## Related Articles",
        "## Related Words",
        "## Related Topic Clusters",
        "## List of Top Sources",
        "## Top Hashtags",
        "## Similar Posts Spread Over Time",
        "## Most Shared Fake News Sites",
        "## Content Analysis Metrics",
        "## Propaganda and Misinformation Analysis",
        "### Overall Reliability Score: 38.0/100",
        "### Propaganda Techniques Detected",
        "### Misinformation Indicators",
        "### Coordination Patterns",
        "### Bot Activity Metrics",
        "### Deceptive Practices by Domain",
        "### Information Manipulation Timeline",
        "### Narrative Fingerprint",
        "### How to Verify This Information",
        "## Facts Gathered from Platform",
        "## Facts Gathered from Relevant Sources",
    ];

    #[test]
    fn test_sections_in_order() {
        let md = render_markdown(&sample_report());
        let mut cursor = 0;
        for heading in SECTIONS {
            let found = md[cursor..]
                .find(heading)
                .unwrap_or_else(|| panic!("missing or out of order: {}", heading));
            cursor += found + heading.len();
        }
    }

    #[test]
    fn test_fractions_render_as_percent() {
        let md = render_markdown(&sample_report());
        assert!(md.contains("| Missing context | 82.0% |"));
        assert!(md.contains("**Bot Likelihood Score: 41.0%**"));
        assert!(md.contains("- **stolen election**: 80.0%"));
    }

    #[test]
    fn test_scores_keep_a_decimal() {
        let md = render_markdown(&sample_report());
        assert!(md.contains("- Language: 62.0%\n"));
        assert!(md.contains("- Coordination: 35.5%\n"));
        assert!(md.contains("| **Appeal to fear** | 7 | 6.5 |"));
        assert!(md.contains("| #stopthesteal | 4.5 | 50000 | Negative |"));
    }

    #[test]
    fn test_topic_without_name_is_na() {
        let mut report = sample_report();
        report.topic_clusters[0].topic.clear();
        let md = render_markdown(&report);
        assert!(md.contains("- **N/A** (Size: 12)"));
    }

    #[test]
    fn test_verification_failures_abbreviated() {
        let md = render_markdown(&sample_report());
        assert!(md.contains("| fake.example | 900 | 3000 | 14 | a, b, ... |"));
    }

    #[test]
    fn test_legacy_article_rendered_as_link() {
        let md = render_markdown(&sample_report());
        assert!(md.contains("- [Fact check: ballots](https://factcheck.example/ballots)"));
        assert!(md.contains("1. Check official results\n2. Search fact-checkers"));
    }
}
