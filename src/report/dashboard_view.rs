//! Terminal dashboard: summary header and prettytable blocks

use prettytable::{Table, row};

use super::Report;

pub fn render_dashboard(report: &Report) -> String {
    let mut out = String::new();
    let pa = &report.propaganda_analysis;

    out.push_str(&format!("=== {} ===\n", report.query_summary));
    out.push_str(&format!(
        "Reliability: {}/100   Bot likelihood: {:.1}%\n\n",
        pa.overall_reliability_score,
        pa.bot_activity_metrics.bot_likelihood_score * 100.0
    ));
    out.push_str(&format!("{}\n\n", report.key_findings));

    let ca = &report.content_analysis;
    let mut metrics = Table::new();
    metrics.add_row(row!["Metric", "Percent"]);
    metrics.add_row(row!["Language", ca.language_percentage]);
    metrics.add_row(row!["Coordination", ca.coordination_percentage]);
    metrics.add_row(row!["Source", ca.source_percentage]);
    metrics.add_row(row!["Bot-like activity", ca.bot_like_activity_percentage]);
    push_block(&mut out, "Content analysis", &metrics);

    if !report.top_sources.is_empty() {
        let mut table = Table::new();
        table.add_row(row!["Domain", "Factual", "Articles", "Engagement"]);
        for s in &report.top_sources {
            table.add_row(row![s.domain, s.factual_rating, s.articles_count, s.engagement]);
        }
        push_block(&mut out, "Top sources", &table);
    }

    if !report.top_hashtags.is_empty() {
        let mut table = Table::new();
        table.add_row(row!["Hashtag", "Engagement %", "Reach", "Sentiment"]);
        for h in &report.top_hashtags {
            table.add_row(row![h.hashtag, h.engagement_rate, h.reach, h.sentiment]);
        }
        push_block(&mut out, "Top hashtags", &table);
    }

    if !report.similar_posts_time_series.is_empty() {
        let mut table = Table::new();
        table.add_row(row!["Date", "Posts"]);
        for p in &report.similar_posts_time_series {
            table.add_row(row![p.date, p.count]);
        }
        push_block(&mut out, "Similar posts over time", &table);
    }

    if !pa.propaganda_techniques.is_empty() {
        let mut table = Table::new();
        table.add_row(row!["Technique", "Frequency", "Severity", "Example"]);
        for t in &pa.propaganda_techniques {
            table.add_row(row![t.technique_name, t.frequency, t.severity, t.example]);
        }
        push_block(&mut out, "Propaganda techniques", &table);
    }

    out
}

fn push_block(out: &mut String, title: &str, table: &Table) {
    out.push_str(title);
    out.push('\n');
    out.push_str(&table.to_string());
    out.push('\n');
}
