//! Keyword extraction from social posts, used to derive pipeline queries

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::capabilities::RedditPost;

pub const DEFAULT_TOP_N: usize = 25;
/// Keywords folded into a derived query
pub const QUERY_KEYWORDS: usize = 5;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "for", "you", "that", "this", "with", "have", "are", "but", "not", "was",
        "from", "they", "will", "all", "your", "can", "has", "had", "been", "their", "more",
        "which", "when", "what", "about", "would", "there", "one", "just", "like", "some", "out",
        "also", "how", "its", "i", "a", "an", "in", "on", "of", "to", "is", "https", "www", "com",
        "reddit", "edit", "post", "comment", "thread",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Keyword {
    pub text: String,
    pub frequency: usize,
}

/// Rank the words of a post (title, body, top comments) by frequency
pub fn extract_keywords(post: &RedditPost, top_n: usize) -> Vec<Keyword> {
    let mut combined = format!("{} {}", post.title, post.selftext);
    for comment in &post.top_comments {
        combined.push(' ');
        combined.push_str(&comment.body);
    }
    rank_words(&combined, top_n)
}

/// Frequency ranking with ties broken by first appearance
pub fn rank_words(text: &str, top_n: usize) -> Vec<Keyword> {
    let lower = text.to_lowercase();
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, m) in WORD_RE.find_iter(&lower).enumerate() {
        let word = m.as_str();
        if word.chars().count() <= 2 || STOPWORDS.contains(word) {
            continue;
        }
        counts.entry(word).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(top_n)
        .map(|(word, frequency, _)| Keyword {
            text: word.to_string(),
            frequency,
        })
        .collect()
}

/// Query substituted for the user's query when keywords drive a run
pub fn format_keywords_query(keywords: &[String]) -> String {
    let top: Vec<&str> = keywords
        .iter()
        .take(QUERY_KEYWORDS)
        .map(String::as_str)
        .collect();
    format!(
        "News analysis for keywords extracted from Reddit post: {}",
        top.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::social::RedditComment;

    #[test]
    fn test_rank_words_drops_stopwords_and_short_words() {
        let ranked = rank_words("The ballots and the ballots, at a vote. Ballots vote!", 10);
        let words: Vec<&str> = ranked.iter().map(|k| k.text.as_str()).collect();
        assert_eq!(words, vec!["ballots", "vote"]);
        assert_eq!(ranked[0].frequency, 3);
        assert_eq!(ranked[1].frequency, 2);
    }

    #[test]
    fn test_ties_keep_first_appearance_order() {
        let ranked = rank_words("zeta alpha zeta alpha", 10);
        assert_eq!(ranked[0].text, "zeta");
        assert_eq!(ranked[1].text, "alpha");
    }

    #[test]
    fn test_extract_keywords_includes_comments() {
        let post = RedditPost {
            title: "Voting machines".to_string(),
            selftext: "machines flipped votes".to_string(),
            top_comments: vec![RedditComment {
                body: "machines were audited".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let keywords = extract_keywords(&post, 1);
        assert_eq!(keywords.len(), 1);
        assert_eq!(keywords[0].text, "machines");
        assert_eq!(keywords[0].frequency, 3);
    }

    #[test]
    fn test_format_keywords_query_takes_five() {
        let keywords: Vec<String> = ["a1", "b2", "c3", "d4", "e5", "f6"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            format_keywords_query(&keywords),
            "News analysis for keywords extracted from Reddit post: a1, b2, c3, d4, e5"
        );
    }
}
