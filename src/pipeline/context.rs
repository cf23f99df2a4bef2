//! Per-run input bag plus the append-only record of stage outputs

use serde::{Deserialize, Serialize};

use crate::error::{NewsProbeError, Result};
use crate::keywords::format_keywords_query;

/// What a caller hands the pipeline for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub query: String,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl AnalysisInput {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Run driven by keywords ranked from a Reddit post. The post URL is left
    /// out so scraping stages never fetch reddit.com pages; social lookups
    /// search the keywords instead.
    pub fn from_reddit_keywords(title: impl Into<String>, keywords: Vec<String>) -> Self {
        Self {
            query: title.into(),
            keywords,
            ..Default::default()
        }
    }
}

/// Normalized inputs, fixed once the context exists
#[derive(Debug, Clone, Serialize)]
pub struct PipelineInputs {
    pub query: String,
    pub urls: Vec<String>,
    pub hashtags: Vec<String>,
    pub keywords: Vec<String>,
    /// Query the stages work on; derived from keywords when any are given
    pub effective_query: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageOutput {
    pub stage_id: String,
    pub role: String,
    pub text: String,
}

#[derive(Debug)]
pub struct PipelineContext {
    inputs: PipelineInputs,
    outputs: Vec<StageOutput>,
}

impl PipelineContext {
    /// Validate and normalize a request. An empty query is rejected here,
    /// before any stage can see it.
    pub fn new(input: AnalysisInput) -> Result<Self> {
        let query = input.query.trim().to_string();
        if query.is_empty() {
            return Err(NewsProbeError::input("query must not be empty"));
        }

        let urls = clean_list(input.urls);
        let hashtags = clean_list(input.hashtags);
        let keywords = clean_list(input.keywords);
        let effective_query = if keywords.is_empty() {
            query.clone()
        } else {
            format_keywords_query(&keywords)
        };

        Ok(Self {
            inputs: PipelineInputs {
                query,
                urls,
                hashtags,
                keywords,
                effective_query,
            },
            outputs: Vec::new(),
        })
    }

    pub fn inputs(&self) -> &PipelineInputs {
        &self.inputs
    }

    pub fn outputs(&self) -> &[StageOutput] {
        &self.outputs
    }

    pub(crate) fn append(&mut self, output: StageOutput) {
        self.outputs.push(output);
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_query_rejected() {
        let err = PipelineContext::new(AnalysisInput::new("   ")).unwrap_err();
        assert!(err.is_input());
    }

    #[test]
    fn test_aux_lists_trimmed() {
        let ctx = PipelineContext::new(AnalysisInput {
            query: " election fraud claims ".to_string(),
            urls: vec![" https://a.example ".to_string(), "".to_string()],
            hashtags: vec!["  ".to_string(), "#vote".to_string()],
            keywords: vec![],
        })
        .unwrap();
        assert_eq!(ctx.inputs().query, "election fraud claims");
        assert_eq!(ctx.inputs().urls, vec!["https://a.example"]);
        assert_eq!(ctx.inputs().hashtags, vec!["#vote"]);
        assert_eq!(ctx.inputs().effective_query, "election fraud claims");
        assert!(ctx.outputs().is_empty());
    }

    #[test]
    fn test_reddit_keywords_input_has_no_urls() {
        let input = AnalysisInput::from_reddit_keywords(
            "Ballots dumped",
            vec!["ballots".to_string(), "dumped".to_string()],
        );
        assert!(input.urls.is_empty());
        assert!(input.hashtags.is_empty());
        let ctx = PipelineContext::new(input).unwrap();
        assert_eq!(ctx.inputs().query, "Ballots dumped");
        assert_eq!(
            ctx.inputs().effective_query,
            "News analysis for keywords extracted from Reddit post: ballots, dumped"
        );
    }

    #[test]
    fn test_keywords_replace_effective_query() {
        let ctx = PipelineContext::new(AnalysisInput {
            query: "reddit thread".to_string(),
            keywords: vec!["ballots".to_string(), "audit".to_string()],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(ctx.inputs().query, "reddit thread");
        assert_eq!(
            ctx.inputs().effective_query,
            "News analysis for keywords extracted from Reddit post: ballots, audit"
        );
    }
}
