//! The six-stage news analysis crew

use crate::capabilities::CapabilityKind::{self, Scrape, Search, Social};
use crate::pipeline::stage::StageSpec;

pub const WEB_CRAWLER: &str = "web_crawler";
pub const CONTENT_ANALYST: &str = "news_content_analyst";
pub const SOCIAL_TRACKER: &str = "social_media_tracker";
pub const VISUALIZATION: &str = "data_visualization";
pub const PROPAGANDA_ANALYST: &str = "propaganda_analyst";
pub const REPORT_GENERATOR: &str = "news_report_generator";

const CRAWLER_TOOLS: &[CapabilityKind] = &[Search, Scrape];
const ANALYST_TOOLS: &[CapabilityKind] = &[Search, Scrape];
const SOCIAL_TOOLS: &[CapabilityKind] = &[Search, Social];
const VISUALIZATION_TOOLS: &[CapabilityKind] = &[Search];
const PROPAGANDA_TOOLS: &[CapabilityKind] = &[Search, Scrape];

const PROPAGANDA_INSTRUCTION: &str = "\
Conduct a comprehensive analysis of news content related to '{query}' for propaganda, \
misinformation, and coordinated inauthentic behavior.

1. IDENTIFY PROPAGANDA TECHNIQUES:
  - Detect specific propaganda techniques (name-calling, bandwagon, testimonial, etc.)
  - Rate severity and provide concrete examples from articles
  - Calculate frequency of each technique across sources

2. ASSESS MISINFORMATION INDICATORS:
  - Fact-check key claims against verified information
  - Identify missing context that changes interpretation
  - Document factual errors with correction sources
  - Evaluate manipulated quotes, images, or statistics

3. DETECT COORDINATION PATTERNS:
  - Identify synchronized publishing or messaging
  - Track identical phrasing across seemingly unrelated sources
  - Analyze cross-platform narrative amplification
  - Map connections between sources spreading similar misinformation

4. MEASURE BOT-LIKE ACTIVITY:
  - Calculate bot likelihood scores for sharing patterns
  - Identify suspicious account behaviors and creation patterns
  - Analyze network spread characteristics typical of inauthentic amplification

5. CATALOG FAKE NEWS SITES:
  - Identify highest-impact fake news domains by engagement metrics
  - Document history of verification failures
  - Detail deceptive practices employed
  - Map network connections to other disinformation sources

6. DEVELOP VERIFICATION GUIDANCE:
  - Create step-by-step verification process for readers
  - Suggest credible alternative sources for verification
  - Provide red flags that indicate potential misinformation

Use the tool results to verify claims against reliable sources. Quantify results where \
possible with specific metrics and confidence scores.";

const PROPAGANDA_OUTPUT: &str = "\
Comprehensive propaganda and misinformation analysis with:
1. Overall reliability score with confidence intervals
2. Cataloged propaganda techniques with examples and frequency metrics
3. Fact-check results with verification sources
4. Coordination pattern analysis with network visualization data
5. Bot activity metrics with detailed behavioral indicators
6. Ranked list of fake news sites with engagement metrics and verification history
7. Timeline showing evolution of misinformation spread
8. Narrative fingerprint showing distinctive patterns across sources
9. Reader guidance for information verification";

/// Stages in execution order; the last one produces the Report
pub fn news_analysis_stages() -> Vec<StageSpec> {
    vec![
        StageSpec {
            id: WEB_CRAWLER,
            role: "Web Crawler",
            goal: "Extract news data for the query",
            backstory: "An expert web crawler specialized in news sites, capable of identifying \
                        reliable sources and extracting relevant articles efficiently.",
            instruction: "Crawl news websites for articles related to: {query}. Identify reliable \
                          and unreliable sources. Extract article URLs, publication dates, and \
                          engagement metrics.",
            expected_output: "A comprehensive dataset of news articles with their sources, \
                              reliability metrics, and engagement statistics.",
            capabilities: CRAWLER_TOOLS,
            structured: false,
        },
        StageSpec {
            id: CONTENT_ANALYST,
            role: "News Content Analyst",
            goal: "Analyze news content in depth",
            backstory: "A seasoned journalist with expertise in fact-checking, source reliability \
                        assessment, and content analysis who can identify credible sources, \
                        biases, and trends in news articles.",
            instruction: "Analyze the content of collected news articles for: {query}. Extract key \
                          findings, related topics, narrative patterns, and assess the factual \
                          nature of the content.",
            expected_output: "Content analysis including key findings, related words for \
                              wordcloud, topic clusters, and fact assessments from multiple \
                              sources.",
            capabilities: ANALYST_TOOLS,
            structured: false,
        },
        StageSpec {
            id: SOCIAL_TRACKER,
            role: "Social Media Tracking Specialist",
            goal: "Track news spread on social media",
            backstory: "A social media expert who specializes in tracking how news spreads across \
                        platforms, identifying trending hashtags, measuring engagement, and \
                        analyzing sentiment related to news topics.",
            instruction: "Track how the news topic '{query}' is spreading on social media. \
                          Identify top hashtags, engagement rates, reach, sentiment, and track \
                          similar posts over time.",
            expected_output: "Social media analysis report with top hashtags, engagement metrics, \
                              sentiment analysis, and temporal spread patterns.",
            capabilities: SOCIAL_TOOLS,
            structured: false,
        },
        StageSpec {
            id: VISUALIZATION,
            role: "News Data Visualization Expert",
            goal: "Create data visualizations from news analysis",
            backstory: "A data visualization specialist who transforms news analysis data into \
                        meaningful visual representations including topic clusters, wordclouds, \
                        time series graphs, and reliability charts.",
            instruction: "Generate data visualization structures for topic clusters, wordclouds, \
                          time series of news spread, and source reliability comparisons.",
            expected_output: "Data structures ready for visualization including topic clusters \
                              with size metrics, temporal data for time series, and comparative \
                              source reliability data.",
            capabilities: VISUALIZATION_TOOLS,
            structured: false,
        },
        StageSpec {
            id: PROPAGANDA_ANALYST,
            role: "Propaganda & Misinformation Analyst",
            goal: "Identify and quantify propaganda, misinformation, and coordinated inauthentic \
                   behavior in news content",
            backstory: "An expert with advanced training in computational propaganda detection, \
                        misinformation analysis, and network forensics. Specialized in \
                        identifying manipulation techniques, assessing credibility signals, \
                        detecting narrative manipulation, and tracing the spread of false \
                        information across media ecosystems. Has experience working with \
                        fact-checking organizations and research institutions on digital media \
                        literacy.",
            instruction: PROPAGANDA_INSTRUCTION,
            expected_output: PROPAGANDA_OUTPUT,
            capabilities: PROPAGANDA_TOOLS,
            structured: false,
        },
        StageSpec {
            id: REPORT_GENERATOR,
            role: "News Report Generator",
            goal: "Compile findings into a comprehensive news analysis report",
            backstory: "A professional report writer specialized in organizing complex news \
                        analysis data into structured, insightful, and actionable reports with \
                        clear visualizations and fact comparisons.",
            instruction: "Generate the final comprehensive news analysis report for '{query}' \
                          integrating all findings.",
            expected_output: "A structured news analysis report summarizing all findings with \
                              clear sections for key insights, source reliability, content \
                              analysis, and fact comparisons.",
            capabilities: &[],
            structured: true,
        },
    ]
}
