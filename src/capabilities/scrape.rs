//! Page fetching with a plain HTML-to-text pass

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::{Capability, CapabilityError, CapabilityKind, CapabilityRequest, truncate_chars};

static SCRIPT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());
static STYLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap());
static TITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

pub struct WebScraper {
    client: reqwest::Client,
    max_chars: usize,
}

impl WebScraper {
    pub fn new(client: reqwest::Client, max_chars: usize) -> Self {
        Self { client, max_chars }
    }
}

#[async_trait]
impl Capability for WebScraper {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Scrape
    }

    async fn invoke(&self, request: &CapabilityRequest) -> Result<String, CapabilityError> {
        let url = request.target.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CapabilityError::InvalidTarget {
                kind: CapabilityKind::Scrape,
                target: request.target.clone(),
            });
        }
        debug!("Scraping {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CapabilityError::failed(request, e.to_string()))?;

        if !response.status().is_success() {
            return Err(CapabilityError::failed(
                request,
                format!("HTTP {}", response.status()),
            ));
        }

        let html = response
            .text()
            .await
            .map_err(|e| CapabilityError::failed(request, e.to_string()))?;

        let title = extract_title(&html).unwrap_or_else(|| url.to_string());
        let text = html_to_text(&html);
        Ok(format!(
            "Page: {} <{}>\n{}",
            title,
            url,
            truncate_chars(&text, self.max_chars)
        ))
    }
}

pub fn extract_title(html: &str) -> Option<String> {
    TITLE_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| decode_entities(WS_RE.replace_all(m.as_str(), " ").trim()))
        .filter(|t| !t.is_empty())
}

/// Simple HTML to text conversion
pub fn html_to_text(html: &str) -> String {
    let text = SCRIPT_RE.replace_all(html, "");
    let text = STYLE_RE.replace_all(&text, "");
    let text = text
        .replace("<br>", "\n")
        .replace("<br/>", "\n")
        .replace("<br />", "\n")
        .replace("</p>", "\n\n")
        .replace("</div>", "\n")
        .replace("</li>", "\n");
    let text = TAG_RE.replace_all(&text, " ");
    let text = decode_entities(&text);
    WS_RE.replace_all(&text, " ").trim().to_string()
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
