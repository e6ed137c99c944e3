use std::fmt;
use std::time::Duration;
use url::Url;
use ns_core::{Error, Result, SearchResult};
use crate::browser::{page::parse_selector, BrowserSession, Node, Page};

pub const GOOGLE_SEARCH_URL: &str = "https://www.google.com/search";

/// Structural lookups for the news results listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSelectors {
    pub container: String,
    pub title: String,
    pub link: String,
    pub source: String,
    pub date: String,
    pub snippet: String,
}

impl Default for SearchSelectors {
    fn default() -> Self {
        Self {
            container: "div.SoaBEf".to_string(),
            title: "div.MBeuO".to_string(),
            link: "a".to_string(),
            source: ".NUnG9d span".to_string(),
            date: ".LfVVr".to_string(),
            snippet: ".GI74Re".to_string(),
        }
    }
}

impl SearchSelectors {
    fn validate(&self) -> Result<()> {
        for selector in [&self.container, &self.title, &self.link, &self.source, &self.date, &self.snippet] {
            parse_selector(selector)?;
        }
        Ok(())
    }
}

/// Why a result node was left out of the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingField(&'static str),
    InvalidLink(String),
    Unreadable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingField(field) => write!(f, "missing {}", field),
            SkipReason::InvalidLink(link) => write!(f, "invalid link {}", link),
            SkipReason::Unreadable(reason) => write!(f, "unreadable node: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompleteResult {
    /// Zero-based position of the node in the listing
    pub position: usize,
    pub reason: SkipReason,
}

type FieldResult<T> = std::result::Result<T, SkipReason>;

fn field(node: &Node, selector: &str, name: &'static str) -> FieldResult<Node> {
    node.find_first(selector)
        .map_err(|e| SkipReason::Unreadable(e.to_string()))?
        .ok_or(SkipReason::MissingField(name))
}

fn text_field(node: &Node, selector: &str, name: &'static str) -> FieldResult<String> {
    let text = field(node, selector, name)?.text().trim().to_string();
    if text.is_empty() {
        return Err(SkipReason::MissingField(name));
    }
    Ok(text)
}

/// Resolves result links against the listing page and unwraps `/url?q=`
/// redirects to the article itself.
fn resolve_link(page_url: &Url, href: &str) -> FieldResult<Url> {
    let url = page_url
        .join(href.trim())
        .map_err(|e| SkipReason::InvalidLink(format!("{}: {}", href, e)))?;

    let url = if url.path() == "/url" && url.host_str() == page_url.host_str() {
        let target = url
            .query_pairs()
            .find(|(key, _)| key == "q" || key == "url")
            .and_then(|(_, target)| Url::parse(&target).ok());
        target.unwrap_or(url)
    } else {
        url
    };

    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(SkipReason::InvalidLink(href.to_string())),
    }
}

/// Queries the news vertical sorted by date and turns the listing into
/// structured candidates.
#[derive(Debug, Clone)]
pub struct SearchClient {
    base_url: Url,
    selectors: SearchSelectors,
    wait_timeout: Duration,
}

impl SearchClient {
    pub fn new(selectors: SearchSelectors, wait_timeout: Duration) -> Result<Self> {
        selectors.validate()?;
        Ok(Self {
            base_url: Url::parse(GOOGLE_SEARCH_URL)?,
            selectors,
            wait_timeout,
        })
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// `?q=<topic>&tbm=nws&tbs=sbd:1`: news results, newest first.
    pub fn query_url(&self, topic: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("q", topic.trim())
            .append_pair("tbm", "nws")
            .append_pair("tbs", "sbd:1");
        url
    }

    /// Fails with `Error::SearchUnavailable` when the results container
    /// never shows up; a listing without it cannot be salvaged.
    pub async fn search(&self, session: &BrowserSession, topic: &str) -> Result<Vec<SearchResult>> {
        let url = self.query_url(topic);
        tracing::info!("🔎 Searching news for {:?}", topic);

        let page = session
            .wait_for(&url, &self.selectors.container, self.wait_timeout)
            .await
            .map_err(|e| Error::SearchUnavailable(e.to_string()))?;

        self.parse_results(&page)
    }

    /// Parses every result node in listing order. Nodes missing a required
    /// field are skipped and logged.
    pub fn parse_results(&self, page: &Page) -> Result<Vec<SearchResult>> {
        let nodes = page.find_all(&self.selectors.container)?;
        let mut results = Vec::with_capacity(nodes.len());

        for (position, node) in nodes.iter().enumerate() {
            match self.parse_node(position, page.url(), node) {
                Ok(result) => results.push(result),
                Err(skipped) => {
                    tracing::debug!("Skipping search result #{}: {}", skipped.position + 1, skipped.reason);
                }
            }
        }

        tracing::info!("📰 Parsed {} of {} search results", results.len(), nodes.len());
        Ok(results)
    }

    fn parse_node(
        &self,
        position: usize,
        page_url: &Url,
        node: &Node,
    ) -> std::result::Result<SearchResult, IncompleteResult> {
        self.parse_fields(page_url, node)
            .map_err(|reason| IncompleteResult { position, reason })
    }

    fn parse_fields(&self, page_url: &Url, node: &Node) -> FieldResult<SearchResult> {
        let s = &self.selectors;
        let title = text_field(node, &s.title, "title")?;
        let href = field(node, &s.link, "link")?
            .attribute("href")
            .map(str::to_string)
            .ok_or(SkipReason::MissingField("link"))?;
        let link = resolve_link(page_url, &href)?;
        let source = text_field(node, &s.source, "source")?;
        let date_text = text_field(node, &s.date, "date")?;
        let snippet = text_field(node, &s.snippet, "snippet")?;

        Ok(SearchResult { title, source, date_text, link, snippet })
    }
}
