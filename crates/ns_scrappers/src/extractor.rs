use std::time::Duration;
use url::Url;
use ns_core::{ExtractedArticle, ExtractionStatus, RenderOptions, Result};
use crate::browser::{page::parse_selector, BrowserSession, Page};

/// Content containers tried in order, most specific first.
pub const DEFAULT_CASCADE: &[&str] = &[
    "article",
    ".article-content",
    ".article-body",
    ".story-body",
    ".story-content",
    ".content-body",
    ".entry-content",
    "#content-body",
    ".post-content",
    ".main-content",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    pub cascade: Vec<String>,
    /// A container counts only when its text is longer than this
    pub min_block_chars: usize,
    pub paragraph_selector: String,
    /// A fallback paragraph counts only when its text is longer than this
    pub min_paragraph_chars: usize,
    pub settle: Duration,
    pub timeout: Duration,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            cascade: DEFAULT_CASCADE.iter().map(|s| s.to_string()).collect(),
            min_block_chars: 200,
            paragraph_selector: "p".to_string(),
            min_paragraph_chars: 50,
            settle: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Pulls the main body text out of an article page.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    config: ExtractorConfig,
}

impl ContentExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        for selector in config.cascade.iter().chain(std::iter::once(&config.paragraph_selector)) {
            parse_selector(selector)?;
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Never fails: navigation and access problems come back as
    /// `ExtractionStatus::Failed` with the reason in `content`.
    pub async fn extract(&self, session: &BrowserSession, url: &Url) -> ExtractedArticle {
        let options = RenderOptions {
            settle: self.config.settle,
            timeout: self.config.timeout,
        };

        match session.navigate_with(url, &options).await {
            Ok(page) => self.extract_from_page(&page),
            Err(e) => {
                tracing::warn!("⚠️ Could not load {}: {}", url, e);
                ExtractedArticle::failed(url.clone(), e.to_string())
            }
        }
    }

    pub fn extract_from_page(&self, page: &Page) -> ExtractedArticle {
        match self.content(page) {
            Ok(content) => ExtractedArticle {
                title: page.title(),
                content,
                url: page.url().clone(),
                status: ExtractionStatus::Ok,
            },
            Err(e) => ExtractedArticle::failed(page.url().clone(), e.to_string()),
        }
    }

    /// Body text via the cascade, then the paragraph fallback. An empty
    /// string means nothing qualified, which is not an error here.
    fn content(&self, page: &Page) -> Result<String> {
        if let Some((selector, content)) = self.cascade_content(page)? {
            tracing::debug!("Extracted {} chars from {} via {:?}", content.len(), page.url(), selector);
            return Ok(content);
        }

        let content = self.paragraph_fallback(page)?;
        if content.is_empty() {
            tracing::debug!("No qualifying text on {}", page.url());
        } else {
            tracing::debug!("Extracted {} chars from {} via paragraph fallback", content.len(), page.url());
        }
        Ok(content)
    }

    /// The first selector with at least one long enough element wins; the
    /// rest of the cascade is not consulted.
    fn cascade_content<'a>(&'a self, page: &Page) -> Result<Option<(&'a str, String)>> {
        for selector in &self.config.cascade {
            let blocks = long_texts(page, selector, self.config.min_block_chars)?;
            if !blocks.is_empty() {
                return Ok(Some((selector.as_str(), blocks.join("\n\n"))));
            }
        }
        Ok(None)
    }

    fn paragraph_fallback(&self, page: &Page) -> Result<String> {
        let paragraphs = long_texts(page, &self.config.paragraph_selector, self.config.min_paragraph_chars)?;
        Ok(paragraphs.join("\n\n"))
    }
}

fn long_texts(page: &Page, selector: &str, min_chars: usize) -> Result<Vec<String>> {
    Ok(page
        .find_all(selector)?
        .iter()
        .map(|node| node.text().trim().to_string())
        .filter(|text| text.chars().count() > min_chars)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use async_trait::async_trait;
    use ns_core::{Error, Renderer};

    fn sentence(len: usize) -> String {
        "Lawmakers debated the draft rules again. ".repeat(len / 41 + 1)
    }

    fn page(body: &str) -> Page {
        Page::new(
            Url::parse("https://news.example/story").unwrap(),
            format!("<html><head><title>Story title</title></head><body>{}</body></html>", body),
        )
    }

    fn extractor() -> ContentExtractor {
        ContentExtractor::new(ExtractorConfig::default()).unwrap()
    }

    #[test]
    fn test_specific_selector_wins_over_generic() {
        let specific = sentence(300);
        let generic = sentence(400);
        let page = page(&format!(
            r#"<article><p>{}</p></article><div class="main-content"><p>{}</p></div>"#,
            specific, generic
        ));

        let article = extractor().extract_from_page(&page);
        assert!(article.is_ok());
        assert_eq!(article.title, "Story title");
        assert_eq!(article.content, specific.trim());
    }

    #[test]
    fn test_first_qualifying_selector_collects_all_its_elements() {
        let first = sentence(250);
        let second = sentence(260);
        let page = page(&format!(
            r#"<article>short teaser</article>
               <div class="article-body">{}</div>
               <div class="article-body">{}</div>
               <div class="article-body">tiny</div>"#,
            first, second
        ));

        let article = extractor().extract_from_page(&page);
        assert_eq!(article.content, format!("{}\n\n{}", first.trim(), second.trim()));
    }

    #[test]
    fn test_paragraph_fallback() {
        let long = sentence(60);
        let page = page(&format!("<div><p>{}</p><p>too short</p><p>{}</p></div>", long, long));

        let article = extractor().extract_from_page(&page);
        assert_eq!(article.content, format!("{}\n\n{}", long.trim(), long.trim()));
    }

    #[test]
    fn test_nothing_qualifies_is_ok_and_empty() {
        let article = extractor().extract_from_page(&page("<p>Subscribe now.</p>"));
        assert_eq!(article.status, ExtractionStatus::Ok);
        assert!(article.content.is_empty());
    }

    #[test]
    fn test_thresholds_are_strict() {
        let exactly = "x".repeat(200);
        let article = extractor().extract_from_page(&page(&format!("<article>{}</article>", exactly)));
        // exactly at the threshold does not qualify, and there are no paragraphs to fall back on
        assert!(article.content.is_empty());
    }

    struct FailingRenderer;

    #[async_trait]
    impl Renderer for FailingRenderer {
        fn name(&self) -> &str {
            "failing"
        }

        async fn render(&self, _url: &str, _options: &RenderOptions) -> Result<String> {
            Err(Error::Browser("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_navigation_failure_is_captured() {
        let session = BrowserSession::new(Arc::new(FailingRenderer), RenderOptions::default());
        let url = Url::parse("https://news.example/down").unwrap();

        let article = extractor().extract(&session, &url).await;
        assert_eq!(
            article.status,
            ExtractionStatus::Failed("Browser error: connection refused".to_string())
        );
        assert_eq!(article.url, url);
        assert!(article.content.starts_with("Failed to extract content:"));
    }

    #[test]
    fn test_invalid_cascade_is_rejected() {
        let config = ExtractorConfig {
            cascade: vec!["article".to_string(), "..broken".to_string()],
            ..ExtractorConfig::default()
        };
        assert!(ContentExtractor::new(config).is_err());
    }
}
