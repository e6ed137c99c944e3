use std::sync::Arc;
use std::time::Duration;
use chrono::{DateTime, Local, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::sleep;
use ns_core::{
    chunk, is_recent, AggregatedDocument, ChunkSummary, CompletionModel, Error, ExtractedArticle,
    ExtractionStatus, FinalPost, PipelineEvent, RecentArticle, Result, SearchResult, Stage,
};
use ns_inference::Summarizer;
use crate::browser::{BrowserHandle, BrowserSession};
use crate::extractor::{ContentExtractor, ExtractorConfig};
use crate::logging::Logger;
use crate::search::{SearchClient, SearchSelectors};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Upper bound, in characters, of one summarization chunk
    pub chunk_width: usize,
    /// How long to wait for the results listing to appear
    pub search_timeout: Duration,
    /// Pause after each article fetch, to go easy on the target sites
    pub politeness_delay: Duration,
    pub extract_concurrency: usize,
    pub summarize_concurrency: usize,
    pub completion_timeout: Duration,
    pub selectors: SearchSelectors,
    pub extractor: ExtractorConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_width: 3000,
            search_timeout: Duration::from_secs(10),
            politeness_delay: Duration::from_secs(1),
            extract_concurrency: 1,
            summarize_concurrency: 1,
            completion_timeout: Duration::from_secs(90),
            selectors: SearchSelectors::default(),
            extractor: ExtractorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionFailure {
    pub url: String,
    pub reason: String,
}

/// What a run saw along the way, including the failures it absorbed.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub topic: String,
    pub found: usize,
    pub recent: usize,
    pub articles: Vec<ExtractedArticle>,
    pub failures: Vec<ExtractionFailure>,
    pub chunks: usize,
    pub chunk_summaries: Vec<ChunkSummary>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunReport {
    fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            found: 0,
            recent: 0,
            articles: Vec::new(),
            failures: Vec::new(),
            chunks: 0,
            chunk_summaries: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn extracted(&self) -> usize {
        self.articles.iter().filter(|a| a.is_ok()).count()
    }

    fn record_articles(&mut self, articles: Vec<ExtractedArticle>) {
        self.failures = articles
            .iter()
            .filter_map(|article| match &article.status {
                ExtractionStatus::Failed(reason) => Some(ExtractionFailure {
                    url: article.url.to_string(),
                    reason: reason.clone(),
                }),
                ExtractionStatus::Ok => None,
            })
            .collect();
        self.articles = articles;
    }

    fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    Post { post: FinalPost, report: RunReport },
    /// Nothing recent was found, or none of the recent articles could be
    /// read; in the latter case `report.failures` says why.
    NoRecentCoverage { report: RunReport },
}

impl RunOutcome {
    pub fn report(&self) -> &RunReport {
        match self {
            RunOutcome::Post { report, .. } | RunOutcome::NoRecentCoverage { report } => report,
        }
    }

    pub fn post(&self) -> Option<&FinalPost> {
        match self {
            RunOutcome::Post { post, .. } => Some(post),
            RunOutcome::NoRecentCoverage { .. } => None,
        }
    }
}

/// Search, filter, extract, chunk, summarize and synthesize, in that order.
pub struct Pipeline {
    browser: Arc<BrowserHandle>,
    search: SearchClient,
    extractor: ContentExtractor,
    summarizer: Summarizer,
    config: PipelineConfig,
    events: Option<UnboundedSender<PipelineEvent>>,
}

impl Pipeline {
    pub fn new(browser: Arc<BrowserHandle>, model: Arc<dyn CompletionModel>, config: PipelineConfig) -> Result<Self> {
        if config.chunk_width == 0 {
            return Err(Error::Config("chunk width must be positive".to_string()));
        }
        let search = SearchClient::new(config.selectors.clone(), config.search_timeout)?;
        let extractor = ContentExtractor::new(config.extractor.clone())?;
        let summarizer = Summarizer::new(model)
            .with_concurrency(config.summarize_concurrency)
            .with_timeout(config.completion_timeout);

        Ok(Self {
            browser,
            search,
            extractor,
            summarizer,
            config,
            events: None,
        })
    }

    pub fn with_events(mut self, events: UnboundedSender<PipelineEvent>) -> Self {
        self.events = Some(events);
        self
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(events) = &self.events {
            // A presentation layer that went away must not stop the run
            let _ = events.send(event);
        }
    }

    /// Runs the whole pipeline for `topic`. The browser session is held for
    /// the duration of the run and released whichever way it ends.
    pub async fn run(&self, topic: &str) -> Result<RunOutcome> {
        let logger = Logger::new().with_prefix(format!("[{}]", topic));

        let result = match self.browser.acquire().await {
            Ok(session) => {
                let result = self.run_with_session(&session, topic, &logger).await;
                session.release();
                result
            }
            Err(e) => Err(Error::aborted(Stage::Searching, e)),
        };

        match &result {
            Ok(RunOutcome::Post { post, .. }) => {
                logger.info("✅ Post ready");
                self.emit(PipelineEvent::Done { post: post.clone() });
            }
            Ok(RunOutcome::NoRecentCoverage { .. }) => {
                logger.warn("❌ No recent articles found");
                self.emit(PipelineEvent::NoRecentCoverage);
            }
            Err(e) => {
                logger.error(&format!("💥 {}", e));
                self.emit(PipelineEvent::Aborted { error: e.to_string() });
            }
        }
        result
    }

    async fn run_with_session(&self, session: &BrowserSession, topic: &str, logger: &Logger) -> Result<RunOutcome> {
        let mut report = RunReport::new(topic);

        logger.debug(&format!("{} -> {}", Stage::Idle, Stage::Searching));
        self.emit(PipelineEvent::Searching { topic: topic.to_string() });
        let results = self
            .search
            .search(session, topic)
            .await
            .map_err(|e| Error::aborted(Stage::Searching, e))?;
        report.found = results.len();
        logger.info(&format!("✅ Found {} articles in total", results.len()));
        self.emit(PipelineEvent::Found { count: results.len() });

        logger.debug(&format!("{} -> {}", Stage::Searching, Stage::Filtering));
        let recent = filter_recent(results);
        report.recent = recent.len();
        logger.info(&format!("🕒 {} articles are recent", recent.len()));
        self.emit(PipelineEvent::Filtered { count: recent.len() });

        if recent.is_empty() {
            logger.debug(&format!("{} -> {}", Stage::Filtering, Stage::Done));
            return Ok(RunOutcome::NoRecentCoverage { report: report.finish() });
        }

        logger.debug(&format!("{} -> {}", Stage::Filtering, Stage::Extracting));
        let searched_at = Local::now();
        report.record_articles(self.extract_all(session, &recent, logger).await);
        if report.extracted() == 0 {
            logger.warn(&format!("None of the {} recent articles could be read", recent.len()));
            logger.debug(&format!("{} -> {}", Stage::Extracting, Stage::Done));
            return Ok(RunOutcome::NoRecentCoverage { report: report.finish() });
        }

        let mut document = AggregatedDocument::new(topic, searched_at);
        for (result, article) in recent.iter().zip(&report.articles) {
            if article.is_ok() {
                document.push_article(result, article);
            }
        }

        logger.debug(&format!("{} -> {}", Stage::Extracting, Stage::Summarizing));
        let chunks = chunk(document.as_str(), self.config.chunk_width);
        report.chunks = chunks.len();
        logger.info(&format!(
            "🧠 Summarizing {} articles in {} chunks using {}",
            document.sections(),
            chunks.len(),
            self.summarizer.model_name()
        ));
        self.emit(PipelineEvent::Summarizing { chunks: chunks.len() });
        let summaries = self
            .summarizer
            .summarize_chunks(&chunks)
            .await
            .map_err(|e| Error::aborted(Stage::Summarizing, e))?;

        logger.debug(&format!("{} -> {}", Stage::Summarizing, Stage::Synthesizing));
        self.emit(PipelineEvent::Synthesizing);
        let texts: Vec<String> = summaries.iter().map(|s| s.text.clone()).collect();
        let post = self
            .summarizer
            .synthesize_post(&texts, topic)
            .await
            .map_err(|e| Error::aborted(Stage::Synthesizing, e))?;
        report.chunk_summaries = summaries;

        logger.debug(&format!("{} -> {}", Stage::Synthesizing, Stage::Done));
        Ok(RunOutcome::Post { post, report: report.finish() })
    }

    /// Extracts every recent article. Results keep the order of `recent`
    /// even when several pages load at once.
    async fn extract_all(&self, session: &BrowserSession, recent: &[RecentArticle], logger: &Logger) -> Vec<ExtractedArticle> {
        let total = recent.len();
        stream::iter(recent.iter().enumerate())
            .map(|(i, candidate)| {
                let logger = logger.clone().with_prefix(format!("[{}/{}]", i + 1, total));
                async move {
                    logger.info(&format!("📄 Extracting {}", candidate.title));
                    self.emit(PipelineEvent::Extracting { index: i + 1, title: candidate.title.clone() });

                    let article = self.extractor.extract(session, &candidate.link).await;
                    if let ExtractionStatus::Failed(reason) = &article.status {
                        logger.warn(&format!("⚠️ Extraction failed: {}", reason));
                        self.emit(PipelineEvent::ExtractionFailed {
                            index: i + 1,
                            url: candidate.link.to_string(),
                            reason: reason.clone(),
                        });
                    } else if article.content.is_empty() {
                        logger.warn("🫥 No readable content");
                    }

                    sleep(self.config.politeness_delay).await;
                    article
                }
            })
            .buffered(self.config.extract_concurrency.max(1))
            .collect()
            .await
    }
}

/// Keeps candidates whose date text reads as recent, in listing order.
pub fn filter_recent(results: Vec<SearchResult>) -> Vec<RecentArticle> {
    results.into_iter().filter(|r| is_recent(&r.date_text)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn result(title: &str, date: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            source: "Wire".to_string(),
            date_text: date.to_string(),
            link: Url::parse(&format!("https://news.example/{}", title)).unwrap(),
            snippet: String::new(),
        }
    }

    #[test]
    fn test_filter_recent_keeps_order() {
        let recent = filter_recent(vec![
            result("a", "5 minutes ago"),
            result("b", "2 days ago"),
            result("c", "today"),
            result("d", "3 hours ago"),
        ]);
        let titles: Vec<_> = recent.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_report_failures() {
        let mut report = RunReport::new("topic");
        let ok = ExtractedArticle {
            title: "t".to_string(),
            content: "c".to_string(),
            url: Url::parse("https://news.example/ok").unwrap(),
            status: ExtractionStatus::Ok,
        };
        let failed = ExtractedArticle::failed(Url::parse("https://news.example/down").unwrap(), "timeout");
        report.record_articles(vec![ok, failed]);

        assert_eq!(report.articles.len(), 2);
        assert_eq!(report.extracted(), 1);
        assert_eq!(
            report.failures,
            vec![ExtractionFailure {
                url: "https://news.example/down".to_string(),
                reason: "timeout".to_string(),
            }]
        );
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let outcome = RunOutcome::NoRecentCoverage { report: RunReport::new("AI") };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "no_recent_coverage");
        assert_eq!(json["report"]["topic"], "AI");
        assert!(outcome.post().is_none());
    }
}
