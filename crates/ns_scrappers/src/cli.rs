use std::sync::Arc;
use std::time::Duration;
use clap::{Args, Subcommand};
use tokio::sync::mpsc;
use url::Url;
use ns_core::{is_recent, PipelineEvent, RenderOptions, Renderer, Result};
use crate::browser::{BrowserHandle, BrowserlessRenderer, HttpRenderer};
use crate::extractor::{ContentExtractor, ExtractorConfig};
use crate::pipeline::{Pipeline, PipelineConfig, RunOutcome};
use crate::search::{SearchClient, SearchSelectors};

/// Where pages get rendered.
#[derive(Args, Debug, Clone)]
pub struct BrowserArgs {
    /// Browserless endpoint used to render pages with a headless Chrome (e.g. http://localhost:3000).
    /// Without it pages are fetched over plain HTTP and scripts are not run.
    #[arg(long, env = "BROWSERLESS_URL")]
    pub browserless_url: Option<String>,
    #[arg(long, env = "BROWSERLESS_TOKEN", hide_env_values = true)]
    pub browserless_token: Option<String>,
    /// Upper bound for loading a single page, in seconds
    #[arg(long, default_value_t = 30)]
    pub render_timeout: u64,
    /// Time given to client-side scripts after load, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub settle_ms: u64,
}

impl BrowserArgs {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            settle: Duration::from_millis(self.settle_ms),
            timeout: Duration::from_secs(self.render_timeout),
        }
    }

    /// Handle whose renderer is only built when a session is first acquired.
    pub fn browser_handle(&self) -> BrowserHandle {
        let args = self.clone();
        let options = self.render_options();
        BrowserHandle::new(move || {
            let renderer: Arc<dyn Renderer> = match &args.browserless_url {
                Some(url) => Arc::new(BrowserlessRenderer::new(
                    url,
                    args.browserless_token.as_deref(),
                    options.timeout,
                )?),
                None => Arc::new(HttpRenderer::new(options.timeout)?),
            };
            Ok(renderer)
        })
        .with_options(self.render_options())
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum NewsCommands {
    /// Search recent coverage of a topic and turn it into a post
    Summarize {
        /// Free-text topic, e.g. "AI regulation"
        topic: String,
        /// Maximum characters per summarization chunk
        #[arg(long, default_value_t = 3000)]
        chunk_width: usize,
        /// Seconds to wait for search results to appear
        #[arg(long, default_value_t = 10)]
        search_timeout: u64,
        /// Pause between article fetches, in milliseconds
        #[arg(long, default_value_t = 1000)]
        politeness_ms: u64,
        /// Articles fetched at once
        #[arg(long, default_value_t = 1)]
        extract_concurrency: usize,
        /// Chunks summarized at once
        #[arg(long, default_value_t = 1)]
        summarize_concurrency: usize,
        /// Print the full run report as JSON instead of the post
        #[arg(long)]
        json: bool,
    },
    /// List the search results for a topic, marking the recent ones
    Search {
        topic: String,
        #[arg(long, default_value_t = 10)]
        search_timeout: u64,
    },
    /// Extract the body text of a single article
    Extract {
        url: Url,
    },
}

fn print_event(event: &PipelineEvent) {
    match event {
        PipelineEvent::Searching { topic } => eprintln!("🔄 Searching news for \"{}\"...", topic),
        PipelineEvent::Found { count } => eprintln!("✅ Found {} articles in total.", count),
        PipelineEvent::Filtered { count } => eprintln!("🕒 {} articles are recent.", count),
        PipelineEvent::Extracting { index, title } => eprintln!("📄 Extracting article {}: {}", index, title),
        PipelineEvent::ExtractionFailed { index, reason, .. } => {
            eprintln!("⚠️ Article {} could not be extracted: {}", index, reason)
        }
        PipelineEvent::Summarizing { chunks } => eprintln!("🧠 Summarizing {} chunks...", chunks),
        PipelineEvent::Synthesizing => eprintln!("✍️ Writing the post..."),
        PipelineEvent::NoRecentCoverage => eprintln!("❌ No recent articles found."),
        PipelineEvent::Done { .. } => eprintln!("📢 Done."),
        PipelineEvent::Aborted { error } => eprintln!("❌ Error occurred: {}", error),
    }
}

fn extractor_config(browser: &BrowserHandle) -> ExtractorConfig {
    ExtractorConfig {
        settle: browser.options().settle,
        timeout: browser.options().timeout,
        ..ExtractorConfig::default()
    }
}

pub async fn handle_command(
    command: NewsCommands,
    browser: Arc<BrowserHandle>,
    inference: ns_inference::Config,
) -> Result<()> {
    match command {
        NewsCommands::Summarize {
            topic,
            chunk_width,
            search_timeout,
            politeness_ms,
            extract_concurrency,
            summarize_concurrency,
            json,
        } => {
            let model = ns_inference::create_model(Some(inference.clone()))?;
            let config = PipelineConfig {
                chunk_width,
                search_timeout: Duration::from_secs(search_timeout),
                politeness_delay: Duration::from_millis(politeness_ms),
                extract_concurrency,
                summarize_concurrency,
                completion_timeout: inference.timeout,
                extractor: extractor_config(&browser),
                ..PipelineConfig::default()
            };

            let (tx, mut rx) = mpsc::unbounded_channel();
            let printer = tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    print_event(&event);
                }
            });

            let pipeline = Pipeline::new(browser, model, config)?.with_events(tx);
            let outcome = pipeline.run(&topic).await;
            drop(pipeline);
            let _ = printer.await;

            let outcome = outcome?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else if let RunOutcome::Post { post, report } = &outcome {
                if !report.failures.is_empty() {
                    eprintln!("⚠️ {} of {} articles could not be extracted", report.failures.len(), report.recent);
                }
                println!("{}", post);
            } else if !outcome.report().failures.is_empty() {
                eprintln!("⚠️ None of the {} recent articles could be read:", outcome.report().recent);
                for failure in &outcome.report().failures {
                    eprintln!("   {} ({})", failure.url, failure.reason);
                }
            }
        }
        NewsCommands::Search { topic, search_timeout } => {
            let client = SearchClient::new(SearchSelectors::default(), Duration::from_secs(search_timeout))?;
            let session = browser.acquire().await?;
            let results = client.search(&session, &topic).await;
            session.release();

            let results = results?;
            println!("Found {} articles", results.len());
            for result in results {
                let marker = if is_recent(&result.date_text) { "🕒" } else { "  " };
                println!("{} {} | {} | {} - {}", marker, result.date_text, result.source, result.title, result.link);
            }
        }
        NewsCommands::Extract { url } => {
            let extractor = ContentExtractor::new(extractor_config(&browser))?;
            let session = browser.acquire().await?;
            let article = extractor.extract(&session, &url).await;
            session.release();

            println!("{}", serde_json::to_string_pretty(&article)?);
        }
    }
    Ok(())
}
