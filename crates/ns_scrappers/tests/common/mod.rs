// Shared fakes for the pipeline integration tests: a renderer serving canned
// pages and a completion model answering from a script.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use ns_core::{CompletionModel, Error, RenderOptions, Renderer, Result};
use ns_scrappers::browser::BrowserHandle;
use ns_scrappers::extractor::ExtractorConfig;
use ns_scrappers::pipeline::PipelineConfig;

pub const SEARCH_PREFIX: &str = "https://www.google.com/search";

pub const POST: &str = "🔥 Europe Puts a Clock on AI Compliance

Regulators moved faster than most teams expected this week.

📌 Key Highlights
- Enforcement dates for high-risk systems are now fixed
- Fines scale with global revenue

What does this mean for your roadmap? Share your take below.

#AI #Regulation #EUAIAct #TechPolicy #Compliance #MachineLearning";

#[derive(Clone)]
enum Route {
    Page(String),
    Failure(String),
}

/// Serves canned HTML by URL prefix and records every URL it was asked for.
#[derive(Default)]
pub struct FakeRenderer {
    routes: Vec<(String, Route, Duration)>,
    requests: Mutex<Vec<String>>,
}

impl FakeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, prefix: &str, html: String) -> Self {
        self.routes.push((prefix.to_string(), Route::Page(html), Duration::ZERO));
        self
    }

    pub fn slow_page(mut self, prefix: &str, html: String, delay: Duration) -> Self {
        self.routes.push((prefix.to_string(), Route::Page(html), delay));
        self
    }

    pub fn failure(mut self, prefix: &str, reason: &str) -> Self {
        self.routes.push((prefix.to_string(), Route::Failure(reason.to_string()), Duration::ZERO));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    fn name(&self) -> &str {
        "fake"
    }

    async fn render(&self, url: &str, _options: &RenderOptions) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        let route = self.routes.iter().find(|(prefix, _, _)| url.starts_with(prefix.as_str()));
        match route {
            Some((_, route, delay)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(*delay).await;
                }
                match route {
                    Route::Page(html) => Ok(html.clone()),
                    Route::Failure(reason) => Err(Error::Browser(reason.clone())),
                }
            }
            None => Err(Error::Browser(format!("no route for {}", url))),
        }
    }
}

/// Answers chunk prompts with numbered summaries and the post prompt with
/// `POST`, unless told to fail one of the two steps.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    prompts: Mutex<Vec<String>>,
    fail_summaries: bool,
    fail_post: bool,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_summaries() -> Self {
        Self { fail_summaries: true, ..Self::default() }
    }

    pub fn failing_post() -> Self {
        Self { fail_post: true, ..Self::default() }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let call = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len()
        };

        if prompt.starts_with("Read the following news content") {
            if self.fail_summaries {
                return Err(Error::Completion("503 Service Unavailable".to_string()));
            }
            return Ok(format!("  Summary number {}.\n", call));
        }
        if self.fail_post {
            return Err(Error::Completion("model overloaded".to_string()));
        }
        Ok(POST.to_string())
    }
}

pub fn handle(renderer: Arc<FakeRenderer>) -> Arc<BrowserHandle> {
    Arc::new(BrowserHandle::from_renderer(renderer).with_options(RenderOptions {
        settle: Duration::ZERO,
        timeout: Duration::from_secs(5),
    }))
}

/// No politeness pause or settle time, so runs finish immediately.
pub fn fast_config() -> PipelineConfig {
    PipelineConfig {
        politeness_delay: Duration::ZERO,
        search_timeout: Duration::from_secs(3),
        extractor: ExtractorConfig {
            settle: Duration::ZERO,
            timeout: Duration::from_secs(5),
            ..ExtractorConfig::default()
        },
        ..PipelineConfig::default()
    }
}

pub struct Candidate<'a> {
    pub slug: &'a str,
    pub title: Option<&'a str>,
    pub date: Option<&'a str>,
}

pub fn candidate<'a>(slug: &'a str, title: &'a str, date: &'a str) -> Candidate<'a> {
    Candidate { slug, title: Some(title), date: Some(date) }
}

pub fn article_url(slug: &str) -> String {
    format!("https://news.example/{}", slug)
}

pub fn search_listing(candidates: &[Candidate]) -> String {
    let nodes: String = candidates
        .iter()
        .map(|c| {
            format!(
                r#"<div class="SoaBEf"><div><a href="{href}">
                     {title}
                     <div class="NUnG9d"><span>Wire Service</span></div>
                     <div class="GI74Re">Lawmakers met again on the draft rules.</div>
                     {date}
                   </a></div></div>"#,
                href = article_url(c.slug),
                title = c.title.map(|t| format!(r#"<div class="MBeuO">{}</div>"#, t)).unwrap_or_default(),
                date = c.date.map(|d| format!(r#"<div class="LfVVr"><span>{}</span></div>"#, d)).unwrap_or_default(),
            )
        })
        .collect();
    format!("<html><body><div id=\"rso\">{}</div></body></html>", nodes)
}

/// Roughly `chars` characters of article prose.
pub fn body_text(lead: &str, chars: usize) -> String {
    let sentence = format!("{} said the committee would publish guidance before the summer recess. ", lead);
    sentence.repeat(chars / sentence.len() + 1).trim().to_string()
}

pub fn article_page(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body><nav>Home | World</nav><article><p>{}</p></article></body></html>",
        title, body
    )
}
