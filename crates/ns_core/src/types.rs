use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// A single entry of the search listing, before recency filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub source: String,
    /// Relative time as printed by the search surface ("3 hours ago").
    pub date_text: String,
    pub link: Url,
    pub snippet: String,
}

/// A search result that passed the recency filter.
pub type RecentArticle = SearchResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ExtractionStatus {
    Ok,
    Failed(String),
}

impl ExtractionStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, ExtractionStatus::Ok)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedArticle {
    pub title: String,
    pub content: String,
    pub url: Url,
    pub status: ExtractionStatus,
}

impl ExtractedArticle {
    pub fn failed(url: Url, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            title: String::new(),
            content: format!("Failed to extract content: {}", reason),
            url,
            status: ExtractionStatus::Failed(reason),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSummary {
    pub chunk_index: usize,
    pub text: String,
}

/// The synthesized post, exactly as returned by the completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalPost {
    pub text: String,
}

impl FinalPost {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// First non-empty line of the post.
    pub fn title(&self) -> Option<&str> {
        self.text.lines().map(str::trim).find(|line| !line.is_empty())
    }

    pub fn hashtags(&self) -> Vec<&str> {
        self.text
            .split_whitespace()
            .filter(|token| token.len() > 1 && token.starts_with('#') && !token[1..].starts_with('#'))
            .collect()
    }
}

impl fmt::Display for FinalPost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Stages of a single pipeline run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Searching,
    Filtering,
    Extracting,
    Summarizing,
    Synthesizing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Searching => "searching",
            Stage::Filtering => "filtering",
            Stage::Extracting => "extracting",
            Stage::Summarizing => "summarizing",
            Stage::Synthesizing => "synthesizing",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Progress notices emitted while a run advances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    Searching { topic: String },
    Found { count: usize },
    Filtered { count: usize },
    Extracting { index: usize, title: String },
    ExtractionFailed { index: usize, url: String, reason: String },
    Summarizing { chunks: usize },
    Synthesizing,
    NoRecentCoverage,
    Done { post: FinalPost },
    Aborted { error: String },
}
