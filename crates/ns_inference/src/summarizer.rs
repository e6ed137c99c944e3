use std::sync::Arc;
use std::time::Duration;
use futures::stream::{self, StreamExt, TryStreamExt};
use ns_core::{Chunk, ChunkSummary, CompletionModel, Error, FinalPost, Result};
use crate::prompts;

/// Drives the completion service: one call per chunk, then one synthesis
/// call over all chunk summaries. Failures are never retried.
#[derive(Debug, Clone)]
pub struct Summarizer {
    model: Arc<dyn CompletionModel>,
    concurrency: usize,
    timeout: Duration,
}

impl Summarizer {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self {
            model,
            concurrency: 1,
            timeout: Duration::from_secs(90),
        }
    }

    /// Number of chunk summaries requested at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let text = tokio::time::timeout(self.timeout, self.model.complete(prompt))
            .await
            .map_err(|_| {
                Error::Completion(format!(
                    "{} did not answer within {}s",
                    self.model.name(),
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| match e {
                Error::Completion(_) => e,
                other => Error::Completion(other.to_string()),
            })?;

        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Completion(format!("{} returned an empty response", self.model.name())));
        }
        Ok(text.to_string())
    }

    pub async fn summarize_chunk(&self, chunk: &str) -> Result<String> {
        self.complete(&prompts::chunk_prompt(chunk)).await
    }

    /// Summarizes every chunk independently. Results come back in chunk
    /// order regardless of completion order.
    pub async fn summarize_chunks(&self, chunks: &[Chunk]) -> Result<Vec<ChunkSummary>> {
        let total = chunks.len();
        stream::iter(chunks)
            .map(|chunk| async move {
                tracing::info!("🤖 Summarizing chunk {}/{}", chunk.index + 1, total);
                let text = self.summarize_chunk(&chunk.text).await?;
                Ok::<_, Error>(ChunkSummary { chunk_index: chunk.index, text })
            })
            .buffered(self.concurrency)
            .try_collect()
            .await
    }

    pub async fn synthesize_post(&self, summaries: &[String], topic: &str) -> Result<FinalPost> {
        let combined = summaries.join("\n\n");
        tracing::info!("✍️ Synthesizing post from {} summaries", summaries.len());
        let text = self.complete(&prompts::post_prompt(topic, &combined)).await?;
        Ok(FinalPost::new(text))
    }
}
