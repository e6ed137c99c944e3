use async_trait::async_trait;
use std::fmt;
use crate::Result;

#[async_trait]
pub trait CompletionModel: Send + Sync + fmt::Debug {
    /// Returns the name of the model backend
    fn name(&self) -> &str;

    /// Sends a prompt and returns the raw completion text
    async fn complete(&self, prompt: &str) -> Result<String>;
}
