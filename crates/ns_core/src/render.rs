use std::time::Duration;
use async_trait::async_trait;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Extra time given to client-side scripts before the DOM is captured
    pub settle: Duration,
    /// Upper bound for the whole render, network included
    pub timeout: Duration,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
        }
    }
}

#[async_trait]
pub trait Renderer: Send + Sync {
    /// Returns the name of the rendering backend
    fn name(&self) -> &str;

    /// Loads the given URL and returns the rendered HTML document
    async fn render(&self, url: &str, options: &RenderOptions) -> Result<String>;
}
