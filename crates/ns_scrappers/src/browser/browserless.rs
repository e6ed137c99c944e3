use std::time::Duration;
use async_trait::async_trait;
use ns_core::{Error, RenderOptions, Renderer, Result};

/// Renders pages through a Browserless instance (`POST /content`), which
/// runs a headless Chrome and returns the DOM after scripts have executed.
pub struct BrowserlessRenderer {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessRenderer {
    pub fn new(base_url: &str, token: Option<&str>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        })
    }

    fn endpoint(&self) -> String {
        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }
        endpoint
    }

    fn body(url: &str, options: &RenderOptions) -> serde_json::Value {
        serde_json::json!({
            "url": url,
            "waitForTimeout": options.settle.as_millis() as u64,
        })
    }
}

#[async_trait]
impl Renderer for BrowserlessRenderer {
    fn name(&self) -> &str {
        "browserless"
    }

    async fn render(&self, url: &str, options: &RenderOptions) -> Result<String> {
        let resp = self
            .client
            .post(self.endpoint())
            .timeout(options.timeout)
            .header("Content-Type", "application/json")
            .json(&Self::body(url, options))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(Error::Browser(format!(
                "Browserless returned status {} for {}: {}",
                status.as_u16(),
                url,
                message
            )));
        }

        Ok(resp.text().await?)
    }
}
