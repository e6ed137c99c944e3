use std::time::Duration;
use async_trait::async_trait;
use tokio::time::sleep;
use ns_core::{Error, RenderOptions, Renderer, Result};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Plain HTTP fetch. Scripts are not executed, so pages that build their
/// body client-side come back thin; use Browserless for those. The settle
/// delay is waited out after each response.
pub struct HttpRenderer {
    client: reqwest::Client,
}

impl HttpRenderer {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::from_builder(reqwest::Client::builder(), timeout)
    }

    fn from_builder(builder: reqwest::ClientBuilder, timeout: Duration) -> Result<Self> {
        let client = builder.timeout(timeout).user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    fn name(&self) -> &str {
        "http"
    }

    async fn render(&self, url: &str, options: &RenderOptions) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .timeout(options.timeout)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Browser(format!("GET {} returned status {}", url, status.as_u16())));
        }

        let html = resp.text().await?;
        if !options.settle.is_zero() {
            sleep(options.settle).await;
        }
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves a single canned response on a local port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 2048];
            let _ = socket.read(&mut request).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        format!("http://{}/story", addr)
    }

    fn renderer() -> HttpRenderer {
        HttpRenderer::from_builder(reqwest::Client::builder().no_proxy(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_render_waits_for_settle() {
        let url = serve_once("200 OK", "<p>ready</p>").await;
        let options = RenderOptions {
            settle: Duration::from_millis(200),
            timeout: Duration::from_secs(5),
        };

        let started = Instant::now();
        let html = renderer().render(&url, &options).await.unwrap();
        assert_eq!(html, "<p>ready</p>");
        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_error_status_is_a_browser_error() {
        let url = serve_once("404 Not Found", "gone").await;
        let options = RenderOptions {
            settle: Duration::ZERO,
            timeout: Duration::from_secs(5),
        };

        let err = renderer().render(&url, &options).await.unwrap_err();
        assert!(matches!(err, Error::Browser(ref message) if message.ends_with("returned status 404")));
    }
}
