use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell, OwnedMutexGuard};
use tokio::time::{sleep, timeout, Instant};
use url::Url;
use ns_core::{Error, RenderOptions, Renderer, Result};

pub mod browserless;
pub mod http;
pub mod page;

pub use browserless::BrowserlessRenderer;
pub use http::HttpRenderer;
pub use page::{Node, Page};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

type RendererFactory = Box<dyn Fn() -> Result<Arc<dyn Renderer>> + Send + Sync>;

/// One logical browsing session. Pages are returned as snapshots, so several
/// navigations may be in flight at once.
#[derive(Clone)]
pub struct BrowserSession {
    renderer: Arc<dyn Renderer>,
    options: RenderOptions,
}

impl fmt::Debug for BrowserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserSession")
            .field("renderer", &self.renderer.name())
            .field("options", &self.options)
            .finish()
    }
}

impl BrowserSession {
    pub fn new(renderer: Arc<dyn Renderer>, options: RenderOptions) -> Self {
        Self { renderer, options }
    }

    pub async fn navigate(&self, url: &Url) -> Result<Page> {
        self.navigate_with(url, &self.options).await
    }

    /// Renders `url`, giving up once `options.timeout` has elapsed.
    pub async fn navigate_with(&self, url: &Url, options: &RenderOptions) -> Result<Page> {
        let html = timeout(options.timeout, self.renderer.render(url.as_str(), options))
            .await
            .map_err(|_| {
                Error::Timeout(format!("{} did not load within {}s", url, options.timeout.as_secs()))
            })??;
        Ok(Page::new(url.clone(), html))
    }

    /// Renders `url` until an element matching `selector` is present, or
    /// fails with `Error::Timeout` when `wait` runs out.
    pub async fn wait_for(&self, url: &Url, selector: &str, wait: Duration) -> Result<Page> {
        let deadline = Instant::now() + wait;
        let mut attempts = 0u32;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::Timeout(format!(
                    "{:?} did not appear on {} within {}s ({} attempts)",
                    selector,
                    url,
                    wait.as_secs(),
                    attempts
                )));
            }

            let options = RenderOptions {
                timeout: remaining.min(self.options.timeout),
                ..self.options.clone()
            };
            attempts += 1;
            let page = match self.navigate_with(url, &options).await {
                Ok(page) => page,
                Err(e) if e.is_timeout() => continue,
                Err(e) => return Err(e),
            };
            if page.exists(selector)? {
                tracing::debug!("Found {:?} on {} after {} attempts", selector, url, attempts);
                return Ok(page);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            sleep(POLL_INTERVAL.min(remaining)).await;
        }
    }
}

/// Process-wide access to the automation capability. The renderer is built
/// on first use and reused afterwards; sessions are handed out one at a
/// time.
pub struct BrowserHandle {
    factory: RendererFactory,
    renderer: OnceCell<Arc<dyn Renderer>>,
    lock: Arc<Mutex<()>>,
    options: RenderOptions,
}

impl fmt::Debug for BrowserHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserHandle")
            .field("initialized", &self.is_initialized())
            .field("options", &self.options)
            .finish()
    }
}

impl BrowserHandle {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Renderer>> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            renderer: OnceCell::new(),
            lock: Arc::new(Mutex::new(())),
            options: RenderOptions::default(),
        }
    }

    pub fn from_renderer(renderer: Arc<dyn Renderer>) -> Self {
        Self::new(move || Ok(renderer.clone()))
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn is_initialized(&self) -> bool {
        self.renderer.initialized()
    }

    /// Waits for exclusive use of the browser and opens a session. The
    /// session ends when the guard is released or dropped.
    pub async fn acquire(&self) -> Result<SessionGuard> {
        let permit = self.lock.clone().lock_owned().await;
        let renderer = self
            .renderer
            .get_or_try_init(|| async {
                let renderer = (self.factory)()?;
                tracing::info!("🌐 Browser backend ready ({})", renderer.name());
                Ok::<_, Error>(renderer)
            })
            .await?
            .clone();

        tracing::debug!("Browser session acquired");
        Ok(SessionGuard {
            session: BrowserSession::new(renderer, self.options.clone()),
            _permit: permit,
        })
    }
}

/// Exclusive browsing session; releasing it lets the next run in.
pub struct SessionGuard {
    session: BrowserSession,
    _permit: OwnedMutexGuard<()>,
}

impl SessionGuard {
    pub fn release(self) {
        drop(self);
    }
}

impl Deref for SessionGuard {
    type Target = BrowserSession;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        tracing::debug!("Browser session released");
    }
}
