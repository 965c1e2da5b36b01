use super::cookies::CookieFile;
use super::session::{BrowserPage, BrowserSession, SessionLauncher, SessionProfile};
use crate::stats::StatsTracker;
use crate::{ScraperError, ScraperResult};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Owns the single browser session of a pipeline run.
///
/// Pages handed out by [`PageSession::new_page`] share the context's cookie jar
/// and profile. Closing is idempotent; only the first call releases the browser.
pub struct PageSession {
    backend: Arc<dyn BrowserSession>,
    cookie_file: Option<CookieFile>,
    stats: Arc<StatsTracker>,
    closed: AtomicBool,
}

impl PageSession {
    pub async fn open(
        launcher: &dyn SessionLauncher,
        profile: &SessionProfile,
        cookie_file: Option<CookieFile>,
        stats: Arc<StatsTracker>,
    ) -> ScraperResult<Self> {
        info!(
            "Opening browser session (headless={}, locale={}, timezone={})",
            profile.headless, profile.locale, profile.timezone
        );
        let backend = launcher.launch(profile).await.map_err(|e| match e {
            ScraperError::SessionInitError(_) => e,
            other => ScraperError::SessionInitError(other.to_string()),
        })?;

        Ok(Self {
            backend,
            cookie_file,
            stats,
            closed: AtomicBool::new(false),
        })
    }

    pub fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub async fn new_page(&self) -> ScraperResult<Box<dyn BrowserPage>> {
        if self.is_closed() {
            return Err(ScraperError::NavigationError(
                "browser session already closed".to_string(),
            ));
        }
        let page = self.backend.new_page().await?;
        self.stats.record_page_opened();
        Ok(Box::new(TrackedPage {
            inner: page,
            stats: Arc::clone(&self.stats),
        }))
    }

    /// Restores cookies from the previous run. Failures are logged and ignored.
    pub async fn load_cookies(&self) -> bool {
        let Some(file) = &self.cookie_file else {
            return false;
        };

        let cookies = match file.load() {
            Ok(cookies) => cookies,
            Err(e) => {
                warn!("Could not load cookies from {}: {}", file.path().display(), e);
                return false;
            }
        };

        let count = cookies.len();
        match self.backend.set_cookies(cookies).await {
            Ok(()) => {
                info!("Loaded {} cookies from {}", count, file.path().display());
                true
            }
            Err(e) => {
                warn!("Could not apply stored cookies: {}", e);
                false
            }
        }
    }

    /// Persists the context's cookies. Failures are logged and ignored.
    pub async fn save_cookies(&self) -> bool {
        let Some(file) = &self.cookie_file else {
            return false;
        };

        let cookies = match self.backend.cookies().await {
            Ok(cookies) => cookies,
            Err(e) => {
                warn!("Could not read cookies from browser: {}", e);
                return false;
            }
        };

        match file.save(&cookies) {
            Ok(()) => {
                debug!("Saved {} cookies to {}", cookies.len(), file.path().display());
                true
            }
            Err(e) => {
                warn!("Could not save cookies to {}: {}", file.path().display(), e);
                false
            }
        }
    }

    /// Releases the browser. Returns `true` only for the call that closed it.
    pub async fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            debug!("Browser session already closed");
            return false;
        }
        if let Err(e) = self.backend.close().await {
            warn!("Error while closing browser session: {}", e);
        }
        info!("Browser session closed");
        true
    }
}

/// Records navigation timings for every page of the session.
struct TrackedPage {
    inner: Box<dyn BrowserPage>,
    stats: Arc<StatsTracker>,
}

#[async_trait]
impl BrowserPage for TrackedPage {
    async fn goto(&self, url: &str, timeout: Duration) -> ScraperResult<()> {
        let start_time = Utc::now();
        debug!("Navigating to {}", url);
        let result = self.inner.goto(url, timeout).await;
        self.stats.record_navigation(
            result.is_ok(),
            Utc::now().signed_duration_since(start_time),
        );
        result
    }

    async fn wait_for_idle(&self, timeout: Duration) -> bool {
        self.inner.wait_for_idle(timeout).await
    }

    async fn auto_scroll(&self) -> ScraperResult<()> {
        self.inner.auto_scroll().await
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> bool {
        self.inner.wait_for_selector(selector, timeout).await
    }

    async fn content(&self) -> ScraperResult<String> {
        self.inner.content().await
    }

    async fn visible_text(&self) -> ScraperResult<String> {
        self.inner.visible_text().await
    }

    async fn close(&self) -> ScraperResult<()> {
        self.inner.close().await
    }
}
