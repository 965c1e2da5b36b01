use crate::browser::cookies::StoredCookie;
use crate::core::config::ScrapingConfig;
use crate::ScraperResult;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Static browsing-context profile shared by every page of a session.
#[derive(Debug, Clone)]
pub struct SessionProfile {
    pub headless: bool,
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub locale: String,
    pub timezone: String,
    pub accept_language: String,
    pub request_timeout: Duration,
}

impl SessionProfile {
    pub fn from_config(config: &ScrapingConfig) -> Self {
        Self {
            headless: config.headless,
            user_agent: config.user_agent.clone(),
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            locale: config.locale.clone(),
            timezone: config.timezone.clone(),
            accept_language: config.accept_language.clone(),
            request_timeout: config.navigation_timeout(),
        }
    }
}

impl Default for SessionProfile {
    fn default() -> Self {
        Self::from_config(&ScrapingConfig::default())
    }
}

/// One page (tab) inside the shared browsing context.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    async fn goto(&self, url: &str, timeout: Duration) -> ScraperResult<()>;

    /// Waits for the page to settle. Returns `false` on timeout; never fails.
    async fn wait_for_idle(&self, timeout: Duration) -> bool;

    async fn auto_scroll(&self) -> ScraperResult<()>;

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> bool;

    async fn content(&self) -> ScraperResult<String>;

    async fn visible_text(&self) -> ScraperResult<String>;

    async fn close(&self) -> ScraperResult<()>;
}

/// A launched browser with one browsing context.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn new_page(&self) -> ScraperResult<Box<dyn BrowserPage>>;

    async fn cookies(&self) -> ScraperResult<Vec<StoredCookie>>;

    async fn set_cookies(&self, cookies: Vec<StoredCookie>) -> ScraperResult<()>;

    async fn close(&self) -> ScraperResult<()>;
}

#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self, profile: &SessionProfile) -> ScraperResult<Arc<dyn BrowserSession>>;
}
