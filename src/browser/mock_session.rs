use super::cookies::StoredCookie;
use super::session::{BrowserPage, BrowserSession, SessionLauncher, SessionProfile};
use crate::core::text::page_text;
use crate::{ScraperError, ScraperResult};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use scraper::{Html, Selector};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone, Default)]
pub struct MockPageResponse {
    pub html: String,
    pub delay: Option<Duration>,
    pub fail: bool,
}

#[derive(Default)]
struct MockState {
    routes: RwLock<Vec<(String, MockPageResponse)>>,
    cookies: Mutex<Vec<StoredCookie>>,
    navigations: Mutex<Vec<String>>,
    open_pages: AtomicUsize,
    max_open_pages: AtomicUsize,
    close_count: AtomicUsize,
}

impl MockState {
    /// Longest registered prefix of `url` wins.
    fn route(&self, url: &str) -> Option<MockPageResponse> {
        self.routes
            .read()
            .iter()
            .filter(|(prefix, _)| url.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, response)| response.clone())
    }
}

/// Scripted in-memory browser used by the test suite.
#[derive(Clone, Default)]
pub struct MockSession {
    state: Arc<MockState>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, url_prefix: &str, response: MockPageResponse) -> Self {
        self.state
            .routes
            .write()
            .push((url_prefix.to_string(), response));
        self
    }

    pub fn with_page(self, url_prefix: &str, html: &str) -> Self {
        self.with_response(
            url_prefix,
            MockPageResponse {
                html: html.to_string(),
                ..Default::default()
            },
        )
    }

    pub fn with_delayed_page(self, url_prefix: &str, html: &str, delay: Duration) -> Self {
        self.with_response(
            url_prefix,
            MockPageResponse {
                html: html.to_string(),
                delay: Some(delay),
                fail: false,
            },
        )
    }

    pub fn with_failure(self, url_prefix: &str) -> Self {
        self.with_response(
            url_prefix,
            MockPageResponse {
                fail: true,
                ..Default::default()
            },
        )
    }

    pub fn with_cookies(self, cookies: Vec<StoredCookie>) -> Self {
        *self.state.cookies.lock() = cookies;
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.navigations.lock().clone()
    }

    pub fn navigation_count(&self, url_prefix: &str) -> usize {
        self.state
            .navigations
            .lock()
            .iter()
            .filter(|url| url.starts_with(url_prefix))
            .count()
    }

    pub fn open_pages(&self) -> usize {
        self.state.open_pages.load(Ordering::SeqCst)
    }

    pub fn max_open_pages(&self) -> usize {
        self.state.max_open_pages.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.state.close_count.load(Ordering::SeqCst)
    }

    pub fn stored_cookies(&self) -> Vec<StoredCookie> {
        self.state.cookies.lock().clone()
    }
}

#[async_trait]
impl BrowserSession for MockSession {
    async fn new_page(&self) -> ScraperResult<Box<dyn BrowserPage>> {
        let open = self.state.open_pages.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_open_pages.fetch_max(open, Ordering::SeqCst);
        Ok(Box::new(MockPage {
            state: Arc::clone(&self.state),
            current: Mutex::new(None),
            closed: AtomicBool::new(false),
        }))
    }

    async fn cookies(&self) -> ScraperResult<Vec<StoredCookie>> {
        Ok(self.stored_cookies())
    }

    async fn set_cookies(&self, cookies: Vec<StoredCookie>) -> ScraperResult<()> {
        self.state.cookies.lock().extend(cookies);
        Ok(())
    }

    async fn close(&self) -> ScraperResult<()> {
        self.state.close_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct MockPage {
    state: Arc<MockState>,
    current: Mutex<Option<String>>,
    closed: AtomicBool,
}

impl MockPage {
    fn current_html(&self) -> ScraperResult<String> {
        self.current
            .lock()
            .clone()
            .ok_or_else(|| ScraperError::NavigationError("page has no content".to_string()))
    }
}

#[async_trait]
impl BrowserPage for MockPage {
    async fn goto(&self, url: &str, _timeout: Duration) -> ScraperResult<()> {
        self.state.navigations.lock().push(url.to_string());

        let response = self
            .state
            .route(url)
            .ok_or_else(|| ScraperError::NavigationError(format!("no mock route for {}", url)))?;

        if let Some(delay) = response.delay {
            sleep(delay).await;
        }
        if response.fail {
            return Err(ScraperError::NavigationError(format!(
                "mock navigation to {} failed",
                url
            )));
        }

        *self.current.lock() = Some(response.html);
        Ok(())
    }

    async fn wait_for_idle(&self, _timeout: Duration) -> bool {
        true
    }

    async fn auto_scroll(&self) -> ScraperResult<()> {
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> bool {
        let Ok(html) = self.current_html() else {
            return false;
        };
        let Ok(selector) = Selector::parse(selector) else {
            return false;
        };
        let found = Html::parse_document(&html).select(&selector).next().is_some();
        found
    }

    async fn content(&self) -> ScraperResult<String> {
        self.current_html()
    }

    async fn visible_text(&self) -> ScraperResult<String> {
        Ok(page_text(&self.current_html()?))
    }

    async fn close(&self) -> ScraperResult<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.state.open_pages.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

pub struct MockLauncher {
    session: Option<Arc<MockSession>>,
}

impl MockLauncher {
    pub fn new(session: Arc<MockSession>) -> Self {
        Self {
            session: Some(session),
        }
    }

    pub fn failing() -> Self {
        Self { session: None }
    }
}

#[async_trait]
impl SessionLauncher for MockLauncher {
    async fn launch(&self, _profile: &SessionProfile) -> ScraperResult<Arc<dyn BrowserSession>> {
        match &self.session {
            Some(session) => Ok(Arc::clone(session) as Arc<dyn BrowserSession>),
            None => Err(ScraperError::SessionInitError(
                "mock browser refused to launch".to_string(),
            )),
        }
    }
}
