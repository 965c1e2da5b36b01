use super::cookies::StoredCookie;
use super::session::{BrowserPage, BrowserSession, SessionLauncher, SessionProfile};
use crate::core::text::page_text;
use crate::{ScraperError, ScraperResult};
use async_trait::async_trait;
use log::debug;
use parking_lot::Mutex;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{header, Client, ClientBuilder};
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum HttpSessionError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] header::InvalidHeaderValue),
}

impl From<HttpSessionError> for ScraperError {
    fn from(err: HttpSessionError) -> Self {
        ScraperError::SessionInitError(err.to_string())
    }
}

/// Plain-HTTP session for sites that serve listings without JavaScript.
///
/// Pages hold the last fetched document; scrolling and settling are no-ops.
#[derive(Clone)]
pub struct HttpSession {
    client: Client,
    jar: Arc<Jar>,
    origins: Arc<Mutex<BTreeSet<String>>>,
}

impl HttpSession {
    pub fn new(profile: &SessionProfile) -> Result<Self, HttpSessionError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_str(&profile.accept_language)?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );

        let jar = Arc::new(Jar::default());
        let client = ClientBuilder::new()
            .user_agent(profile.user_agent.as_str())
            .default_headers(headers)
            .cookie_provider(Arc::clone(&jar))
            .timeout(profile.request_timeout)
            .build()?;

        Ok(Self {
            client,
            jar,
            origins: Arc::new(Mutex::new(BTreeSet::new())),
        })
    }

    fn remember_origin(&self, url: &Url) {
        if let Ok(origin) = url.join("/") {
            self.origins.lock().insert(origin.to_string());
        }
    }

    async fn fetch(&self, url: &str, timeout: Duration) -> ScraperResult<String> {
        let url = Url::parse(url)?;
        self.remember_origin(&url);

        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        debug!("GET {} -> {}", url, status.as_u16());
        if !status.is_success() {
            return Err(ScraperError::NavigationError(format!(
                "{} returned status {}",
                url,
                status.as_u16()
            )));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl BrowserSession for HttpSession {
    async fn new_page(&self) -> ScraperResult<Box<dyn BrowserPage>> {
        Ok(Box::new(HttpPage {
            session: self.clone(),
            document: Mutex::new(None),
        }))
    }

    async fn cookies(&self) -> ScraperResult<Vec<StoredCookie>> {
        let origins: Vec<String> = self.origins.lock().iter().cloned().collect();
        let mut cookies = Vec::new();

        for origin in origins {
            let url = Url::parse(&origin)?;
            let Some(header) = self.jar.cookies(&url) else {
                continue;
            };
            let Ok(header) = header.to_str() else {
                continue;
            };
            let domain = url.host_str().unwrap_or_default().to_string();
            cookies.extend(header.split(';').filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                Some(StoredCookie::new(name, value, domain.clone()))
            }));
        }

        Ok(cookies)
    }

    async fn set_cookies(&self, cookies: Vec<StoredCookie>) -> ScraperResult<()> {
        for cookie in cookies {
            let domain = cookie.domain.trim_start_matches('.');
            let url = Url::parse(&format!("https://{}/", domain))?;
            self.jar.add_cookie_str(
                &format!("{}={}; Domain={}; Path={}", cookie.name, cookie.value, domain, cookie.path),
                &url,
            );
        }
        Ok(())
    }

    async fn close(&self) -> ScraperResult<()> {
        Ok(())
    }
}

struct HttpPage {
    session: HttpSession,
    document: Mutex<Option<String>>,
}

impl HttpPage {
    fn current_html(&self) -> ScraperResult<String> {
        self.document
            .lock()
            .clone()
            .ok_or_else(|| ScraperError::NavigationError("page has no content".to_string()))
    }
}

#[async_trait]
impl BrowserPage for HttpPage {
    async fn goto(&self, url: &str, timeout: Duration) -> ScraperResult<()> {
        let body = self.session.fetch(url, timeout).await?;
        *self.document.lock() = Some(body);
        Ok(())
    }

    async fn wait_for_idle(&self, _timeout: Duration) -> bool {
        true
    }

    async fn auto_scroll(&self) -> ScraperResult<()> {
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> bool {
        let (Ok(html), Ok(selector)) = (self.current_html(), Selector::parse(selector)) else {
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
        self.document.lock().take();
        Ok(())
    }
}

pub struct HttpLauncher;

#[async_trait]
impl SessionLauncher for HttpLauncher {
    async fn launch(&self, profile: &SessionProfile) -> ScraperResult<Arc<dyn BrowserSession>> {
        Ok(Arc::new(HttpSession::new(profile)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_regex, headers, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (HttpSession, MockServer) {
        let server = MockServer::start().await;
        let session = HttpSession::new(&SessionProfile::default()).unwrap();
        (session, server)
    }

    #[tokio::test]
    async fn test_goto_and_wait_for_selector() {
        let (session, mock_server) = setup().await;

        Mock::given(method("GET"))
            .and(path("/jobs"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><ul class='results'><li>Job</li></ul></body></html>")
                    .insert_header("content-type", "text/html"),
            )
            .mount(&mock_server)
            .await;

        let page = session.new_page().await.unwrap();
        page.goto(&format!("{}/jobs", mock_server.uri()), Duration::from_secs(5))
            .await
            .unwrap();

        assert!(page.wait_for_selector("ul.results", Duration::from_secs(1)).await);
        assert!(!page.wait_for_selector("#missing", Duration::from_secs(1)).await);
        assert_eq!(page.visible_text().await.unwrap(), "Job");
    }

    #[tokio::test]
    async fn test_error_status_is_navigation_error() {
        let (session, mock_server) = setup().await;

        Mock::given(method("GET"))
            .and(path("/blocked"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
            .mount(&mock_server)
            .await;

        let page = session.new_page().await.unwrap();
        let result = page
            .goto(&format!("{}/blocked", mock_server.uri()), Duration::from_secs(5))
            .await;

        assert!(matches!(result, Err(ScraperError::NavigationError(_))));
        assert!(page.content().await.is_err());
    }

    #[tokio::test]
    async fn test_profile_headers_are_sent() {
        let (session, mock_server) = setup().await;

        // wiremock splits header values on commas before comparing.
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header_regex("user-agent", r"^Mozilla/5\.0 \(Windows NT 10\.0"))
            .and(header_regex("user-agent", r"Chrome/120\.0\.0\.0 Safari/537\.36$"))
            .and(headers("accept-language", vec!["en-IN", "en;q=0.9"]))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;

        let page = session.new_page().await.unwrap();
        page.goto(&mock_server.uri(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(page.content().await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_cookies_exported_per_origin() {
        let (session, mock_server) = setup().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("ok")
                    .insert_header("set-cookie", "session=xyz; Path=/"),
            )
            .mount(&mock_server)
            .await;

        let page = session.new_page().await.unwrap();
        page.goto(&mock_server.uri(), Duration::from_secs(5))
            .await
            .unwrap();

        let cookies = session.cookies().await.unwrap();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "session");
        assert_eq!(cookies[0].value, "xyz");
    }
}
