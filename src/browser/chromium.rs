use super::cookies::StoredCookie;
use super::session::{BrowserPage, BrowserSession, SessionLauncher, SessionProfile};
use crate::{ScraperError, ScraperResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetLocaleOverrideParams, SetTimezoneOverrideParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::network::{
    CookieParam, Headers, SetExtraHttpHeadersParams, TimeSinceEpoch,
};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::StreamExt;
use log::{debug, info, warn};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};

const SCROLL_STEPS: usize = 5;
const SCROLL_PAUSE: Duration = Duration::from_millis(400);
const SELECTOR_POLL: Duration = Duration::from_millis(250);
const IDLE_QUIET_MS: u64 = 1000;
const IDLE_POLL_MS: u64 = 250;

/// Resolves once the document is complete and no new resources have loaded for
/// `IDLE_QUIET_MS`, or with `ok: false` when `timeout_ms` runs out.
fn network_idle_script(limit: Duration) -> String {
    let timeout_ms = limit.as_millis().min(u128::from(u64::MAX)) as u64;
    format!(
        r#"(async () => {{
            const count = () => {{
                try {{ return performance.getEntriesByType('resource').length; }} catch (_) {{ return 0; }}
            }};
            const start = Date.now();
            let last = count();
            let quiet = 0;
            while (Date.now() - start < {timeout_ms}) {{
                await new Promise(r => setTimeout(r, {poll}));
                const current = count();
                if (document.readyState === 'complete' && current === last) {{
                    quiet += {poll};
                    if (quiet >= {quiet_ms}) {{
                        return {{ ok: true, resources: current, waited: Date.now() - start }};
                    }}
                }} else {{
                    quiet = 0;
                }}
                last = current;
            }}
            return {{ ok: false, resources: last, waited: Date.now() - start }};
        }})()"#,
        timeout_ms = timeout_ms,
        poll = IDLE_POLL_MS,
        quiet_ms = IDLE_QUIET_MS,
    )
}

fn idle_reached(outcome: &serde_json::Value) -> bool {
    outcome.get("ok").and_then(|ok| ok.as_bool()).unwrap_or(false)
}

/// Headless Chromium driven over CDP. One browser process, one context.
pub struct ChromiumSession {
    browser: RwLock<Browser>,
    handler: parking_lot::Mutex<Option<JoinHandle<()>>>,
    profile: SessionProfile,
}

impl ChromiumSession {
    pub async fn launch(profile: &SessionProfile) -> ScraperResult<Self> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(profile.viewport_width, profile.viewport_height)
            .viewport(Some(Viewport {
                width: profile.viewport_width,
                height: profile.viewport_height,
                device_scale_factor: Some(1.0),
                ..Default::default()
            }))
            .request_timeout(profile.request_timeout)
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg(format!("--lang={}", profile.locale));
        if !profile.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(ScraperError::SessionInitError)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScraperError::SessionInitError(format!("failed to launch browser: {}", e)))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler event error: {}", e);
                }
            }
        });

        info!("Chromium launched");
        Ok(Self {
            browser: RwLock::new(browser),
            handler: parking_lot::Mutex::new(Some(handler_task)),
            profile: profile.clone(),
        })
    }

    /// Applies the session profile to a fresh page. Individual overrides are best-effort.
    async fn configure(&self, page: &Page) {
        let mut user_agent = SetUserAgentOverrideParams::new(self.profile.user_agent.clone());
        user_agent.accept_language = Some(self.profile.accept_language.clone());
        if let Err(e) = page.execute(user_agent).await {
            warn!("Could not override user agent: {}", e);
        }

        if let Err(e) = page
            .execute(SetTimezoneOverrideParams::new(self.profile.timezone.clone()))
            .await
        {
            warn!("Could not override timezone: {}", e);
        }

        let locale = SetLocaleOverrideParams {
            locale: Some(self.profile.locale.clone()),
        };
        if let Err(e) = page.execute(locale).await {
            warn!("Could not override locale: {}", e);
        }

        let headers = Headers::new(json!({ "accept-language": self.profile.accept_language }));
        if let Err(e) = page.execute(SetExtraHttpHeadersParams::new(headers)).await {
            warn!("Could not set extra headers: {}", e);
        }
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn new_page(&self) -> ScraperResult<Box<dyn BrowserPage>> {
        let page = self.browser.read().await.new_page("about:blank").await?;
        self.configure(&page).await;
        Ok(Box::new(ChromiumPage { page }))
    }

    async fn cookies(&self) -> ScraperResult<Vec<StoredCookie>> {
        let cookies = self.browser.read().await.get_cookies().await?;
        Ok(cookies
            .into_iter()
            .map(|cookie| StoredCookie {
                name: cookie.name,
                value: cookie.value,
                domain: cookie.domain,
                path: cookie.path,
                expires: (!cookie.session).then_some(cookie.expires),
                http_only: cookie.http_only,
                secure: cookie.secure,
            })
            .collect())
    }

    async fn set_cookies(&self, cookies: Vec<StoredCookie>) -> ScraperResult<()> {
        let params: Vec<CookieParam> = cookies
            .into_iter()
            .map(|cookie| {
                let mut param = CookieParam::new(cookie.name, cookie.value);
                param.domain = Some(cookie.domain);
                param.path = Some(cookie.path);
                param.secure = Some(cookie.secure);
                param.http_only = Some(cookie.http_only);
                param.expires = cookie.expires.map(TimeSinceEpoch::new);
                param
            })
            .collect();

        self.browser.read().await.set_cookies(params).await?;
        Ok(())
    }

    async fn close(&self) -> ScraperResult<()> {
        let mut browser = self.browser.write().await;
        let result = browser.close().await;
        if let Err(e) = browser.wait().await {
            debug!("Browser process did not exit cleanly: {}", e);
        }
        if let Some(task) = self.handler.lock().take() {
            task.abort();
        }
        result?;
        Ok(())
    }
}

struct ChromiumPage {
    page: Page,
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    async fn goto(&self, url: &str, limit: Duration) -> ScraperResult<()> {
        match timeout(limit, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(ScraperError::NavigationError(format!(
                "timed out after {:?} loading {}",
                limit, url
            ))),
        }
    }

    async fn wait_for_idle(&self, limit: Duration) -> bool {
        let script = network_idle_script(limit);
        // The script bounds itself; the outer timeout covers a hung CDP round trip.
        let evaluation = timeout(limit + Duration::from_secs(1), self.page.evaluate(script)).await;
        let outcome = match evaluation {
            Ok(Ok(result)) => result.into_value::<serde_json::Value>().unwrap_or_default(),
            Ok(Err(e)) => {
                debug!("Network idle check failed: {}", e);
                return false;
            }
            Err(_) => return false,
        };
        let settled = idle_reached(&outcome);
        if !settled {
            debug!("Page did not settle within {:?}: {}", limit, outcome);
        }
        settled
    }

    async fn auto_scroll(&self) -> ScraperResult<()> {
        for _ in 0..SCROLL_STEPS {
            self.page
                .evaluate("window.scrollBy(0, window.innerHeight)")
                .await?;
            sleep(SCROLL_PAUSE).await;
        }
        self.page.evaluate("window.scrollTo(0, 0)").await?;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, limit: Duration) -> bool {
        let deadline = Instant::now() + limit;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(SELECTOR_POLL).await;
        }
    }

    async fn content(&self) -> ScraperResult<String> {
        Ok(self.page.content().await?)
    }

    async fn visible_text(&self) -> ScraperResult<String> {
        let result = self
            .page
            .evaluate("document.body ? document.body.innerText : ''")
            .await?;
        Ok(result.into_value::<String>()?)
    }

    async fn close(&self) -> ScraperResult<()> {
        self.page.clone().close().await?;
        Ok(())
    }
}

pub struct ChromiumLauncher;

#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    async fn launch(&self, profile: &SessionProfile) -> ScraperResult<Arc<dyn BrowserSession>> {
        Ok(Arc::new(ChromiumSession::launch(profile).await?))
    }
}
