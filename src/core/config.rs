use crate::core::job::Source;
use crate::{ScraperError, ScraperResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Browser backend used to drive the listing sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Chromium,
    Http,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraping: ScrapingConfig,
    pub sites: SitesConfig,
    pub locations: LocationsConfig,
    pub user: UserConfig,
}

/// All durations are expressed in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    pub headless: bool,
    pub user_agent: String,
    pub max_jobs_per_site: usize,
    pub delay_between_requests: u64,
    pub max_detail_fetch: usize,
    pub detail_concurrency: usize,
    pub timeout: u64,
    pub settle_timeout: u64,
    pub selector_timeout: u64,
    pub backend: Backend,
    pub cookie_file: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub locale: String,
    pub timezone: String,
    pub accept_language: String,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            headless: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_jobs_per_site: 25,
            delay_between_requests: 1500,
            max_detail_fetch: 20,
            detail_concurrency: 3,
            timeout: 30_000,
            settle_timeout: 10_000,
            selector_timeout: 10_000,
            backend: Backend::default(),
            cookie_file: Some(PathBuf::from("data/cookies.json")),
            output_dir: PathBuf::from("output"),
            viewport_width: 1366,
            viewport_height: 768,
            locale: "en-IN".to_string(),
            timezone: "Asia/Kolkata".to_string(),
            accept_language: "en-IN,en;q=0.9".to_string(),
        }
    }
}

impl ScrapingConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.delay_between_requests)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout)
    }

    pub fn selector_timeout(&self) -> Duration {
        Duration::from_millis(self.selector_timeout)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub enabled: bool,
    pub search_url: String,
}

impl SiteConfig {
    pub fn new(search_url: &str) -> Self {
        Self {
            enabled: true,
            search_url: search_url.to_string(),
        }
    }

    /// Origin of the search URL, used to absolutize relative card links.
    pub fn base_url(&self) -> ScraperResult<Url> {
        let url = Url::parse(&self.search_url)?;
        Ok(url.join("/")?)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            search_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SitesConfig {
    pub linkedin: SiteConfig,
    pub indeed: SiteConfig,
    pub naukri: SiteConfig,
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self {
            linkedin: SiteConfig::new("https://www.linkedin.com/jobs/search/"),
            indeed: SiteConfig::new("https://in.indeed.com/jobs"),
            naukri: SiteConfig::new("https://www.naukri.com/"),
        }
    }
}

impl SitesConfig {
    pub fn get(&self, source: Source) -> &SiteConfig {
        match source {
            Source::LinkedIn => &self.linkedin,
            Source::Indeed => &self.indeed,
            Source::Naukri => &self.naukri,
        }
    }

    pub fn get_mut(&mut self, source: Source) -> &mut SiteConfig {
        match source {
            Source::LinkedIn => &mut self.linkedin,
            Source::Indeed => &mut self.indeed,
            Source::Naukri => &mut self.naukri,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationsConfig {
    pub primary: Vec<String>,
}

impl Default for LocationsConfig {
    fn default() -> Self {
        Self {
            primary: vec!["Delhi".to_string(), "Noida".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub preferred_roles: Vec<String>,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> ScraperResult<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ScraperResult<()> {
        if self.scraping.detail_concurrency == 0 {
            return Err(ScraperError::ConfigError(
                "scraping.detail_concurrency must be at least 1".to_string(),
            ));
        }

        for source in Source::ALL {
            let site = self.sites.get(source);
            if site.enabled {
                site.base_url().map_err(|e| {
                    ScraperError::ConfigError(format!(
                        "sites.{}.search_url '{}' is invalid: {}",
                        source, site.search_url, e
                    ))
                })?;
            }
        }
        Ok(())
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.scraping.backend = backend;
        self
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.scraping.delay_between_requests = delay_ms;
        self
    }

    pub fn with_timeouts(mut self, navigation_ms: u64, settle_ms: u64, selector_ms: u64) -> Self {
        self.scraping.timeout = navigation_ms;
        self.scraping.settle_timeout = settle_ms;
        self.scraping.selector_timeout = selector_ms;
        self
    }

    pub fn with_detail_limits(mut self, max_detail_fetch: usize, detail_concurrency: usize) -> Self {
        self.scraping.max_detail_fetch = max_detail_fetch;
        self.scraping.detail_concurrency = detail_concurrency;
        self
    }

    pub fn with_max_jobs_per_site(mut self, max: usize) -> Self {
        self.scraping.max_jobs_per_site = max;
        self
    }

    pub fn with_cookie_file<P: Into<PathBuf>>(mut self, path: Option<P>) -> Self {
        self.scraping.cookie_file = path.map(Into::into);
        self
    }

    pub fn with_site(mut self, source: Source, enabled: bool, search_url: &str) -> Self {
        let site = self.sites.get_mut(source);
        site.enabled = enabled;
        site.search_url = search_url.to_string();
        self
    }

    pub fn with_locations(mut self, locations: Vec<&str>) -> Self {
        self.locations.primary = locations.into_iter().map(String::from).collect();
        self
    }

    pub fn with_roles(mut self, roles: Vec<&str>) -> Self {
        self.user.preferred_roles = roles.into_iter().map(String::from).collect();
        self
    }
}
