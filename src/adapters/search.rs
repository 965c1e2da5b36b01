use super::profile::{location_accepted, RawCard, SiteProfile, NOT_AVAILABLE};
use super::AdapterResult;
use crate::browser::{BrowserPage, PageSession};
use crate::core::config::Config;
use crate::core::enrichment::DescriptionEnricher;
use crate::core::job::{JobRecord, Source};
use crate::ScraperResult;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::time::sleep;
use url::Url;

const FALLBACK_QUERIES: [&str; 2] = ["software engineer", "developer"];
const DEFAULT_LOCATION: &str = "India";
const UNKNOWN: &str = "Unknown";

/// Builds a site's search URL from its configured `search_url`, a query and a location.
pub type SearchUrlBuilder = fn(&str, &str, &str) -> ScraperResult<Url>;

/// Ordered queries: the first preferred role, then progressively broader fallbacks.
pub fn search_queries(config: &Config) -> Vec<String> {
    let mut queries: Vec<String> = Vec::new();
    let primary = config
        .user
        .preferred_roles
        .iter()
        .map(|role| role.trim())
        .find(|role| !role.is_empty());

    for query in primary.into_iter().chain(FALLBACK_QUERIES) {
        if !queries.iter().any(|known| known.eq_ignore_ascii_case(query)) {
            queries.push(query.to_string());
        }
    }
    queries
}

pub fn primary_location(config: &Config) -> &str {
    config
        .locations
        .primary
        .iter()
        .map(|location| location.trim())
        .find(|location| !location.is_empty())
        .unwrap_or(DEFAULT_LOCATION)
}

/// Sets query parameters on the configured search URL, replacing any existing
/// values for the same keys and keeping the rest.
pub fn with_query_pairs(search_url: &str, pairs: &[(&str, &str)]) -> ScraperResult<Url> {
    let mut url = Url::parse(search_url)?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !pairs.iter().any(|(name, _)| key == name))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .extend_pairs(pairs.iter().copied());
    Ok(url)
}

/// Resolves a card link against the site's base URL. Unresolvable links become empty.
pub fn normalize_link(link: &str, base_url: &Url) -> String {
    let link = link.trim();
    if link.is_empty() || link == NOT_AVAILABLE {
        return String::new();
    }
    match base_url.join(link) {
        Ok(url) => url.to_string(),
        Err(e) => {
            debug!("Dropping unresolvable link '{}': {}", link, e);
            String::new()
        }
    }
}

fn or_unknown(value: String) -> String {
    if value.trim().is_empty() || value == NOT_AVAILABLE {
        UNKNOWN.to_string()
    } else {
        value
    }
}

/// Search-and-extract run shared by every listing site.
pub struct SiteSearch {
    source: Source,
    config: Arc<Config>,
    profile: &'static SiteProfile,
    build_url: SearchUrlBuilder,
    enricher: DescriptionEnricher,
}

impl SiteSearch {
    pub fn new(
        source: Source,
        config: Arc<Config>,
        profile: &'static SiteProfile,
        build_url: SearchUrlBuilder,
    ) -> Self {
        let enricher = DescriptionEnricher::from_config(&config.scraping);
        Self {
            source,
            config,
            profile,
            build_url,
            enricher,
        }
    }

    pub fn with_enricher(mut self, enricher: DescriptionEnricher) -> Self {
        self.enricher = enricher;
        self
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn is_enabled(&self) -> bool {
        self.config.sites.get(self.source).enabled
    }

    pub fn candidate_urls(&self) -> ScraperResult<Vec<Url>> {
        let search_url = &self.config.sites.get(self.source).search_url;
        let location = primary_location(&self.config);
        search_queries(&self.config)
            .iter()
            .map(|query| (self.build_url)(search_url, query, location))
            .collect()
    }

    pub async fn run(&self, session: &PageSession) -> AdapterResult {
        if !self.is_enabled() {
            debug!("{} is disabled, skipping", self.source);
            return Ok(Vec::new());
        }

        let base_url = self.config.sites.get(self.source).base_url()?;
        let candidates = self.candidate_urls()?;
        let page = session.new_page().await?;

        let mut jobs = Vec::new();
        let outcome = self
            .collect(page.as_ref(), session, &candidates, &base_url, &mut jobs)
            .await;
        if let Err(e) = page.close().await {
            debug!("Failed to close {} results page: {}", self.source, e);
        }
        if let Err(e) = outcome {
            warn!(
                "{} extraction stopped early, keeping {} records: {}",
                self.source,
                jobs.len(),
                e
            );
        }

        if !jobs.is_empty() {
            self.enricher
                .enrich(session, &mut jobs, self.profile.description)
                .await;
        }

        info!("{} produced {} records", self.source, jobs.len());
        Ok(jobs)
    }

    async fn collect(
        &self,
        page: &dyn BrowserPage,
        session: &PageSession,
        candidates: &[Url],
        base_url: &Url,
        jobs: &mut Vec<JobRecord>,
    ) -> ScraperResult<()> {
        if !self.open_results(page, candidates).await {
            warn!(
                "{}: no results container on any of {} search URLs",
                self.source,
                candidates.len()
            );
            return Ok(());
        }

        let html = page.content().await?;
        let cards = self
            .profile
            .extract_cards(&html, self.config.scraping.max_jobs_per_site);
        let seen = cards.len();
        debug!("{}: {} cards on results page", self.source, seen);

        let delay = self.config.scraping.request_delay();
        for (index, card) in cards.into_iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                sleep(delay).await;
            }
            if let Some(record) = self.build_record(card, base_url) {
                jobs.push(record);
            }
        }

        session.stats().record_cards(self.source, seen, jobs.len());
        Ok(())
    }

    /// Walks the candidates until one shows a results container.
    async fn open_results(&self, page: &dyn BrowserPage, candidates: &[Url]) -> bool {
        let scraping = &self.config.scraping;
        let results = self.profile.results_selector();

        for url in candidates {
            if let Err(e) = page.goto(url.as_str(), scraping.navigation_timeout()).await {
                warn!("{}: failed to load {}: {}", self.source, url, e);
                continue;
            }
            if !page.wait_for_idle(scraping.settle_timeout()).await {
                debug!("{}: {} did not settle, checking for results anyway", self.source, url);
            }
            if self.profile.auto_scroll {
                if let Err(e) = page.auto_scroll().await {
                    debug!("{}: scrolling {} failed: {}", self.source, url, e);
                }
            }
            if page
                .wait_for_selector(&results, scraping.selector_timeout())
                .await
            {
                info!("{}: results found at {}", self.source, url);
                return true;
            }
            debug!("{}: no results container at {}", self.source, url);
        }
        false
    }

    fn build_record(&self, card: RawCard, base_url: &Url) -> Option<JobRecord> {
        if !card.has_valid_title() {
            debug!("{}: dropping card without title", self.source);
            return None;
        }
        if self.profile.filter_by_location
            && !location_accepted(&card.location, &self.config.locations.primary)
        {
            debug!(
                "{}: dropping '{}' located in {}",
                self.source, card.title, card.location
            );
            return None;
        }

        let link = normalize_link(&card.link, base_url);
        Some(JobRecord::new(
            card.title.trim(),
            or_unknown(card.company),
            or_unknown(card.location),
            self.source,
            link,
        ))
    }
}
