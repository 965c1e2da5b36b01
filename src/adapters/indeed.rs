use super::profile::{SiteProfile, Strategy};
use super::search::{with_query_pairs, SiteSearch};
use super::{AdapterResult, SourceAdapter};
use crate::browser::PageSession;
use crate::core::config::Config;
use crate::core::enrichment::DescriptionEnricher;
use crate::core::job::Source;
use crate::ScraperResult;
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

const POSTED_WITHIN_DAYS: &str = "1";

pub static PROFILE: SiteProfile = SiteProfile {
    results: &[
        "#mosaic-provider-jobcards",
        "#mosaic-jobResults",
        "ul.jobsearch-ResultsList",
    ],
    cards: &["div.job_seen_beacon", "div.cardOutline", "td.resultContent"],
    title: &[
        Strategy::Attr("h2.jobTitle span[title]", "title"),
        Strategy::Text("h2.jobTitle span"),
        Strategy::Text("h2.jobTitle a"),
    ],
    company: &[
        Strategy::Text("[data-testid='company-name']"),
        Strategy::Text("span.companyName"),
    ],
    location: &[
        Strategy::Text("[data-testid='text-location']"),
        Strategy::Text("div.companyLocation"),
    ],
    link: &[
        Strategy::Attr("h2.jobTitle a", "href"),
        Strategy::Attr("a.jcs-JobTitle", "href"),
    ],
    description: &["#jobDescriptionText", ".jobsearch-jobDescriptionText"],
    auto_scroll: false,
    filter_by_location: true,
};

pub fn search_url(search_url: &str, query: &str, location: &str) -> ScraperResult<Url> {
    with_query_pairs(
        search_url,
        &[("q", query), ("l", location), ("fromage", POSTED_WITHIN_DAYS)],
    )
}

pub struct IndeedAdapter {
    search: SiteSearch,
}

impl IndeedAdapter {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            search: SiteSearch::new(Source::Indeed, config, &PROFILE, search_url),
        }
    }

    pub fn with_enricher(mut self, enricher: DescriptionEnricher) -> Self {
        self.search = self.search.with_enricher(enricher);
        self
    }
}

#[async_trait]
impl SourceAdapter for IndeedAdapter {
    fn source(&self) -> Source {
        self.search.source()
    }

    fn is_enabled(&self) -> bool {
        self.search.is_enabled()
    }

    async fn scrape(&self, session: &PageSession) -> AdapterResult {
        self.search.run(session).await
    }
}
