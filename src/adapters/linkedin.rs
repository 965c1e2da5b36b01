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

/// Postings from the last 24 hours.
const POSTED_WITHIN: &str = "r86400";

pub static PROFILE: SiteProfile = SiteProfile {
    results: &[
        ".jobs-search__results-list",
        "div.jobs-search-results-list",
        "section.two-pane-serp-page__results-list",
    ],
    cards: &[
        "ul.jobs-search__results-list > li",
        "div.base-card",
        "div.job-search-card",
    ],
    title: &[
        Strategy::Text("h3.base-search-card__title"),
        Strategy::Text(".base-search-card__title"),
        Strategy::Text("a.base-card__full-link span.sr-only"),
    ],
    company: &[
        Strategy::Text("h4.base-search-card__subtitle a"),
        Strategy::Text("h4.base-search-card__subtitle"),
        Strategy::Text(".job-search-card__company-name"),
    ],
    location: &[
        Strategy::Text("span.job-search-card__location"),
        Strategy::Text(".base-search-card__metadata span"),
    ],
    link: &[
        Strategy::Attr("a.base-card__full-link", "href"),
        Strategy::Attr("a[data-tracking-control-name]", "href"),
        Strategy::Attr("a", "href"),
    ],
    description: &[
        ".show-more-less-html__markup",
        ".description__text",
        "div.jobs-description__content",
    ],
    auto_scroll: true,
    filter_by_location: true,
};

pub fn search_url(search_url: &str, query: &str, location: &str) -> ScraperResult<Url> {
    with_query_pairs(
        search_url,
        &[
            ("keywords", query),
            ("location", location),
            ("f_TPR", POSTED_WITHIN),
        ],
    )
}

pub struct LinkedInAdapter {
    search: SiteSearch,
}

impl LinkedInAdapter {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            search: SiteSearch::new(Source::LinkedIn, config, &PROFILE, search_url),
        }
    }

    pub fn with_enricher(mut self, enricher: DescriptionEnricher) -> Self {
        self.search = self.search.with_enricher(enricher);
        self
    }
}

#[async_trait]
impl SourceAdapter for LinkedInAdapter {
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
