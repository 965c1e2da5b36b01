use super::profile::{SiteProfile, Strategy};
use super::search::SiteSearch;
use super::{AdapterResult, SourceAdapter};
use crate::browser::PageSession;
use crate::core::config::Config;
use crate::core::enrichment::DescriptionEnricher;
use crate::core::job::Source;
use crate::ScraperResult;
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

// Search paths are already scoped to one location, so cards are not filtered again.
pub static PROFILE: SiteProfile = SiteProfile {
    results: &[".srp-jobtuple-wrapper", "div.list", "section.listContainer"],
    cards: &[".srp-jobtuple-wrapper", "article.jobTuple"],
    title: &[
        Strategy::Text("a.title"),
        Strategy::Attr("a.title", "title"),
    ],
    company: &[
        Strategy::Text("a.comp-name"),
        Strategy::Text("a.subTitle"),
    ],
    location: &[
        Strategy::Text("span.locWdth"),
        Strategy::Text("li.location span"),
    ],
    link: &[Strategy::Attr("a.title", "href")],
    description: &["section.job-desc", "div.job-desc", "div.dang-inner-html"],
    auto_scroll: true,
    filter_by_location: false,
};

/// Lowercase path segment with every run of non-alphanumerics replaced by one dash.
fn slug(value: &str) -> String {
    value
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

pub fn search_url(search_url: &str, query: &str, location: &str) -> ScraperResult<Url> {
    let mut base = Url::parse(search_url)?;
    if !base.path().ends_with('/') {
        let directory = format!("{}/", base.path());
        base.set_path(&directory);
    }
    base.set_query(None);
    Ok(base.join(&format!("{}-jobs-in-{}", slug(query), slug(location)))?)
}

pub struct NaukriAdapter {
    search: SiteSearch,
}

impl NaukriAdapter {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            search: SiteSearch::new(Source::Naukri, config, &PROFILE, search_url),
        }
    }

    pub fn with_enricher(mut self, enricher: DescriptionEnricher) -> Self {
        self.search = self.search.with_enricher(enricher);
        self
    }
}

#[async_trait]
impl SourceAdapter for NaukriAdapter {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_path_uses_slugs() {
        let url = search_url("https://www.naukri.com/", "Senior Rust Engineer", "New Delhi").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.naukri.com/senior-rust-engineer-jobs-in-new-delhi"
        );
    }

    #[test]
    fn test_search_path_keeps_configured_prefix() {
        let url = search_url("https://www.naukri.com/it-jobs/", "rust", "Delhi").unwrap();
        assert_eq!(url.as_str(), "https://www.naukri.com/it-jobs/rust-jobs-in-delhi");

        let url = search_url("https://www.naukri.com/it-jobs?src=home", "rust", "Delhi").unwrap();
        assert_eq!(url.as_str(), "https://www.naukri.com/it-jobs/rust-jobs-in-delhi");
    }
}
