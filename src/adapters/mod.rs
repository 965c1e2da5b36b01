//! One adapter per listing site, all driven through [`SourceAdapter`].

mod indeed;
mod linkedin;
mod naukri;
pub mod profile;
pub mod search;

pub use indeed::IndeedAdapter;
pub use linkedin::LinkedInAdapter;
pub use naukri::NaukriAdapter;
pub use profile::{location_accepted, RawCard, SiteProfile, Strategy, NOT_AVAILABLE};

use crate::browser::PageSession;
use crate::core::config::Config;
use crate::core::job::{JobRecord, Source};
use crate::ScraperResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Records from one site, or the reason the site produced none.
pub type AdapterResult = ScraperResult<Vec<JobRecord>>;

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn source(&self) -> Source;

    fn is_enabled(&self) -> bool;

    /// Searches the site and returns its enriched records. Disabled adapters return
    /// an empty list without navigating.
    async fn scrape(&self, session: &PageSession) -> AdapterResult;
}

/// Every site adapter, in merge order.
pub fn default_adapters(config: &Arc<Config>) -> Vec<Arc<dyn SourceAdapter>> {
    vec![
        Arc::new(LinkedInAdapter::new(Arc::clone(config))),
        Arc::new(IndeedAdapter::new(Arc::clone(config))),
        Arc::new(NaukriAdapter::new(Arc::clone(config))),
    ]
}
