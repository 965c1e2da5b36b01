pub mod adapters;
pub mod browser;
pub mod core;
pub mod stats;
pub mod storage;

pub use adapters::{default_adapters, AdapterResult, SourceAdapter};
pub use browser::{PageSession, SessionLauncher};
pub use crate::core::{
    dedup_jobs, Aggregator, Backend, Config, DescriptionEnricher, JobRecord, ScraperError,
    ScraperResult, Source,
};
pub use stats::StatsTracker;
pub use storage::{DiskStorage, JobStore};

use std::sync::Arc;

/// Runs one full pipeline with the configured backend and returns the merged records.
pub async fn scrape_all_sites(config: Config) -> ScraperResult<Vec<JobRecord>> {
    Aggregator::from_config(Arc::new(config)).scrape_all_sites().await
}
