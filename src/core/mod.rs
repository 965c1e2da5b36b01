pub mod aggregator;
pub mod config;
pub mod enrichment;
mod errors;
pub mod job;
pub mod text;

pub use aggregator::Aggregator;
pub use config::{Backend, Config};
pub use enrichment::{DescriptionEnricher, EnrichmentSummary, DESCRIPTION_UNAVAILABLE};
pub use errors::{ScraperError, ScraperResult};
pub use job::{dedup_jobs, JobRecord, Source};
