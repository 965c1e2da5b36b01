pub mod disk;

pub use disk::DiskStorage;

use crate::core::job::JobRecord;
use crate::ScraperResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Run-level summary written next to the records.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub per_source: BTreeMap<String, usize>,
}

impl RunMetadata {
    pub fn for_jobs(jobs: &[JobRecord]) -> Self {
        let mut per_source = BTreeMap::new();
        for job in jobs {
            *per_source.entry(job.source.to_string()).or_insert(0) += 1;
        }
        Self {
            generated_at: Utc::now(),
            total: jobs.len(),
            per_source,
        }
    }
}

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persists one run's records and returns where they were written.
    async fn store_jobs(&self, jobs: &[JobRecord]) -> ScraperResult<PathBuf>;
}
