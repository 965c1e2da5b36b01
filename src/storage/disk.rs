use super::{JobStore, RunMetadata};
use crate::core::job::JobRecord;
use crate::ScraperResult;
use async_trait::async_trait;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct DiskStorage {
    base_path: PathBuf,
}

impl DiskStorage {
    pub fn new<P: AsRef<Path>>(base_path: P) -> ScraperResult<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

#[async_trait]
impl JobStore for DiskStorage {
    async fn store_jobs(&self, jobs: &[JobRecord]) -> ScraperResult<PathBuf> {
        let metadata = RunMetadata::for_jobs(jobs);
        let timestamp = metadata.generated_at.format("%Y%m%d_%H%M%S");
        let filename = format!("jobs_{}_{}.json", timestamp, Uuid::now_v7());
        let path = self.base_path.join(filename);

        let json = serde_json::json!({
            "metadata": metadata,
            "jobs": jobs,
        });
        tokio::fs::write(&path, serde_json::to_string_pretty(&json)?).await?;

        info!("Stored {} jobs in {}", jobs.len(), path.display());
        Ok(path)
    }
}
