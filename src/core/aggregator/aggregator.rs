use crate::adapters::{default_adapters, SourceAdapter};
use crate::browser::{launcher_for, CookieFile, PageSession, SessionLauncher, SessionProfile};
use crate::core::config::Config;
use crate::core::job::{dedup_jobs, JobRecord};
use crate::stats::StatsTracker;
use crate::{ScraperError, ScraperResult};
use log::{error, info, warn};
use std::sync::Arc;

/// Runs every site adapter against one shared browser session and merges the results.
pub struct Aggregator {
    config: Arc<Config>,
    launcher: Box<dyn SessionLauncher>,
    adapters: Vec<Arc<dyn SourceAdapter>>,
    stats: Arc<StatsTracker>,
}

impl Aggregator {
    pub fn new(config: Arc<Config>, launcher: Box<dyn SessionLauncher>) -> Self {
        let adapters = default_adapters(&config);
        Self {
            config,
            launcher,
            adapters,
            stats: Arc::new(StatsTracker::new()),
        }
    }

    /// Uses the browser backend named in the configuration.
    pub fn from_config(config: Arc<Config>) -> Self {
        let launcher = launcher_for(config.scraping.backend);
        Self::new(config, launcher)
    }

    pub fn with_adapters(mut self, adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        self.adapters = adapters;
        self
    }

    pub fn with_stats(mut self, stats: Arc<StatsTracker>) -> Self {
        self.stats = stats;
        self
    }

    pub fn stats(&self) -> Arc<StatsTracker> {
        Arc::clone(&self.stats)
    }

    /// Scrapes all enabled sites concurrently and returns the deduplicated records.
    ///
    /// Only a failure to start the browser session is an error. Adapter failures are
    /// logged and contribute nothing; zero records is a successful run.
    pub async fn scrape_all_sites(&self) -> ScraperResult<Vec<JobRecord>> {
        let profile = SessionProfile::from_config(&self.config.scraping);
        let cookie_file = self.config.scraping.cookie_file.as_ref().map(CookieFile::new);

        let session = match PageSession::open(
            self.launcher.as_ref(),
            &profile,
            cookie_file,
            Arc::clone(&self.stats),
        )
        .await
        {
            Ok(session) => Arc::new(session),
            Err(e) => {
                error!("Could not start browser session: {}", e);
                self.stats.finish();
                return Err(ScraperError::AggregationError(Box::new(e)));
            }
        };

        session.load_cookies().await;

        let merged = self.run_adapters(&session).await;
        let total = merged.len();
        let jobs = dedup_jobs(merged);
        self.stats.record_duplicates(total - jobs.len());

        session.save_cookies().await;
        session.close().await;
        self.stats.finish();

        info!(
            "Collected {} unique jobs ({} duplicates removed)",
            jobs.len(),
            total - jobs.len()
        );
        Ok(jobs)
    }

    /// Spawns one task per enabled adapter and concatenates their output in adapter order.
    async fn run_adapters(&self, session: &Arc<PageSession>) -> Vec<JobRecord> {
        let tasks: Vec<_> = self
            .adapters
            .iter()
            .filter(|adapter| {
                let enabled = adapter.is_enabled();
                if !enabled {
                    info!("Skipping disabled source {}", adapter.source());
                }
                enabled
            })
            .map(|adapter| {
                let adapter = Arc::clone(adapter);
                let session = Arc::clone(session);
                let source = adapter.source();
                let handle = tokio::spawn(async move { adapter.scrape(&session).await });
                (source, handle)
            })
            .collect();

        let mut merged = Vec::new();
        for (source, handle) in tasks {
            match handle.await {
                Ok(Ok(jobs)) => {
                    info!("{} returned {} jobs", source, jobs.len());
                    merged.extend(jobs);
                }
                Ok(Err(e)) => {
                    warn!("{} failed, continuing without it: {}", source, e);
                    self.stats.record_adapter_failure(source);
                }
                Err(e) => {
                    warn!("{} task aborted, continuing without it: {}", source, e);
                    self.stats.record_adapter_failure(source);
                }
            }
        }
        merged
    }
}
