use crate::browser::PageSession;
use crate::core::config::ScrapingConfig;
use crate::core::job::JobRecord;
use crate::core::text::{clean_description, select_text};
use crate::{ScraperError, ScraperResult};
use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, info, warn};
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

pub const DESCRIPTION_UNAVAILABLE: &str = "Description not available";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentSummary {
    pub fetched: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Fetches full descriptions for a bounded prefix of records.
///
/// At most `concurrency` detail pages are open at once and consecutive fetches start
/// at least `pacing` apart. Each capped record gets exactly one attempt; failures
/// leave [`DESCRIPTION_UNAVAILABLE`] behind.
#[derive(Debug, Clone)]
pub struct DescriptionEnricher {
    concurrency: usize,
    max_fetch: usize,
    timeout: Duration,
    settle_timeout: Duration,
    pacing: Duration,
}

impl Default for DescriptionEnricher {
    fn default() -> Self {
        Self::from_config(&ScrapingConfig::default())
    }
}

impl DescriptionEnricher {
    pub fn new(concurrency: usize, max_fetch: usize, timeout: Duration) -> Self {
        Self {
            concurrency: concurrency.max(1),
            max_fetch,
            timeout,
            settle_timeout: timeout,
            pacing: Duration::ZERO,
        }
    }

    pub fn from_config(config: &ScrapingConfig) -> Self {
        Self::new(
            config.detail_concurrency,
            config.max_detail_fetch,
            config.navigation_timeout(),
        )
        .with_settle_timeout(config.settle_timeout())
        .with_pacing(config.request_delay())
    }

    pub fn with_settle_timeout(mut self, settle_timeout: Duration) -> Self {
        self.settle_timeout = settle_timeout;
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn max_fetch(&self) -> usize {
        self.max_fetch
    }

    pub async fn enrich(
        &self,
        session: &PageSession,
        records: &mut [JobRecord],
        selectors: &[&str],
    ) -> EnrichmentSummary {
        let limit = self.max_fetch.min(records.len());
        let mut summary = EnrichmentSummary {
            skipped: records.len() - limit,
            ..Default::default()
        };
        if limit == 0 {
            return summary;
        }

        info!(
            "Fetching descriptions for {} of {} records (concurrency {})",
            limit,
            records.len(),
            self.concurrency
        );

        let targets: Vec<(usize, String)> = records[..limit]
            .iter()
            .enumerate()
            .map(|(index, record)| (index, record.link.clone()))
            .collect();

        let mut in_flight = FuturesUnordered::new();
        let mut next_start = Instant::now();
        for (index, link) in targets {
            if in_flight.len() >= self.concurrency {
                debug!(
                    "Reached description fetch limit {}, waiting for slot",
                    self.concurrency
                );
                if let Some((done, result)) = in_flight.next().await {
                    self.apply(session, &mut records[..limit], done, result, &mut summary);
                }
            }

            // The wait runs inside the future so earlier fetches keep being polled.
            let start_at = next_start.max(Instant::now());
            next_start = start_at + self.pacing;
            in_flight.push(async move {
                sleep_until(start_at).await;
                let result = self.fetch_description(session, &link, selectors).await;
                (index, result)
            });
        }

        while let Some((done, result)) = in_flight.next().await {
            self.apply(session, &mut records[..limit], done, result, &mut summary);
        }

        info!(
            "Descriptions: {} fetched, {} unavailable, {} beyond cap",
            summary.fetched, summary.failed, summary.skipped
        );
        summary
    }

    fn apply(
        &self,
        session: &PageSession,
        records: &mut [JobRecord],
        index: usize,
        result: ScraperResult<String>,
        summary: &mut EnrichmentSummary,
    ) {
        let record = &mut records[index];
        match result {
            Ok(description) => {
                record.description = description;
                summary.fetched += 1;
                session.stats().record_description(true);
            }
            Err(e) => {
                warn!(
                    "Description unavailable for '{}' at {}: {}",
                    record.title, record.company, e
                );
                record.description = DESCRIPTION_UNAVAILABLE.to_string();
                summary.failed += 1;
                session.stats().record_description(false);
            }
        }
    }

    async fn fetch_description(
        &self,
        session: &PageSession,
        link: &str,
        selectors: &[&str],
    ) -> ScraperResult<String> {
        if link.is_empty() {
            return Err(ScraperError::NavigationError(
                "record has no link".to_string(),
            ));
        }

        let page = session.new_page().await?;
        let result = async {
            page.goto(link, self.timeout).await?;
            if !page.wait_for_idle(self.settle_timeout).await {
                debug!("Detail page {} did not settle, extracting anyway", link);
            }
            let html = page.content().await?;
            match select_text(&html, selectors) {
                Some(text) => Ok(text),
                None => {
                    debug!("No description selector matched on {}, using page text", link);
                    page.visible_text().await
                }
            }
        }
        .await;

        if let Err(e) = page.close().await {
            debug!("Failed to close detail page {}: {}", link, e);
        }

        let description = clean_description(&result?);
        if description.is_empty() {
            return Err(ScraperError::ExtractionError(
                "detail page has no text".to_string(),
            ));
        }
        Ok(description)
    }
}
