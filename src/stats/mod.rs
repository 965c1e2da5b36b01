use crate::core::job::Source;
use chrono::{DateTime, Duration, Utc};
use log::info;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct ScrapingStats {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub pages_opened: usize,
    pub navigations: usize,
    pub failed_navigations: usize,
    pub cards_seen: HashMap<Source, usize>,
    pub records_kept: HashMap<Source, usize>,
    pub records_filtered: usize,
    pub descriptions_fetched: usize,
    pub descriptions_failed: usize,
    pub adapter_failures: HashMap<Source, usize>,
    pub duplicates_removed: usize,
    pub average_navigation_time: f64, // in milliseconds
}

#[derive(Debug, Clone)]
pub struct StatsTracker {
    stats: Arc<RwLock<ScrapingStats>>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(RwLock::new(ScrapingStats {
                start_time: Utc::now(),
                end_time: None,
                pages_opened: 0,
                navigations: 0,
                failed_navigations: 0,
                cards_seen: HashMap::new(),
                records_kept: HashMap::new(),
                records_filtered: 0,
                descriptions_fetched: 0,
                descriptions_failed: 0,
                adapter_failures: HashMap::new(),
                duplicates_removed: 0,
                average_navigation_time: 0.0,
            })),
        }
    }

    pub fn record_page_opened(&self) {
        self.stats.write().pages_opened += 1;
    }

    pub fn record_navigation(&self, success: bool, duration: Duration) {
        let mut stats = self.stats.write();
        stats.navigations += 1;
        if !success {
            stats.failed_navigations += 1;
        }

        let current_total = stats.average_navigation_time * (stats.navigations - 1) as f64;
        let new_duration = duration.num_milliseconds() as f64;
        stats.average_navigation_time = (current_total + new_duration) / stats.navigations as f64;
    }

    pub fn record_cards(&self, source: Source, seen: usize, kept: usize) {
        let mut stats = self.stats.write();
        *stats.cards_seen.entry(source).or_insert(0) += seen;
        *stats.records_kept.entry(source).or_insert(0) += kept;
        stats.records_filtered += seen.saturating_sub(kept);
    }

    pub fn record_description(&self, success: bool) {
        let mut stats = self.stats.write();
        if success {
            stats.descriptions_fetched += 1;
        } else {
            stats.descriptions_failed += 1;
        }
    }

    pub fn record_adapter_failure(&self, source: Source) {
        *self.stats.write().adapter_failures.entry(source).or_insert(0) += 1;
    }

    pub fn record_duplicates(&self, removed: usize) {
        self.stats.write().duplicates_removed += removed;
    }

    pub fn finish(&self) {
        self.stats.write().end_time = Some(Utc::now());
    }

    pub fn get_stats(&self) -> ScrapingStats {
        self.stats.read().clone()
    }

    pub fn print_summary(&self) {
        let stats = self.stats.read();
        let duration = stats
            .end_time
            .unwrap_or_else(Utc::now)
            .signed_duration_since(stats.start_time);

        info!("Scraping statistics:");
        info!("  Duration: {} seconds", duration.num_seconds());
        info!("  Pages opened: {}", stats.pages_opened);
        info!(
            "  Navigations: {} ({} failed, avg {:.2}ms)",
            stats.navigations, stats.failed_navigations, stats.average_navigation_time
        );
        for source in Source::ALL {
            info!(
                "  {}: {} cards seen, {} kept, {} adapter failures",
                source,
                stats.cards_seen.get(&source).copied().unwrap_or(0),
                stats.records_kept.get(&source).copied().unwrap_or(0),
                stats.adapter_failures.get(&source).copied().unwrap_or(0)
            );
        }
        info!("  Records filtered: {}", stats.records_filtered);
        info!("  Duplicates removed: {}", stats.duplicates_removed);
        info!(
            "  Descriptions: {} fetched, {} unavailable",
            stats.descriptions_fetched, stats.descriptions_failed
        );
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}
