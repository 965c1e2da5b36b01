use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Listing site a record was scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    LinkedIn,
    Indeed,
    Naukri,
}

impl Source {
    /// Fixed concatenation order used when merging adapter results.
    pub const ALL: [Source; 3] = [Source::LinkedIn, Source::Indeed, Source::Naukri];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::LinkedIn => "linkedin",
            Source::Indeed => "indeed",
            Source::Naukri => "naukri",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub location: String,
    pub source: Source,
    pub link: String,
    pub scraped_at: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
}

impl JobRecord {
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
        source: Source,
        link: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            location: location.into(),
            source,
            link: link.into(),
            scraped_at: Utc::now(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Identity used for deduplication: `(title, company)`, trimmed and lowercased.
    pub fn dedup_key(&self) -> (String, String) {
        (
            self.title.trim().to_lowercase(),
            self.company.trim().to_lowercase(),
        )
    }
}

/// Keeps the first record for every dedup key, preserving input order.
pub fn dedup_jobs(jobs: Vec<JobRecord>) -> Vec<JobRecord> {
    let mut seen = HashSet::with_capacity(jobs.len());
    jobs.into_iter()
        .filter(|job| seen.insert(job.dedup_key()))
        .collect()
}
