use super::Aggregator;
use crate::adapters::{AdapterResult, SourceAdapter};
use crate::browser::{MockLauncher, MockSession, PageSession, StoredCookie};
use crate::core::config::Config;
use crate::core::job::{JobRecord, Source};
use crate::{ScraperError, ScraperResult};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Adapter returning a canned outcome without touching the browser.
struct StaticAdapter {
    source: Source,
    enabled: bool,
    jobs: Option<Vec<(&'static str, &'static str)>>,
    delay: Duration,
}

impl StaticAdapter {
    fn ok(source: Source, jobs: Vec<(&'static str, &'static str)>) -> Arc<dyn SourceAdapter> {
        Arc::new(Self {
            source,
            enabled: true,
            jobs: Some(jobs),
            delay: Duration::ZERO,
        })
    }

    fn failing(source: Source) -> Arc<dyn SourceAdapter> {
        Arc::new(Self {
            source,
            enabled: true,
            jobs: None,
            delay: Duration::ZERO,
        })
    }
}

#[async_trait]
impl SourceAdapter for StaticAdapter {
    fn source(&self) -> Source {
        self.source
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn scrape(&self, session: &PageSession) -> AdapterResult {
        tokio::time::sleep(self.delay).await;
        assert!(!session.is_closed());
        match &self.jobs {
            Some(jobs) => Ok(jobs
                .iter()
                .map(|(title, company)| {
                    JobRecord::new(*title, *company, "Delhi", self.source, "https://jobs.test/1")
                })
                .collect()),
            None => Err(ScraperError::NavigationError("blocked".to_string())),
        }
    }
}

/// Adapter that panics mid-run.
struct PanickingAdapter;

#[async_trait]
impl SourceAdapter for PanickingAdapter {
    fn source(&self) -> Source {
        Source::Naukri
    }

    fn is_enabled(&self) -> bool {
        true
    }

    async fn scrape(&self, _session: &PageSession) -> AdapterResult {
        panic!("selector blew up");
    }
}

fn config() -> Arc<Config> {
    Arc::new(
        Config::default()
            .with_delay(0)
            .with_cookie_file(None::<PathBuf>),
    )
}

fn aggregator(mock: &Arc<MockSession>, adapters: Vec<Arc<dyn SourceAdapter>>) -> Aggregator {
    Aggregator::new(config(), Box::new(MockLauncher::new(Arc::clone(mock)))).with_adapters(adapters)
}

fn pairs(jobs: &[JobRecord]) -> Vec<(&str, &str)> {
    jobs.iter()
        .map(|job| (job.title.as_str(), job.company.as_str()))
        .collect()
}

#[tokio::test]
async fn test_first_occurrence_wins_across_sources() -> ScraperResult<()> {
    let mock = Arc::new(MockSession::new());
    let jobs = aggregator(
        &mock,
        vec![
            StaticAdapter::ok(Source::LinkedIn, vec![("Engineer", "X")]),
            StaticAdapter::ok(Source::Indeed, vec![("engineer", "x")]),
            StaticAdapter::ok(Source::Naukri, vec![]),
        ],
    )
    .scrape_all_sites()
    .await?;

    assert_eq!(pairs(&jobs), vec![("Engineer", "X")]);
    assert_eq!(jobs[0].source, Source::LinkedIn);
    assert_eq!(mock.close_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_merge_follows_adapter_order_not_completion_order() -> ScraperResult<()> {
    let mock = Arc::new(MockSession::new());
    let slow: Arc<dyn SourceAdapter> = Arc::new(StaticAdapter {
        source: Source::LinkedIn,
        enabled: true,
        jobs: Some(vec![("Engineer", "X")]),
        delay: Duration::from_millis(50),
    });
    let jobs = aggregator(
        &mock,
        vec![
            slow,
            StaticAdapter::ok(Source::Indeed, vec![("ENGINEER", "X"), ("Designer", "Y")]),
        ],
    )
    .scrape_all_sites()
    .await?;

    assert_eq!(pairs(&jobs), vec![("Engineer", "X"), ("Designer", "Y")]);
    Ok(())
}

#[tokio::test]
async fn test_failed_adapters_are_isolated() -> ScraperResult<()> {
    let mock = Arc::new(MockSession::new());
    let panicking: Arc<dyn SourceAdapter> = Arc::new(PanickingAdapter);
    let aggregator = aggregator(
        &mock,
        vec![
            StaticAdapter::ok(Source::LinkedIn, vec![("Engineer", "X"), ("Analyst", "Z")]),
            StaticAdapter::failing(Source::Indeed),
            panicking,
        ],
    );

    let jobs = aggregator.scrape_all_sites().await?;

    assert_eq!(pairs(&jobs), vec![("Engineer", "X"), ("Analyst", "Z")]);
    assert_eq!(mock.close_count(), 1);

    let stats = aggregator.stats().get_stats();
    assert_eq!(stats.adapter_failures[&Source::Indeed], 1);
    assert_eq!(stats.adapter_failures[&Source::Naukri], 1);
    assert!(stats.end_time.is_some());
    Ok(())
}

#[tokio::test]
async fn test_session_failure_is_surfaced() {
    let result = Aggregator::new(config(), Box::new(MockLauncher::failing()))
        .with_adapters(vec![StaticAdapter::ok(Source::LinkedIn, vec![("Engineer", "X")])])
        .scrape_all_sites()
        .await;

    match result {
        Err(ScraperError::AggregationError(inner)) => {
            assert!(matches!(*inner, ScraperError::SessionInitError(_)));
        }
        other => panic!("expected aggregation error, got {:?}", other.map(|jobs| jobs.len())),
    }
}

#[tokio::test]
async fn test_zero_jobs_is_success() -> ScraperResult<()> {
    let mock = Arc::new(MockSession::new());
    let jobs = aggregator(
        &mock,
        vec![
            StaticAdapter::ok(Source::LinkedIn, vec![]),
            StaticAdapter::failing(Source::Indeed),
        ],
    )
    .scrape_all_sites()
    .await?;

    assert!(jobs.is_empty());
    assert_eq!(mock.close_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_disabled_adapters_are_skipped() -> ScraperResult<()> {
    let mock = Arc::new(MockSession::new());
    let disabled: Arc<dyn SourceAdapter> = Arc::new(StaticAdapter {
        source: Source::Indeed,
        enabled: false,
        jobs: Some(vec![("Hidden", "Q")]),
        delay: Duration::ZERO,
    });
    let jobs = aggregator(
        &mock,
        vec![StaticAdapter::ok(Source::LinkedIn, vec![("Engineer", "X")]), disabled],
    )
    .scrape_all_sites()
    .await?;

    assert_eq!(pairs(&jobs), vec![("Engineer", "X")]);
    Ok(())
}

#[tokio::test]
async fn test_blocked_site_does_not_affect_others() -> ScraperResult<()> {
    let linkedin = r#"
        <ul class="jobs-search__results-list">
          <li>
            <h3 class="base-search-card__title">Rust Engineer</h3>
            <h4 class="base-search-card__subtitle"><a>Acme</a></h4>
            <span class="job-search-card__location">Noida, Uttar Pradesh</span>
            <a class="base-card__full-link" href="https://in.linkedin.com/jobs/view/1"></a>
          </li>
        </ul>"#;
    let naukri = r#"
        <div class="srp-jobtuple-wrapper">
          <a class="title" href="/job-listings-2">rust engineer</a>
          <a class="comp-name">ACME</a>
          <span class="locWdth">Delhi</span>
        </div>
        <div class="srp-jobtuple-wrapper">
          <a class="title" href="/job-listings-3">Go Developer</a>
          <a class="comp-name">Initech</a>
        </div>"#;
    let mock = Arc::new(
        MockSession::new()
            .with_page("https://www.linkedin.com/jobs/search/", linkedin)
            .with_page("https://in.linkedin.com/jobs/view/", "<div class='description__text'>A</div>")
            .with_failure("https://in.indeed.com/")
            .with_page("https://www.naukri.com/", naukri),
    );

    let config = Arc::new(
        Config::default()
            .with_delay(0)
            .with_cookie_file(None::<PathBuf>)
            .with_detail_limits(5, 2),
    );
    let jobs = Aggregator::new(config, Box::new(MockLauncher::new(Arc::clone(&mock))))
        .scrape_all_sites()
        .await?;

    assert_eq!(
        pairs(&jobs),
        vec![("Rust Engineer", "Acme"), ("Go Developer", "Initech")]
    );
    assert_eq!(jobs[0].description, "A");
    assert_eq!(jobs[1].link, "https://www.naukri.com/job-listings-3");
    assert_eq!(mock.close_count(), 1);
    assert_eq!(mock.open_pages(), 0);
    Ok(())
}

#[tokio::test]
async fn test_cookies_restored_and_saved() -> ScraperResult<()> {
    let path = std::env::temp_dir()
        .join(format!("jobscout-aggregator-{}", uuid::Uuid::now_v7()))
        .join("cookies.json");
    let config = Arc::new(
        Config::default()
            .with_delay(0)
            .with_cookie_file(Some(path.clone())),
    );

    let first = Arc::new(MockSession::new().with_cookies(vec![StoredCookie::new("li_at", "1", ".linkedin.com")]));
    Aggregator::new(Arc::clone(&config), Box::new(MockLauncher::new(Arc::clone(&first))))
        .with_adapters(vec![])
        .scrape_all_sites()
        .await?;
    assert!(path.exists());

    let second = Arc::new(MockSession::new());
    Aggregator::new(config, Box::new(MockLauncher::new(Arc::clone(&second))))
        .with_adapters(vec![])
        .scrape_all_sites()
        .await?;
    assert_eq!(second.stored_cookies()[0].name, "li_at");
    Ok(())
}
