use super::{DescriptionEnricher, DESCRIPTION_UNAVAILABLE};
use crate::browser::{MockLauncher, MockSession, PageSession, SessionProfile};
use crate::core::job::{JobRecord, Source};
use crate::core::text::MAX_DESCRIPTION_CHARS;
use crate::stats::StatsTracker;
use std::sync::Arc;
use std::time::Duration;

const SELECTORS: &[&str] = &["#jobDescriptionText", ".description"];

fn detail_html(body: &str) -> String {
    format!(
        "<html><body><nav>Menu</nav><div id='jobDescriptionText'>{}</div></body></html>",
        body
    )
}

fn records(count: usize) -> Vec<JobRecord> {
    (0..count)
        .map(|i| {
            JobRecord::new(
                format!("Engineer {}", i),
                "Acme",
                "Delhi",
                Source::Indeed,
                format!("https://jobs.test/view/{}", i),
            )
        })
        .collect()
}

async fn open(mock: &Arc<MockSession>) -> PageSession {
    PageSession::open(
        &MockLauncher::new(Arc::clone(mock)),
        &SessionProfile::default(),
        None,
        Arc::new(StatsTracker::new()),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_only_capped_prefix_is_enriched() {
    let mock = Arc::new(MockSession::new().with_page("https://jobs.test/view/", &detail_html("Write Rust")));
    let session = open(&mock).await;
    let mut jobs = records(5);

    let enricher = DescriptionEnricher::new(3, 2, Duration::from_secs(1));
    let summary = enricher.enrich(&session, &mut jobs, SELECTORS).await;

    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.skipped, 3);
    assert_eq!(jobs[0].description, "Write Rust");
    assert_eq!(jobs[1].description, "Write Rust");
    assert!(jobs[2..].iter().all(|job| job.description.is_empty()));
    assert_eq!(mock.navigations().len(), 2);
}

#[tokio::test]
async fn test_concurrency_never_exceeds_cap() {
    let mock = Arc::new(MockSession::new().with_delayed_page(
        "https://jobs.test/view/",
        &detail_html("Details"),
        Duration::from_millis(40),
    ));
    let session = open(&mock).await;
    let mut jobs = records(10);

    let enricher = DescriptionEnricher::new(3, 20, Duration::from_secs(1));
    let summary = enricher.enrich(&session, &mut jobs, SELECTORS).await;

    assert_eq!(summary.fetched, 10);
    assert!(mock.max_open_pages() <= 3);
    assert!(mock.max_open_pages() >= 2);
    assert_eq!(mock.open_pages(), 0);
}

#[tokio::test]
async fn test_each_capped_record_is_attempted_once() {
    let mock = Arc::new(
        MockSession::new()
            .with_page("https://jobs.test/view/", &detail_html("ok"))
            .with_failure("https://jobs.test/view/1"),
    );
    let session = open(&mock).await;
    let mut jobs = records(4);

    let enricher = DescriptionEnricher::new(2, 4, Duration::from_secs(1));
    let summary = enricher.enrich(&session, &mut jobs, SELECTORS).await;

    assert_eq!(summary.fetched, 3);
    assert_eq!(summary.failed, 1);
    for i in 0..4 {
        assert_eq!(mock.navigation_count(&format!("https://jobs.test/view/{}", i)), 1);
    }
    assert_eq!(jobs[1].description, DESCRIPTION_UNAVAILABLE);
    assert_eq!(jobs[3].description, "ok");
}

#[tokio::test]
async fn test_falls_back_to_page_text() {
    let mock = Arc::new(MockSession::new().with_page(
        "https://jobs.test/view/",
        "<html><body><main>  Full\n\npage   text </main><script>x()</script></body></html>",
    ));
    let session = open(&mock).await;
    let mut jobs = records(1);

    DescriptionEnricher::new(1, 1, Duration::from_secs(1))
        .enrich(&session, &mut jobs, SELECTORS)
        .await;

    assert_eq!(jobs[0].description, "Full page text");
}

#[tokio::test]
async fn test_missing_link_and_empty_page_use_sentinel() {
    let mock = Arc::new(MockSession::new().with_page("https://jobs.test/view/", "<html><body> </body></html>"));
    let session = open(&mock).await;
    let mut jobs = records(2);
    jobs[0].link = String::new();

    let summary = DescriptionEnricher::new(2, 2, Duration::from_secs(1))
        .enrich(&session, &mut jobs, SELECTORS)
        .await;

    assert_eq!(summary.failed, 2);
    assert!(jobs.iter().all(|job| job.description == DESCRIPTION_UNAVAILABLE));
    assert_eq!(session.stats().get_stats().descriptions_failed, 2);
}

#[tokio::test]
async fn test_description_is_truncated() {
    let long = "lorem ipsum ".repeat(1000);
    let mock = Arc::new(MockSession::new().with_page("https://jobs.test/view/", &detail_html(&long)));
    let session = open(&mock).await;
    let mut jobs = records(1);

    DescriptionEnricher::new(1, 1, Duration::from_secs(1))
        .enrich(&session, &mut jobs, SELECTORS)
        .await;

    assert_eq!(jobs[0].description.chars().count(), MAX_DESCRIPTION_CHARS);
}

#[tokio::test]
async fn test_fetch_starts_are_paced() {
    let mock = Arc::new(MockSession::new().with_page("https://jobs.test/view/", &detail_html("ok")));
    let session = open(&mock).await;
    let mut jobs = records(4);

    let started = tokio::time::Instant::now();
    let summary = DescriptionEnricher::new(4, 4, Duration::from_secs(1))
        .with_pacing(Duration::from_millis(40))
        .enrich(&session, &mut jobs, SELECTORS)
        .await;

    assert_eq!(summary.fetched, 4);
    assert!(started.elapsed() >= Duration::from_millis(120));
    assert_eq!(
        mock.navigations(),
        (0..4)
            .map(|i| format!("https://jobs.test/view/{}", i))
            .collect::<Vec<_>>()
    );
}
