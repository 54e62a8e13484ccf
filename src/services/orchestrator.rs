use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dal::scrape_log_db::{self, RecordError},
    domain::scrape::{RequestValidationError, ScrapeRequest, ScraperLog},
    services::{extractor::Extractor, fetcher::PageFetcher},
};

/// Sink for finished scrape attempts. Append-only by contract; the
/// production impl writes to the scrape log table.
#[async_trait]
pub trait OutcomeRecorder: Send + Sync {
    async fn record(&self, log: &ScraperLog) -> Result<Uuid, RecordError>;
}

pub struct PgRecorder {
    pool: PgPool,
}

impl PgRecorder {
    pub fn new(pool: PgPool) -> Self {
        PgRecorder { pool }
    }
}

#[async_trait]
impl OutcomeRecorder for PgRecorder {
    async fn record(&self, log: &ScraperLog) -> Result<Uuid, RecordError> {
        scrape_log_db::insert_log(log, &self.pool).await
    }
}

/// What one orchestration run hands back: the scrape outcome itself, and
/// separately whether it could be durably recorded. A store failure must
/// never masquerade as a scrape failure, so the two travel side by side.
#[derive(Debug)]
pub struct ScrapeOutcome {
    pub log: ScraperLog,
    pub log_id: Result<Uuid, RecordError>,
}

pub struct ScrapeOrchestrator<F, R> {
    fetcher: F,
    recorder: R,
    extractor: Extractor,
}

impl<F: PageFetcher, R: OutcomeRecorder> ScrapeOrchestrator<F, R> {
    pub fn new(fetcher: F, recorder: R, extractor: Extractor) -> Self {
        ScrapeOrchestrator {
            fetcher,
            recorder,
            extractor,
        }
    }

    /// Validates the raw request and runs it. An invalid request is
    /// rejected here, before any browser session or connection exists.
    pub async fn handle(
        &self,
        url: &str,
        kind: &str,
        page_id: Option<String>,
    ) -> Result<ScrapeOutcome, RequestValidationError> {
        let request = ScrapeRequest::parse(url, kind, page_id)?;
        Ok(self.run(request).await)
    }

    pub async fn run(&self, request: ScrapeRequest) -> ScrapeOutcome {
        /*
        fetching -> extracting -> recording -> done
        A fetch failure skips extraction and goes straight to recording,
        so every attempt leaves an audit row.
        */
        let log = match self.fetcher.fetch(&request.url).await {
            Ok(page) => {
                let (record, field_errors) = self.extractor.extract(&page, request.kind);
                if !field_errors.is_empty() {
                    log::info!(
                        "Scrape of {} extracted with {} missing fields",
                        request.url,
                        field_errors.len()
                    );
                }
                ScraperLog::extracted(&request, record, field_errors)
            }
            Err(e) => {
                log::error!("Scrape of {} failed: {}", request.url, e);
                ScraperLog::failed(&request, e.to_string())
            }
        };

        let log_id = self.recorder.record(&log).await;
        if let Err(ref e) = log_id {
            log::error!("Failed to record scrape outcome for {}: {}", log.url, e);
        }

        ScrapeOutcome { log, log_id }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use async_trait::async_trait;
    use url::Url;
    use uuid::Uuid;

    use crate::{
        dal::scrape_log_db::RecordError,
        domain::scrape::{RequestValidationError, ScrapeStatus, ScraperLog},
        services::{
            extractor::{Extractor, SelectorTable},
            fetcher::{FetchError, PageFetcher, RenderedPage},
        },
    };

    use super::{OutcomeRecorder, ScrapeOrchestrator, ScrapeOutcome};

    const TARGET: &str = "https://www.linkedin.com/feed/update/urn:li:activity:1/";

    // A post page with every expected field present.
    const COMPLETE_POST_HTML: &str = r#"<html><body>
        <span class="feed-shared-actor__name">John Smith</span>
        <span class="feed-shared-actor__description">CTO at Acme Corp</span>
        <span class="feed-shared-actor__sub-description">2d ago</span>
        <div class="feed-shared-update-v2__description">Big announcement!</div>
        <li class="social-details-social-counts__item">3,401 likes</li>
        <li class="social-details-social-counts__item">122 comments</li>
        <li class="social-details-social-counts__item">45 reposts</li>
        <article class="comments-comment-item">
            <span class="comments-post-meta__name-text">Alice</span>
            <div class="comments-comment-item__main-content">Congrats!</div>
        </article>
        </body></html>"#;

    enum FetchPlan {
        Html(&'static str),
        Timeout,
    }

    struct StubFetcher {
        plan: FetchPlan,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, _url: &Url) -> Result<RenderedPage, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.plan {
                FetchPlan::Html(html) => Ok(RenderedPage::new(html.to_string())),
                FetchPlan::Timeout => Err(FetchError::Timeout),
            }
        }
    }

    struct MemoryRecorder {
        entries: Arc<Mutex<Vec<(Uuid, ScraperLog)>>>,
        fail: bool,
    }

    #[async_trait]
    impl OutcomeRecorder for MemoryRecorder {
        async fn record(&self, log: &ScraperLog) -> Result<Uuid, RecordError> {
            if self.fail {
                return Err(RecordError::StoreUnreachable(sqlx::Error::PoolClosed));
            }
            let id = Uuid::new_v4();
            self.entries.lock().unwrap().push((id, log.clone()));
            Ok(id)
        }
    }

    struct Harness {
        orchestrator: ScrapeOrchestrator<StubFetcher, MemoryRecorder>,
        fetch_calls: Arc<AtomicUsize>,
        entries: Arc<Mutex<Vec<(Uuid, ScraperLog)>>>,
    }

    fn harness(plan: FetchPlan, recorder_fails: bool) -> Harness {
        let fetch_calls = Arc::new(AtomicUsize::new(0));
        let entries = Arc::new(Mutex::new(vec![]));
        let orchestrator = ScrapeOrchestrator::new(
            StubFetcher {
                plan,
                calls: fetch_calls.clone(),
            },
            MemoryRecorder {
                entries: entries.clone(),
                fail: recorder_fails,
            },
            Extractor::new(&SelectorTable::default()).unwrap(),
        );
        Harness {
            orchestrator,
            fetch_calls,
            entries,
        }
    }

    #[tokio::test]
    async fn unknown_kind_is_rejected_before_the_fetcher_runs() {
        let h = harness(FetchPlan::Html(COMPLETE_POST_HTML), false);

        let result = h.orchestrator.handle(TARGET, "group", None).await;

        assert!(matches!(
            result,
            Err(RequestValidationError::UnknownKind(_))
        ));
        assert_eq!(h.fetch_calls.load(Ordering::SeqCst), 0);
        assert!(h.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_url_is_rejected_before_the_fetcher_runs() {
        let h = harness(FetchPlan::Html(COMPLETE_POST_HTML), false);

        let result = h.orchestrator.handle("not a url", "post", None).await;

        assert!(matches!(
            result,
            Err(RequestValidationError::MalformedUrl(_))
        ));
        assert_eq!(h.fetch_calls.load(Ordering::SeqCst), 0);
        assert!(h.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_timeout_becomes_a_recorded_failure() {
        let h = harness(FetchPlan::Timeout, false);

        let outcome = h.orchestrator.handle(TARGET, "post", None).await.unwrap();

        assert_eq!(outcome.log.status, ScrapeStatus::Failed);
        assert!(outcome.log.record.is_none());
        assert!(outcome
            .log
            .failure_reason
            .as_deref()
            .unwrap()
            .contains("timeout"));
        assert!(outcome.log_id.is_ok());

        let entries = h.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1.status, ScrapeStatus::Failed);
    }

    #[tokio::test]
    async fn complete_page_is_a_success() {
        let h = harness(FetchPlan::Html(COMPLETE_POST_HTML), false);

        let outcome = h
            .orchestrator
            .handle(TARGET, "post", Some("acme-1".to_string()))
            .await
            .unwrap();

        assert_eq!(outcome.log.status, ScrapeStatus::Success);
        assert!(outcome.log.field_errors.is_empty());
        assert!(outcome.log.record.is_some());
        assert_eq!(outcome.log.page_id.as_deref(), Some("acme-1"));
        assert_eq!(h.fetch_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_fields_downgrade_to_partial() {
        let h = harness(
            FetchPlan::Html(
                r#"<html><body>
                <span class="feed-shared-actor__name">John Smith</span>
                </body></html>"#,
            ),
            false,
        );

        let outcome = h.orchestrator.handle(TARGET, "post", None).await.unwrap();

        assert_eq!(outcome.log.status, ScrapeStatus::Partial);
        assert!(outcome.log.record.is_some());
        assert!(!outcome.log.field_errors.is_empty());
        assert!(outcome.log.failure_reason.is_none());
    }

    #[tokio::test]
    async fn recorder_failure_is_a_separate_channel() {
        let h = harness(FetchPlan::Html(COMPLETE_POST_HTML), true);

        let outcome = h.orchestrator.handle(TARGET, "post", None).await.unwrap();

        // The scrape itself still reads as a success; only persistence broke.
        assert_eq!(outcome.log.status, ScrapeStatus::Success);
        assert!(outcome.log.failure_reason.is_none());
        assert!(matches!(
            outcome.log_id,
            Err(RecordError::StoreUnreachable(_))
        ));
    }

    #[tokio::test]
    async fn replaying_a_request_appends_independent_entries() {
        let h = harness(FetchPlan::Html(COMPLETE_POST_HTML), false);

        let first = h.orchestrator.handle(TARGET, "post", None).await.unwrap();
        let second = h.orchestrator.handle(TARGET, "post", None).await.unwrap();

        let entries = h.entries.lock().unwrap();
        assert_eq!(entries.len(), 2);
        assert_ne!(entries[0].0, entries[1].0);
        assert_ne!(first.log_id.unwrap(), second.log_id.unwrap());
    }

    #[tokio::test]
    async fn recorded_entry_matches_the_returned_log() {
        let h = harness(FetchPlan::Html(COMPLETE_POST_HTML), false);

        let ScrapeOutcome { log, log_id } =
            h.orchestrator.handle(TARGET, "post", None).await.unwrap();

        let entries = h.entries.lock().unwrap();
        let (stored_id, stored_log) = &entries[0];
        assert_eq!(*stored_id, log_id.unwrap());
        assert_eq!(stored_log, &log);
    }
}
