use anyhow::Result;
use std::sync::Arc;

use tablesearch::error::SearchError;
use tablesearch::handler::{SubmissionHandler, SubmitOutcome};
use tablesearch::page::MemoryPage;
use tablesearch::render::ResultRenderer;

mod test_helpers {
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    use tablesearch::client::SearchBackend;
    use tablesearch::data_models::{Query, SearchResponse};
    use tablesearch::error::SearchError;

    pub fn response_for(query: &str, names: &[&str]) -> SearchResponse {
        let results = names
            .iter()
            .map(|name| {
                serde_json::from_value(serde_json::json!({
                    "row_data": {"name": name},
                    "matched_columns": {"name": name}
                }))
                .unwrap()
            })
            .collect::<Vec<_>>();
        SearchResponse {
            query: query.to_string(),
            total_matches: results.len() as u64,
            timestamp: "2024-01-01T00:00:00".to_string(),
            results,
        }
    }

    /// Answers every query with a fixed result and records what it was asked.
    pub struct FixedBackend {
        pub answer: Result<SearchResponse, SearchError>,
        pub seen: Mutex<Vec<String>>,
    }

    impl FixedBackend {
        pub fn new(answer: Result<SearchResponse, SearchError>) -> Self {
            Self {
                answer,
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchBackend for FixedBackend {
        async fn search(&self, query: &Query) -> Result<SearchResponse, SearchError> {
            self.seen.lock().unwrap().push(query.as_str().to_string());
            self.answer.clone()
        }
    }

    /// Takes a few milliseconds that vary with the query.
    pub struct SlowBackend;

    #[async_trait]
    impl SearchBackend for SlowBackend {
        async fn search(&self, query: &Query) -> Result<SearchResponse, SearchError> {
            let delay = query.as_str().bytes().map(u64::from).sum::<u64>() % 5;
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
            Ok(response_for(query.as_str(), &[query.as_str()]))
        }
    }

    /// Holds each query until the test releases it.
    #[derive(Default)]
    pub struct GatedBackend {
        gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    }

    impl GatedBackend {
        pub fn gate(&self, query: &str) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(query.to_string(), rx);
            tx
        }
    }

    #[async_trait]
    impl SearchBackend for GatedBackend {
        async fn search(&self, query: &Query) -> Result<SearchResponse, SearchError> {
            let gate = self.gates.lock().unwrap().remove(query.as_str());
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            Ok(response_for(query.as_str(), &[query.as_str()]))
        }
    }
}

use test_helpers::*;

#[tokio::test]
async fn test_blank_query_is_rejected_without_request() -> Result<()> {
    let backend = Arc::new(FixedBackend::new(Ok(response_for("x", &["x"]))));
    let page = Arc::new(MemoryPage::new());
    let handler = SubmissionHandler::new(backend.clone(), page.clone(), ResultRenderer::default());

    for blank in ["", "   ", "\t\n"] {
        assert_eq!(handler.submit(blank).await, SubmitOutcome::Rejected);
    }

    assert!(backend.seen().is_empty(), "no request for blank queries");
    assert_eq!(page.alerts(), vec!["Please enter a search term"; 3]);
    assert!(
        page.snapshot().loading_history.is_empty(),
        "loading indicator is never shown for a rejected query"
    );
    Ok(())
}

#[tokio::test]
async fn test_query_is_trimmed_before_sending() -> Result<()> {
    let backend = Arc::new(FixedBackend::new(Ok(response_for("shoe", &["Shoe"]))));
    let page = Arc::new(MemoryPage::new());
    let handler = SubmissionHandler::new(backend.clone(), page.clone(), ResultRenderer::default());

    let outcome = handler.submit("  shoe  ").await;

    assert_eq!(outcome, SubmitOutcome::Rendered { total_matches: 1 });
    assert_eq!(backend.seen(), vec!["shoe"]);
    assert!(page.alerts().is_empty());
    assert!(page.results().contains(r#"<span class="match">Shoe</span>"#));
    Ok(())
}

#[tokio::test]
async fn test_success_shows_then_hides_loading_and_clears_first() -> Result<()> {
    let backend = Arc::new(FixedBackend::new(Ok(response_for("shoe", &["Shoe"]))));
    let page = Arc::new(MemoryPage::new());
    let handler = SubmissionHandler::new(backend, page.clone(), ResultRenderer::default());

    handler.submit("shoe").await;

    let state = page.snapshot();
    assert!(!state.loading);
    assert_eq!(state.loading_history, vec![true, false]);
    assert!(state.results.contains("<table"));
    Ok(())
}

#[tokio::test]
async fn test_server_error_is_shown_inline_and_loading_hidden() -> Result<()> {
    let backend = Arc::new(FixedBackend::new(Err(SearchError::Server { status: 500 })));
    let page = Arc::new(MemoryPage::new());
    let handler = SubmissionHandler::new(backend, page.clone(), ResultRenderer::default());

    let outcome = handler.submit("shoe").await;

    assert_eq!(outcome, SubmitOutcome::Failed(SearchError::Server { status: 500 }));
    assert_eq!(page.results(), r#"<p class="error">Error: Server error: 500</p>"#);
    assert!(!page.is_loading(), "loading indicator must be hidden after an error");
    Ok(())
}

#[tokio::test]
async fn test_network_and_parse_errors_surface_their_message() -> Result<()> {
    for err in [
        SearchError::Network("connection refused".to_string()),
        SearchError::Parse("expected value at line 1 column 1".to_string()),
    ] {
        let backend = Arc::new(FixedBackend::new(Err(err.clone())));
        let page = Arc::new(MemoryPage::new());
        let handler = SubmissionHandler::new(backend, page.clone(), ResultRenderer::default());

        assert_eq!(handler.submit("shoe").await, SubmitOutcome::Failed(err.clone()));
        assert_eq!(page.results(), format!(r#"<p class="error">Error: {err}</p>"#));
        assert!(!page.is_loading());
    }
    Ok(())
}

#[tokio::test]
async fn test_new_submission_clears_previous_results() -> Result<()> {
    let backend = Arc::new(GatedBackend::default());
    let page = Arc::new(MemoryPage::new());
    let handler = Arc::new(SubmissionHandler::new(
        backend.clone(),
        page.clone(),
        ResultRenderer::default(),
    ));

    handler.submit("first").await;
    assert!(page.results().contains("first"));

    let release = backend.gate("second");
    let pending = tokio::spawn({
        let handler = handler.clone();
        async move { handler.submit("second").await }
    });
    tokio::task::yield_now().await;
    while !page.is_loading() {
        tokio::task::yield_now().await;
    }
    assert_eq!(page.results(), "", "results are cleared while the request is in flight");

    release.send(()).ok();
    assert_eq!(pending.await?, SubmitOutcome::Rendered { total_matches: 1 });
    assert!(page.results().contains("second"));
    Ok(())
}

#[tokio::test]
async fn test_stale_response_is_discarded() -> Result<()> {
    let backend = Arc::new(GatedBackend::default());
    let page = Arc::new(MemoryPage::new());
    let handler = Arc::new(SubmissionHandler::new(
        backend.clone(),
        page.clone(),
        ResultRenderer::default(),
    ));

    let release_slow = backend.gate("slow");
    let slow = tokio::spawn({
        let handler = handler.clone();
        async move { handler.submit("slow").await }
    });
    while !page.is_loading() {
        tokio::task::yield_now().await;
    }

    let fast = handler.submit("fast").await;
    assert_eq!(fast, SubmitOutcome::Rendered { total_matches: 1 });
    assert!(!page.is_loading());

    release_slow.send(()).ok();
    assert_eq!(slow.await?, SubmitOutcome::Superseded);

    let results = page.results();
    assert!(results.contains("fast"), "newest response stays rendered");
    assert!(!results.contains("slow"), "stale response must not render");
    assert!(!page.is_loading());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_overlapping_submissions_leave_newest_result_and_no_spinner() -> Result<()> {
    let backend = Arc::new(SlowBackend);
    let page = Arc::new(MemoryPage::new());
    let handler = Arc::new(SubmissionHandler::new(
        backend,
        page.clone(),
        ResultRenderer::default(),
    ));

    let tasks: Vec<_> = (0..64)
        .map(|i| {
            let handler = handler.clone();
            tokio::spawn(async move { handler.submit(&format!("item{i}")).await })
        })
        .collect();

    let mut rendered = 0;
    for task in tasks {
        if matches!(task.await?, SubmitOutcome::Rendered { .. }) {
            rendered += 1;
        }
    }

    assert!(rendered >= 1, "the newest submission always renders");
    assert!(!page.is_loading(), "loading indicator must end hidden");
    assert!(
        page.results().contains(r#"<span class="match">item"#),
        "a superseded submission must not clear the newest results, got {:?}",
        page.results()
    );
    Ok(())
}
