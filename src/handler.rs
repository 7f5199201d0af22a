use std::sync::{Arc, Mutex, MutexGuard};

use crate::client::SearchBackend;
use crate::data_models::Query;
use crate::error::SearchError;
use crate::page::{LoadingGuard, Page};
use crate::render::ResultRenderer;

/// What became of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The query was blank; nothing was sent.
    Rejected,
    /// A response was rendered into the results area.
    Rendered { total_matches: u64 },
    /// The request failed and the error was shown inline.
    Failed(SearchError),
    /// A newer submission started before this one finished; its response was dropped.
    Superseded,
}

pub struct SubmissionHandler<B: ?Sized, P> {
    backend: Arc<B>,
    page: Arc<P>,
    renderer: ResultRenderer,
    latest_request: Mutex<u64>,
}

impl<B, P> SubmissionHandler<B, P>
where
    B: SearchBackend + ?Sized,
    P: Page + 'static,
{
    pub fn new(backend: Arc<B>, page: Arc<P>, renderer: ResultRenderer) -> Self {
        Self {
            backend,
            page,
            renderer,
            latest_request: Mutex::new(0),
        }
    }

    fn lock_latest(&self) -> MutexGuard<'_, u64> {
        self.latest_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs `f` only if `request_id` is still the newest submission. The
    /// lock is held throughout, so no newer submission can start meanwhile.
    fn if_latest<R>(&self, request_id: u64, f: impl FnOnce() -> R) -> Option<R> {
        let latest = self.lock_latest();
        (*latest == request_id).then(f)
    }

    pub async fn submit(&self, raw_query: &str) -> SubmitOutcome {
        let query = match Query::parse(raw_query) {
            Ok(query) => query,
            Err(err) => {
                log::debug!("rejected blank query");
                self.page.alert(&err.to_string());
                return SubmitOutcome::Rejected;
            }
        };

        let page: &dyn Page = &*self.page;
        let (request_id, _loading) = {
            let mut latest = self.lock_latest();
            *latest += 1;
            let request_id = *latest;
            let loading = LoadingGuard::show(page, move |page| {
                self.if_latest(request_id, || page.set_loading(false));
            });
            page.set_results(String::new());
            (request_id, loading)
        };
        log::info!("search #{request_id}: {:?}", query.as_str());

        let result = self.backend.search(&query).await;

        let outcome = self.if_latest(request_id, || match result {
            Ok(response) => {
                log::info!(
                    "search #{request_id}: {} matches for {:?}",
                    response.total_matches,
                    response.query
                );
                page.set_results(self.renderer.render(&response));
                SubmitOutcome::Rendered {
                    total_matches: response.total_matches,
                }
            }
            Err(err) => {
                log::warn!("search #{request_id} failed: {err}");
                page.set_results(self.renderer.render_error(&err.to_string()));
                SubmitOutcome::Failed(err)
            }
        });

        outcome.unwrap_or_else(|| {
            log::debug!("search #{request_id} superseded, dropping its response");
            SubmitOutcome::Superseded
        })
    }
}
