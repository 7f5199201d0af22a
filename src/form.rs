use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::client::SearchBackend;
use crate::handler::{SubmissionHandler, SubmitOutcome};
use crate::page::Page;

/// A submit event from the search form, carrying its `query` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitEvent {
    pub query: String,
}

impl SubmitEvent {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// Unread outcomes kept for [`SearchForm::next_outcome`]; outcomes arriving
/// while the backlog is full are dropped.
pub const OUTCOME_BACKLOG: usize = 32;

/// Creates a form: the sender side plays the user pressing "search".
pub fn form_channel(buffer: usize) -> (mpsc::Sender<SubmitEvent>, mpsc::Receiver<SubmitEvent>) {
    mpsc::channel(buffer)
}

/// Listens on a form and hands every submission to a [`SubmissionHandler`].
///
/// Each submission runs on its own task, so a slow request does not hold
/// up the next one; the handler drops responses that lose the race.
pub struct SearchForm {
    listener: JoinHandle<()>,
    outcomes: mpsc::Receiver<SubmitOutcome>,
}

impl SearchForm {
    pub fn attach<B, P>(
        mut form: mpsc::Receiver<SubmitEvent>,
        handler: Arc<SubmissionHandler<B, P>>,
    ) -> SearchForm
    where
        B: SearchBackend + ?Sized + 'static,
        P: Page + 'static,
    {
        let (outcome_tx, outcomes) = mpsc::channel(OUTCOME_BACKLOG);
        let listener = tokio::spawn(async move {
            while let Some(event) = form.recv().await {
                let handler = handler.clone();
                let outcome_tx = outcome_tx.clone();
                tokio::spawn(async move {
                    let outcome = handler.submit(&event.query).await;
                    if let Err(mpsc::error::TrySendError::Full(outcome)) =
                        outcome_tx.try_send(outcome)
                    {
                        log::debug!("outcome backlog full, dropping {outcome:?}");
                    }
                });
            }
            log::debug!("search form closed");
        });
        SearchForm { listener, outcomes }
    }

    /// Waits for the next finished submission.
    pub async fn next_outcome(&mut self) -> Option<SubmitOutcome> {
        self.outcomes.recv().await
    }

    pub fn is_attached(&self) -> bool {
        !self.listener.is_finished()
    }

    /// Detaches from the form. Submissions already in flight still finish.
    pub fn dispose(self) {
        self.listener.abort();
    }
}
