use axum::{Form, extract::State, response::Html};
use std::sync::Arc;

use crate::handler::SubmissionHandler;
use crate::page::MemoryPage;

use super::AppState;
use super::models::SearchFormData;
use super::shell::render_shell;

pub async fn index_handler() -> Html<String> {
    Html(render_shell("", "", &[]))
}

pub async fn search_handler(
    State(state): State<AppState>,
    Form(form): Form<SearchFormData>,
) -> Html<String> {
    let page = Arc::new(MemoryPage::new());
    let handler = SubmissionHandler::new(state.backend.clone(), page.clone(), state.renderer.clone());

    let outcome = handler.submit(&form.query).await;
    tracing::info!(query = %form.query.trim(), ?outcome, "search page submitted");

    let snapshot = page.snapshot();
    Html(render_shell(
        form.query.trim(),
        &snapshot.results,
        &snapshot.alerts,
    ))
}
