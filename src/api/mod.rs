use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::client::SearchBackend;
use crate::render::ResultRenderer;

pub mod handlers;
pub mod models;
pub mod shell;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn SearchBackend>,
    pub renderer: ResultRenderer,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::index_handler).post(handlers::search_handler),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
