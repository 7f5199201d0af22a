pub mod api;
pub mod client;
pub mod config;
pub mod data_models;
pub mod error;
pub mod form;
pub mod handler;
pub mod highlight;
pub mod page;
pub mod render;

pub use client::{HttpBackend, SearchBackend};
pub use data_models::{Query, ResultRow, SearchResponse};
pub use error::SearchError;
pub use form::{SearchForm, SubmitEvent};
pub use handler::{SubmissionHandler, SubmitOutcome};
pub use page::{MemoryPage, Page};
pub use render::{Escaping, ResultRenderer};
