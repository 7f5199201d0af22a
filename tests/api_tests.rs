use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use scraper::{Html, Selector};
use std::sync::Arc;
use tower::ServiceExt;

use tablesearch::api::{AppState, create_router};
use tablesearch::client::SearchBackend;
use tablesearch::data_models::{Query, SearchResponse};
use tablesearch::error::SearchError;
use tablesearch::render::ResultRenderer;

/// Knows one row, a shoe; answers 500 for "boom".
struct ShoeBackend;

#[async_trait]
impl SearchBackend for ShoeBackend {
    async fn search(&self, query: &Query) -> Result<SearchResponse, SearchError> {
        if query.as_str() == "boom" {
            return Err(SearchError::Server { status: 500 });
        }
        Ok(serde_json::from_value(serde_json::json!({
            "query": query.as_str(),
            "total_matches": 1,
            "timestamp": "2024-01-01T00:00:00",
            "results": [
                {"row_data": {"name": "Shoe", "price": 20}, "matched_columns": {"name": "Shoe"}}
            ]
        }))?)
    }
}

fn app() -> axum::Router {
    create_router(AppState {
        backend: Arc::new(ShoeBackend),
        renderer: ResultRenderer::default(),
    })
}

async fn post_query(body: &'static str) -> Result<(StatusCode, String)> {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))?,
        )
        .await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok((status, String::from_utf8(bytes.to_vec())?))
}

fn inner(html: &str, selector: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(selector).unwrap();
    document.select(&selector).map(|e| e.inner_html()).collect()
}

#[tokio::test]
async fn test_index_serves_the_search_form() -> Result<()> {
    let response = app()
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await?.to_bytes();
    let html = String::from_utf8(bytes.to_vec())?;
    assert_eq!(inner(&html, "form#searchForm input[name=query]").len(), 1);
    assert_eq!(inner(&html, "#loading").len(), 1);
    assert_eq!(inner(&html, "#results"), vec![""]);
    Ok(())
}

#[tokio::test]
async fn test_posting_a_query_renders_results() -> Result<()> {
    let (status, html) = post_query("query=shoe").await?;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(inner(&html, "#results thead th"), vec!["name", "price"]);
    assert_eq!(inner(&html, "#results span.match"), vec!["Shoe"]);
    assert!(html.contains(r#"value="shoe""#), "query is kept in the form");
    Ok(())
}

#[tokio::test]
async fn test_posting_a_blank_query_warns() -> Result<()> {
    let (status, html) = post_query("query=+++").await?;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(inner(&html, "p.warning"), vec!["Please enter a search term"]);
    assert_eq!(inner(&html, "#results"), vec![""]);
    Ok(())
}

#[tokio::test]
async fn test_backend_failure_is_shown_inline() -> Result<()> {
    let (_, html) = post_query("query=boom").await?;
    assert_eq!(inner(&html, "#results p.error"), vec!["Error: Server error: 500"]);
    Ok(())
}
