use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::data_models::{Query, SearchResponse};
use crate::error::SearchError;

/// Anything that can answer a search query.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &Query) -> Result<SearchResponse, SearchError>;
}

/// Posts the query as form data to the search endpoint.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    url: Url,
}

impl HttpBackend {
    pub fn new(endpoint: &str, path: &str, timeout: Duration) -> Result<Self, SearchError> {
        let base = Url::parse(endpoint)
            .map_err(|e| SearchError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        let url = base
            .join(path)
            .map_err(|e| SearchError::InvalidEndpoint(format!("{endpoint}{path}: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::Network(e.to_string()))?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn request_url(&self) -> Url {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair("t", &millis.to_string());
        url
    }
}

#[async_trait]
impl SearchBackend for HttpBackend {
    async fn search(&self, query: &Query) -> Result<SearchResponse, SearchError> {
        let url = self.request_url();
        log::debug!("POST {url}");

        let res = self
            .client
            .post(url)
            .form(&[("query", query.as_str())])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(SearchError::Server {
                status: status.as_u16(),
            });
        }

        let body = res.text().await?;
        let response: SearchResponse = serde_json::from_str(&body)?;
        Ok(response)
    }
}
