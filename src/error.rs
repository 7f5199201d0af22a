use thiserror::Error;

/// Everything that can stop a submission from rendering a result table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("Please enter a search term")]
    EmptyQuery,

    #[error("Server error: {status}")]
    Server { status: u16 },

    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    Parse(String),

    #[error("invalid search endpoint: {0}")]
    InvalidEndpoint(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SearchError::Parse(err.to_string())
        } else {
            SearchError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::Parse(err.to_string())
    }
}

#[test]
fn test_server_error_message_carries_status() {
    let err = SearchError::Server { status: 500 };
    assert_eq!(err.to_string(), "Server error: 500");
}
