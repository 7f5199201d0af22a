use serde::Deserialize;

/// Body of a `POST /` from the search form.
#[derive(Debug, Deserialize)]
pub struct SearchFormData {
    #[serde(default)]
    pub query: String,
}
