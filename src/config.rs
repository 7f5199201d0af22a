use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::render::Escaping;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        search_endpoint: get_env_or_default("SEARCH_ENDPOINT", "http://127.0.0.1:8000"),
        search_path: get_env_or_default("SEARCH_PATH", "/search"),
        timeout: Duration::from_secs(parse_env_or_default("SEARCH_TIMEOUT_SECS", 30)),
        escaping: if parse_env_or_default("ESCAPE_HTML", false) {
            Escaping::Html
        } else {
            Escaping::Raw
        },
        ui_bind: get_env_or_default("UI_BIND", "127.0.0.1:3000"),
    }
});

#[derive(Debug, Clone)]
pub struct Config {
    pub search_endpoint: String,
    pub search_path: String,
    pub timeout: Duration,
    pub escaping: Escaping,
    pub ui_bind: String,
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env_or_default<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().to_ascii_lowercase().parse().unwrap_or_else(|_| {
            log::warn!("ignoring unparseable value for {key}: {raw:?}");
            default
        }),
        Err(_) => default,
    }
}

#[test]
fn test_parse_env_or_default_falls_back() {
    let timeout: u64 = parse_env_or_default("TABLESEARCH_TEST_UNSET_VARIABLE", 30);
    assert_eq!(timeout, 30);
    let escape: bool = parse_env_or_default("TABLESEARCH_TEST_UNSET_VARIABLE", false);
    assert!(!escape);
}
