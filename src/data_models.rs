use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::SearchError;

/// A trimmed, non-empty search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    pub fn parse(raw: &str) -> Result<Query, SearchError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        Ok(Query(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchResponse {
    pub query: String,
    pub total_matches: u64,
    pub timestamp: String,
    #[serde(default)]
    pub results: Vec<ResultRow>,
}

impl SearchResponse {
    /// Column names of the first row, in document order.
    pub fn columns(&self) -> Vec<&str> {
        self.results
            .first()
            .map(|row| row.row_data.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub row_data: Map<String, Value>,
    #[serde(default, deserialize_with = "deserialize_matched_columns")]
    pub matched_columns: HashSet<String>,
}

impl ResultRow {
    pub fn is_match(&self, column: &str) -> bool {
        self.matched_columns.contains(column)
    }

    /// Display text of a cell; missing and null cells are empty.
    pub fn cell_text(&self, column: &str) -> String {
        self.row_data.get(column).map(value_text).unwrap_or_default()
    }
}

// The backend reports matches as `{column: matched_value}`; only the keys matter.
#[derive(Deserialize)]
#[serde(untagged)]
enum MatchedColumns {
    Map(Map<String, Value>),
    List(Vec<String>),
}

fn deserialize_matched_columns<'de, D>(deserializer: D) -> Result<HashSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let columns = match Option::<MatchedColumns>::deserialize(deserializer)? {
        Some(MatchedColumns::Map(map)) => map.into_iter().map(|(k, _)| k).collect(),
        Some(MatchedColumns::List(list)) => list.into_iter().collect(),
        None => HashSet::new(),
    };
    Ok(columns)
}

/// Stringifies a scalar cell value the way it is shown in the table.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => number_text(f),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Formats a float like a browser's `String(number)`: plain decimals for
/// 1e-7 <= |x| < 1e21, exponent form with an explicit sign otherwise.
pub fn number_text(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if f == 0.0 {
        return "0".to_string();
    }

    // shortest round-trip digits, e.g. "-1.5e-7"
    let sci = format!("{:e}", f.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let k = digits.len() as i32;
    let n = exp + 1;

    let body = if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat((-n) as usize))
    } else {
        let sign = if n - 1 < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{sign}{}", (n - 1).abs())
        } else {
            format!("{first}.{rest}e{sign}{}", (n - 1).abs())
        }
    };

    if f < 0.0 { format!("-{body}") } else { body }
}

#[test]
fn test_query_parse_trims_and_rejects_blank() {
    assert_eq!(Query::parse("  shoe \n").unwrap().as_str(), "shoe");
    assert_eq!(Query::parse(""), Err(SearchError::EmptyQuery));
    assert_eq!(Query::parse(" \t\n "), Err(SearchError::EmptyQuery));
}

#[test]
fn test_value_text() {
    use serde_json::json;

    assert_eq!(value_text(&json!(null)), "");
    assert_eq!(value_text(&json!("Shoe")), "Shoe");
    assert_eq!(value_text(&json!(20)), "20");
    assert_eq!(value_text(&json!(20.0)), "20");
    assert_eq!(value_text(&json!(19.5)), "19.5");
    assert_eq!(value_text(&json!(-3)), "-3");
    assert_eq!(value_text(&json!(true)), "true");
    assert_eq!(value_text(&json!(1e15)), "1000000000000000");
    assert_eq!(value_text(&json!(1e16)), "10000000000000000");
    assert_eq!(value_text(&json!(0.000001)), "0.000001");
    assert_eq!(value_text(&json!(1e21)), "1e+21");
}

#[test]
fn test_number_text_follows_browser_rules() {
    assert_eq!(number_text(123456789012345680000.0), "123456789012345680000");
    assert_eq!(number_text(1.5e21), "1.5e+21");
    assert_eq!(number_text(0.0000001), "1e-7");
    assert_eq!(number_text(1.25e-8), "1.25e-8");
    assert_eq!(number_text(0.00012), "0.00012");
    assert_eq!(number_text(-2.5), "-2.5");
    assert_eq!(number_text(-0.0), "0");
    assert_eq!(number_text(0.1 + 0.2), "0.30000000000000004");
}

#[test]
fn test_matched_columns_accepts_object_and_list() {
    let from_object: ResultRow = serde_json::from_str(
        r#"{"row_data": {"name": "Shoe"}, "matched_columns": {"name": "Shoe"}}"#,
    )
    .unwrap();
    assert!(from_object.is_match("name"));

    let from_list: ResultRow =
        serde_json::from_str(r#"{"row_data": {"name": "Shoe"}, "matched_columns": ["name"]}"#)
            .unwrap();
    assert!(from_list.is_match("name"));

    let missing: ResultRow = serde_json::from_str(r#"{"row_data": {"name": "Shoe"}}"#).unwrap();
    assert!(missing.matched_columns.is_empty());
}
