use std::borrow::Cow;
use std::fmt::Write;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::data_models::SearchResponse;
use crate::highlight::Highlighter;

/// How server- and user-supplied text is inserted into markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Escaping {
    /// Inserted verbatim, as the original search page does.
    #[default]
    Raw,
    /// Markup characters are entity-encoded.
    Html,
}

impl Escaping {
    pub fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        match self {
            Escaping::Raw => Cow::Borrowed(input),
            Escaping::Html => escape_html(input),
        }
    }
}

pub fn escape_html(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Formats a backend timestamp as `M/D/YYYY, h:mm:ss AM` in local time.
pub fn format_timestamp(raw: &str) -> String {
    const DISPLAY: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.with_timezone(&Local).format(DISPLAY).to_string();
    }
    // date-only forms are UTC midnight
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Utc
                .from_utc_datetime(&midnight)
                .with_timezone(&Local)
                .format(DISPLAY)
                .to_string();
        }
    }
    // naive timestamps are local time
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"));
    match naive {
        Ok(naive) => match Local.from_local_datetime(&naive).earliest() {
            Some(local) => local.format(DISPLAY).to_string(),
            None => naive.format(DISPLAY).to_string(),
        },
        Err(_) => "Invalid Date".to_string(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResultRenderer {
    escaping: Escaping,
}

impl ResultRenderer {
    pub fn new(escaping: Escaping) -> Self {
        Self { escaping }
    }

    pub fn escaping(&self) -> Escaping {
        self.escaping
    }

    /// Builds the full contents of the results area for a response.
    pub fn render(&self, response: &SearchResponse) -> String {
        let esc = self.escaping;
        let query = esc.apply(&response.query);

        if response.total_matches == 0 {
            return format!(r#"<p class="text-gray-600 italic">No results found for "{query}"</p>"#);
        }

        let mut html = String::new();
        let _ = write!(
            html,
            concat!(
                "<div>\n",
                r#"<h2 class="text-xl font-bold text-gray-800 mb-1">{total} results for "{query}"</h2>"#,
                "\n",
                r#"<p class="text-sm text-gray-500 mb-4">Last updated: {updated}</p>"#,
                "\n</div>\n"
            ),
            total = response.total_matches,
            query = query,
            updated = format_timestamp(&response.timestamp),
        );

        let columns = response.columns();
        let highlighter = Highlighter::new(&response.query, esc);

        html.push_str(r#"<div class="overflow-x-auto rounded-lg shadow ring-1 ring-gray-300">"#);
        html.push_str(r#"<table class="min-w-full border-collapse bg-white text-sm text-left">"#);

        html.push_str(r#"<thead><tr class="bg-gray-100 text-gray-700 border-b border-gray-300">"#);
        for column in &columns {
            let _ = write!(
                html,
                r#"<th class="px-4 py-2 border-r font-semibold">{}</th>"#,
                esc.apply(column)
            );
        }
        html.push_str("</tr></thead>");

        html.push_str("<tbody>");
        for row in &response.results {
            html.push_str(r#"<tr class="hover:bg-blue-50 border-b border-gray-200">"#);
            for column in &columns {
                let text = row.cell_text(column);
                html.push_str(r#"<td class="px-4 py-2 border-r whitespace-nowrap">"#);
                if row.is_match(column) {
                    let _ = write!(
                        html,
                        r#"<span class="bg-yellow-200 text-blue-900 font-semibold px-1 rounded">{}</span>"#,
                        highlighter.highlight(&text)
                    );
                } else {
                    html.push_str(&esc.apply(&text));
                }
                html.push_str("</td>");
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table></div>");

        html
    }

    /// Inline error shown in the results area when a submission fails.
    pub fn render_error(&self, message: &str) -> String {
        format!(r#"<p class="error">Error: {}</p>"#, self.escaping.apply(message))
    }
}

#[test]
fn test_escape_html() {
    assert_eq!(escape_html("plain"), "plain");
    assert_eq!(
        escape_html(r#"<a href="x">&'</a>"#),
        "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
    );
}

#[test]
fn test_format_timestamp() {
    assert_eq!(format_timestamp("2024-01-01T00:00:00"), "1/1/2024, 12:00:00 AM");
    assert_eq!(
        format_timestamp("2024-03-15T14:05:09.123456"),
        "3/15/2024, 2:05:09 PM"
    );
    assert_eq!(format_timestamp("yesterday"), "Invalid Date");
    assert_ne!(format_timestamp("2024-01-01T00:00:00Z"), "Invalid Date");
}

#[test]
fn test_format_timestamp_date_only_is_utc_midnight() {
    let expected = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .unwrap()
        .with_timezone(&Local)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string();
    assert_eq!(format_timestamp("2024-01-01"), expected);
    assert_eq!(format_timestamp("2024-13-01"), "Invalid Date");
}
