use regex::{Regex, RegexBuilder};

use crate::render::Escaping;

/// Wraps every case-insensitive occurrence of a literal query in
/// `<span class="match">`.
#[derive(Debug, Clone)]
pub struct Highlighter {
    pattern: Option<Regex>,
    escaping: Escaping,
}

impl Highlighter {
    pub fn new(query: &str, escaping: Escaping) -> Highlighter {
        let pattern = if query.is_empty() {
            None
        } else {
            // ASCII queries fold ASCII only, so `k` does not match the Kelvin sign
            RegexBuilder::new(&regex::escape(query))
                .case_insensitive(true)
                .unicode(!query.is_ascii())
                .build()
                .map_err(|e| log::warn!("query cannot be highlighted: {e}"))
                .ok()
        };
        Highlighter { pattern, escaping }
    }

    pub fn highlight(&self, text: &str) -> String {
        let Some(pattern) = &self.pattern else {
            return self.escaping.apply(text).into_owned();
        };

        let mut out = String::with_capacity(text.len());
        let mut last = 0usize;
        for m in pattern.find_iter(text) {
            out.push_str(&self.escaping.apply(&text[last..m.start()]));
            out.push_str("<span class=\"match\">");
            out.push_str(&self.escaping.apply(m.as_str()));
            out.push_str("</span>");
            last = m.end();
        }
        out.push_str(&self.escaping.apply(&text[last..]));
        out
    }
}

/// One-shot form of [`Highlighter::highlight`].
pub fn highlight_match(text: &str, query: &str, escaping: Escaping) -> String {
    Highlighter::new(query, escaping).highlight(text)
}

#[test]
fn test_highlight_is_case_insensitive() {
    assert_eq!(
        highlight_match("Category", "cat", Escaping::Raw),
        r#"<span class="match">Cat</span>egory"#
    );
    assert_eq!(
        highlight_match("cat CAT cAt", "Cat", Escaping::Raw),
        concat!(
            r#"<span class="match">cat</span> "#,
            r#"<span class="match">CAT</span> "#,
            r#"<span class="match">cAt</span>"#
        )
    );
}

#[test]
fn test_highlight_treats_metacharacters_literally() {
    assert_eq!(highlight_match("axb", "a.b", Escaping::Raw), "axb");
    assert_eq!(
        highlight_match("see a.b here", "a.b", Escaping::Raw),
        r#"see <span class="match">a.b</span> here"#
    );
    assert_eq!(
        highlight_match("(1+1)*[2]", "(1+1)*[", Escaping::Raw),
        r#"<span class="match">(1+1)*[</span>2]"#
    );
}

#[test]
fn test_highlight_non_overlapping() {
    assert_eq!(
        highlight_match("aaaa", "aa", Escaping::Raw),
        r#"<span class="match">aa</span><span class="match">aa</span>"#
    );
    assert_eq!(
        highlight_match("aaa", "aa", Escaping::Raw),
        r#"<span class="match">aa</span>a"#
    );
}

#[test]
fn test_highlight_escapes_around_matches() {
    assert_eq!(
        highlight_match("<b>Shoe</b>", "shoe", Escaping::Html),
        r#"&lt;b&gt;<span class="match">Shoe</span>&lt;/b&gt;"#
    );
    assert_eq!(
        highlight_match("<b>Shoe</b>", "shoe", Escaping::Raw),
        r#"<b><span class="match">Shoe</span></b>"#
    );
}

#[test]
fn test_highlight_ascii_query_ignores_unicode_folds() {
    assert_eq!(highlight_match("\u{212A}elvin", "k", Escaping::Raw), "\u{212A}elvin");
    assert_eq!(highlight_match("\u{17F}ave", "s", Escaping::Raw), "\u{17F}ave");
    assert_eq!(
        highlight_match("Kelvin", "k", Escaping::Raw),
        r#"<span class="match">K</span>elvin"#
    );
    assert_eq!(
        highlight_match("CAFÉ", "café", Escaping::Raw),
        r#"<span class="match">CAFÉ</span>"#
    );
}

#[test]
fn test_highlight_empty_inputs() {
    assert_eq!(highlight_match("", "shoe", Escaping::Raw), "");
    assert_eq!(highlight_match("Shoe", "", Escaping::Raw), "Shoe");
}
