use crate::render::escape_html;

/// The search page: form `searchForm` with field `query`, a hidden
/// `loading` indicator and the `results` area.
pub fn render_shell(query: &str, results: &str, warnings: &[String]) -> String {
    let warnings: String = warnings
        .iter()
        .map(|w| format!(r#"<p class="warning" role="alert">{}</p>"#, escape_html(w)))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Custom Search</title>
</head>
<body>
<form id="searchForm" method="post" action="/">
<input type="text" name="query" value="{query}" placeholder="Search...">
<button type="submit">Search</button>
</form>
{warnings}<div id="loading" style="display: none">Searching...</div>
<div id="results">{results}</div>
</body>
</html>
"#,
        query = escape_html(query),
    )
}

#[test]
fn test_render_shell_escapes_query_attribute() {
    let html = render_shell(r#""><script>"#, "", &[]);
    assert!(html.contains(r#"value="&quot;&gt;&lt;script&gt;""#));
    assert!(!html.contains("<script>"));
}
