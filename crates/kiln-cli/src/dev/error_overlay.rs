//! Error page served in place of a page whose last build failed.
//!
//! The page loads the HMR client, so it reloads itself once the next build
//! succeeds.

/// Render the overlay for `artifact`. The error text is HTML-escaped.
pub fn generate_error_overlay(artifact: &str, error: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Build failed: {artifact}</title>
  <style>
    body {{ margin: 0; background: #1e1e1e; color: #f0f0f0; font-family: ui-monospace, Menlo, monospace; }}
    header {{ padding: 16px 24px; background: #b91c1c; font-size: 16px; font-weight: bold; }}
    pre {{ margin: 0; padding: 24px; white-space: pre-wrap; word-break: break-word; line-height: 1.5; }}
  </style>
</head>
<body>
  <header>Build failed: {artifact}</header>
  <pre>{error}</pre>
  <script src="/__kiln_hmr__.js"></script>
</body>
</html>
"#,
        artifact = html_escape(artifact),
        error = html_escape(error),
    )
}

/// Escape `& < > " '`.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
