//! Text escaping for markup output.

/// Escapes text before it is embedded in markup.
pub trait Escaper: Send + Sync {
    fn escape(&self, text: &str) -> String;
}

/// HTML escaping of `&`, `<`, `>`, `"` and `'`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlEscaper;

impl Escaper for HtmlEscaper {
    fn escape(&self, text: &str) -> String {
        let mut escaped = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&#039;"),
                other => escaped.push(other),
            }
        }
        escaped
    }
}
