use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PROP_NAME: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("valid prop name regex");
}

const MAX_BLOCKED_NAME_LEN: usize = 64;

/// Escape text for use as JSX text or inside a double-quoted attribute.
///
/// Braces are escaped so text can never open an expression container, and
/// line breaks are escaped so text can never start a new program line.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            '{' => escaped.push_str("&#123;"),
            '}' => escaped.push_str("&#125;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Escape text that is emitted as JSX element content.
///
/// JSX trims whitespace at the edges of text lines, so leading and trailing
/// spaces and tabs are written as character references to survive rendering.
pub fn escape_text_content(text: &str) -> String {
    let escaped = escape_text(text);
    let is_edge = |c: char| c == ' ' || c == '\t';

    let body = escaped.trim_matches(is_edge);
    let leading = escaped.len() - escaped.trim_start_matches(is_edge).len();
    let (head, tail) = if body.is_empty() {
        (escaped.as_str(), "")
    } else {
        let trailing_start = leading + body.len();
        (&escaped[..leading], &escaped[trailing_start..])
    };

    let mut out = String::with_capacity(escaped.len() + 8);
    push_edge(&mut out, head);
    out.push_str(body);
    push_edge(&mut out, tail);
    out
}

fn push_edge(out: &mut String, edge: &str) {
    for c in edge.chars() {
        out.push_str(if c == '\t' { "&#9;" } else { "&#32;" });
    }
}

/// Whether `name` can be emitted as a JSX attribute name
pub fn is_valid_prop_name(name: &str) -> bool {
    PROP_NAME.is_match(name)
}

/// Reduce a rejected component name to characters that cannot terminate a comment
pub fn sanitize_blocked_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
        .take(MAX_BLOCKED_NAME_LEN)
        .collect()
}
