//! Config File Format
//!
//! Line classification for the reader and canonical rendering for the
//! writer. Both are pure; the store owns all I/O.
//!
//! ```text
//! # Difficulty of the world
//! #   Valid values: 'peaceful', 'easy'
//! difficulty=easy
//!
//! ```
//!
//! Every line ends in `\r\n`.

use crate::schema::ValidationRule;

/// Line terminator used throughout the canonical form.
pub const LINE_END: &str = "\r\n";

/// Classification of one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// Starts with `#` after trimming.
    Comment,
    /// No `=` anywhere on the line (blank lines included).
    NoSeparator,
    /// `key=value`, split at the first `=`.
    Entry { key: &'a str, value: &'a str },
}

/// Classify a raw line. Surrounding whitespace, including a trailing `\r`,
/// is trimmed before anything else.
pub fn parse_line(raw: &str) -> Line<'_> {
    let line = raw.trim();
    if line.starts_with('#') {
        return Line::Comment;
    }
    match line.split_once('=') {
        Some((key, value)) => Line::Entry { key, value },
        None => Line::NoSeparator,
    }
}

/// Comment text for a key: the description followed by a "Valid values"
/// hint for literal enumerations.
fn comment_text(description: Option<&str>, rule: &ValidationRule) -> String {
    let mut text = description.unwrap_or_default().to_string();
    if let Some(values) = rule.hint() {
        if !text.is_empty() {
            text.push('\n');
        }
        let quoted: Vec<String> = values.iter().map(|v| format!("'{}'", v)).collect();
        text.push_str("  Valid values: ");
        text.push_str(&quoted.join(", "));
    }
    text
}

/// Split on `\r?\n`, dropping trailing empty lines.
fn comment_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Append the canonical block for one key to `out`.
pub fn render_entry(
    out: &mut String,
    key: &str,
    value: &str,
    description: Option<&str>,
    rule: &ValidationRule,
) {
    let text = comment_text(description, rule);
    for line in comment_lines(&text) {
        out.push_str("# ");
        out.push_str(line);
        out.push_str(LINE_END);
    }
    out.push_str(key);
    out.push('=');
    out.push_str(value);
    out.push_str(LINE_END);
    out.push_str(LINE_END);
}
