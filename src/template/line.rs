//! Template lines and their classification

use crate::keypath::{ParamPath, Token};
use crate::model::structure::NodeId;
use serde::Serialize;

/// What a template line was recognised as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Empty,
    Documentation,
    Constraint,
    ActiveData,
    InactiveData,
}

/// The `[- ]KEY: value` parts of a line matching the data pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLine {
    /// Line starts with a `- ` list-element marker
    pub dash: bool,
    /// Width of the list-element marker, including trailing blanks
    pub dash_width: usize,
    /// Key as written, surrounding quotes or parentheses removed
    pub key: String,
    pub key_token: Token,
    /// Text after the colon, if any
    pub value: Option<String>,
}

impl DataLine {
    /// Value is a bare `{{ ... }}` placeholder, optionally quoted
    #[must_use]
    pub fn has_placeholder_value(&self) -> bool {
        self.value.as_deref().is_some_and(|value| {
            let unquoted = value
                .trim()
                .trim_matches(|c| c == '"' || c == '\'')
                .trim();
            unquoted.starts_with("{{") && unquoted.ends_with("}}")
        })
    }

    /// Value opens a block scalar (`|`, `>-`, `|2` ...)
    #[must_use]
    pub fn opens_block_scalar(&self) -> bool {
        self.value.as_deref().is_some_and(|value| {
            let head = value.split('#').next().unwrap_or_default().trim();
            head.starts_with(['|', '>'])
                && head[1..]
                    .chars()
                    .all(|c| matches!(c, '-' | '+') || c.is_ascii_digit())
        })
    }
}

/// One line of the template
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLine {
    /// Original text including its line terminator
    pub raw: String,
    /// 1-based
    pub line_no: usize,
    /// Column where the content starts. For commented lines this is the
    /// indent before `#` plus any blanks after the `#` beyond the first.
    pub indent: usize,
    /// First non-blank character is `#`
    pub commented: bool,
    pub classification: Classification,
    pub data: Option<DataLine>,
    pub inferred_path: Option<ParamPath>,
    /// Non-owning handle into the structure model
    pub resolved_node: Option<NodeId>,
    /// 1.0 for rule-based decisions, lower for heuristic ones
    pub confidence: f64,
}

impl TemplateLine {
    /// Text after the leading blanks, one `#` and one following space
    #[must_use]
    pub fn uncommented_content(&self) -> &str {
        uncomment(self.body())
    }

    /// The raw line without its terminator
    #[must_use]
    pub fn body(&self) -> &str {
        strip_terminator(&self.raw)
    }

    /// The raw line's terminator, `\n` when it has none
    #[must_use]
    pub fn terminator(&self) -> &'static str {
        if self.raw.ends_with("\r\n") {
            "\r\n"
        } else {
            "\n"
        }
    }
}

/// Drop a trailing `\n` or `\r\n`
#[must_use]
pub fn strip_terminator(raw: &str) -> &str {
    raw.strip_suffix("\r\n")
        .or_else(|| raw.strip_suffix('\n'))
        .unwrap_or(raw)
}

/// Strip leading blanks, one `#` and one following space
#[must_use]
pub fn uncomment(body: &str) -> &str {
    let trimmed = body.trim_start();
    let without_hash = trimmed.strip_prefix('#').unwrap_or(trimmed);
    without_hash.strip_prefix(' ').unwrap_or(without_hash)
}

/// Split text into lines, keeping each line's terminator
#[must_use]
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// Leading blank width with tabs counted as `tab_size` columns
#[must_use]
pub fn leading_width(text: &str, tab_size: usize) -> usize {
    text.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { tab_size } else { 1 })
        .sum()
}

/// Content indent of a line, see [`TemplateLine::indent`]
#[must_use]
pub fn content_indent(body: &str, tab_size: usize) -> usize {
    let before = leading_width(body, tab_size);
    let trimmed = body.trim_start_matches([' ', '\t']);
    match trimmed.strip_prefix('#') {
        Some(after_hash) => before + leading_width(after_hash, tab_size).saturating_sub(1),
        None => before,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commented_indent_counts_blanks_after_marker() {
        assert_eq!(content_indent("  # port: 1", 2), 2);
        assert_eq!(content_indent("#niceObject:", 2), 0);
        assert_eq!(content_indent("#  child: 1", 2), 1);
        assert_eq!(content_indent("\tkey: 1", 4), 4);
    }
}
